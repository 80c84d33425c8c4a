//! Levenberg–Marquardt root finding for small square systems.
//!
//! We solve `F(x) = 0` for `F: R⁴ → R⁴` by minimizing `|F(x)|²`:
//!
//! ```text
//! (JᵀJ + λ diag(JᵀJ)) δ = -Jᵀ F(x)
//! ```
//!
//! Implementation choices:
//! - The Jacobian is a forward difference (backward if the forward probe leaves
//!   the domain). Four extra residual evaluations per iteration are cheap here.
//! - Marquardt's diagonal scaling keeps the step invariant to parameter units.
//! - A residual closure returns `None` when `x` is outside its domain; such
//!   trial steps are rejected like any step that fails to lower the cost.
//! - Convergence means `max |F_i| < tolerance`. Running out of iterations or
//!   damping is reported as non-convergence, never as a solution.

use nalgebra::{Matrix4, Vector4};

/// Relative step for finite-difference Jacobians.
const FD_STEP: f64 = 1e-7;

/// Floor for the Marquardt diagonal so flat directions still get damped.
const DIAG_FLOOR: f64 = 1e-12;

/// Lower clamp for the damping factor after successful steps.
const MIN_DAMPING: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    /// Convergence threshold on the largest absolute residual.
    pub tolerance: f64,
    pub max_iterations: usize,
    pub initial_damping: f64,
    /// Give up once the damping factor grows beyond this.
    pub max_damping: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 200,
            initial_damping: 1e-3,
            max_damping: 1e12,
        }
    }
}

/// Final iterate plus the convergence flag.
#[derive(Debug, Clone, Copy)]
pub struct SolverReport {
    pub x: Vector4<f64>,
    pub converged: bool,
    pub iterations: usize,
    /// Largest absolute residual at `x`.
    pub max_residual: f64,
}

/// Solve `residuals(x) = 0` starting from `x0`.
pub fn solve_levenberg_marquardt<F>(mut residuals: F, x0: Vector4<f64>, opts: &SolverOptions) -> SolverReport
where
    F: FnMut(&Vector4<f64>) -> Option<Vector4<f64>>,
{
    let Some(mut r) = eval(&mut residuals, &x0) else {
        return SolverReport {
            x: x0,
            converged: false,
            iterations: 0,
            max_residual: f64::INFINITY,
        };
    };

    let mut x = x0;
    let mut lambda = opts.initial_damping;

    for iteration in 0..opts.max_iterations {
        let max_residual = r.amax();
        if max_residual < opts.tolerance {
            return SolverReport {
                x,
                converged: true,
                iterations: iteration,
                max_residual,
            };
        }

        let Some(jac) = jacobian(&mut residuals, &x, &r) else {
            return stalled(x, iteration, max_residual);
        };
        let jtj = jac.transpose() * jac;
        let grad = jac.transpose() * r;
        let cost = r.norm_squared();

        // Inner loop: raise damping until a step lowers the cost.
        loop {
            let mut lhs = jtj;
            for i in 0..4 {
                lhs[(i, i)] += lambda * jtj[(i, i)].max(DIAG_FLOOR);
            }

            let step = lhs.lu().solve(&(-grad)).filter(|s| s.iter().all(|v| v.is_finite()));
            if let Some(step) = step {
                let candidate = x + step;
                if let Some(rc) = eval(&mut residuals, &candidate) {
                    if rc.norm_squared() < cost {
                        x = candidate;
                        r = rc;
                        lambda = (lambda * 0.3).max(MIN_DAMPING);
                        break;
                    }
                }
            }

            lambda *= 10.0;
            if lambda > opts.max_damping {
                return stalled(x, iteration + 1, max_residual);
            }
        }

        tracing::trace!(iteration, cost = r.norm_squared(), lambda, "lm step accepted");
    }

    let max_residual = r.amax();
    SolverReport {
        x,
        converged: max_residual < opts.tolerance,
        iterations: opts.max_iterations,
        max_residual,
    }
}

fn stalled(x: Vector4<f64>, iterations: usize, max_residual: f64) -> SolverReport {
    SolverReport {
        x,
        converged: false,
        iterations,
        max_residual,
    }
}

/// Evaluate the residuals, treating any non-finite component as out of domain.
fn eval<F>(residuals: &mut F, x: &Vector4<f64>) -> Option<Vector4<f64>>
where
    F: FnMut(&Vector4<f64>) -> Option<Vector4<f64>>,
{
    residuals(x).filter(|r| r.iter().all(|v| v.is_finite()))
}

fn jacobian<F>(residuals: &mut F, x: &Vector4<f64>, r: &Vector4<f64>) -> Option<Matrix4<f64>>
where
    F: FnMut(&Vector4<f64>) -> Option<Vector4<f64>>,
{
    let mut jac = Matrix4::zeros();
    for j in 0..4 {
        let h = FD_STEP * x[j].abs().max(1.0);

        let mut forward = *x;
        forward[j] += h;
        let column = match eval(residuals, &forward) {
            Some(rf) => (rf - r) / h,
            None => {
                let mut backward = *x;
                backward[j] -= h;
                let rb = eval(residuals, &backward)?;
                (r - rb) / h
            }
        };
        jac.set_column(j, &column);
    }
    Some(jac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_coupled_nonlinear_system() {
        // Roots: x = (1, 2, 3, 4).
        let f = |x: &Vector4<f64>| {
            Some(Vector4::new(
                x[0] * x[0] - 1.0,
                x[0] * x[1] - 2.0,
                x[1] + x[2] * x[2] - 11.0,
                x[3].exp() - 4f64.exp(),
            ))
        };
        let report = solve_levenberg_marquardt(f, Vector4::new(0.5, 1.0, 2.0, 3.0), &SolverOptions::default());

        assert!(report.converged);
        let expected = [1.0, 2.0, 3.0, 4.0];
        for (got, want) in report.x.iter().zip(expected) {
            assert!((got - want).abs() < 1e-8, "got {got}, want {want}");
        }
    }

    #[test]
    fn reports_failure_when_no_root_exists() {
        // x0² + 1 = 0 has no real solution.
        let f = |x: &Vector4<f64>| Some(Vector4::new(x[0] * x[0] + 1.0, x[1] - 1.0, x[2] - 2.0, x[3] - 3.0));
        let report = solve_levenberg_marquardt(f, Vector4::new(0.7, 0.0, 0.0, 0.0), &SolverOptions::default());

        assert!(!report.converged);
        assert!(report.max_residual >= 1.0 - 1e-9);
    }

    #[test]
    fn out_of_domain_start_is_not_converged() {
        let f = |_: &Vector4<f64>| None;
        let report = solve_levenberg_marquardt(f, Vector4::zeros(), &SolverOptions::default());
        assert!(!report.converged);
        assert_eq!(report.iterations, 0);
    }
}
