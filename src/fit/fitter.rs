//! Moment matching for the Johnson SU family.
//!
//! Given a target (mean, variance, skewness, excess kurtosis) we solve the four
//! equations `moments(a, b, loc, scale) = target` with Levenberg–Marquardt.
//!
//! Parameterization:
//! - the solver works on `θ = (a, ln b, loc, ln scale)` so `b` and `scale`
//!   cannot leave the positive half-line
//! - residuals are scaled to be dimensionless:
//!   `[(mean - m) / sd, var / v - 1, skew - s, exkurt - k]`
//!
//! The starting point is `a = 0, b = 1, loc = mean, scale = sd`: a symmetric
//! shape centred on the target with the target's own spread.

use nalgebra::Vector4;

use crate::domain::{FitResult, FitSource, JohnsonSuParams, MomentTarget, Parameters, Unavailable};
use crate::math::{SolverOptions, johnson_su_moments, solve_levenberg_marquardt, within_su_region};

/// Fit the main segment according to the parameter snapshot.
///
/// A zero count short-circuits to `Unavailable::ZeroCount` without running the
/// solver; manual parameters are accepted as-is when they describe a valid
/// distribution.
pub fn fit_main_segment(params: &Parameters) -> FitResult {
    if params.main.segment.count == 0 {
        return FitResult::Unavailable(Unavailable::ZeroCount);
    }
    match params.fit_source {
        FitSource::Manual(manual) => {
            if manual.is_valid() {
                FitResult::Manual(manual)
            } else {
                tracing::warn!(?manual, "manual Johnson SU parameters are degenerate");
                FitResult::Unavailable(Unavailable::DegenerateInput)
            }
        }
        FitSource::Moments => fit_moments(&params.moment_target()),
    }
}

/// Fit with the default solver options.
pub fn fit_moments(target: &MomentTarget) -> FitResult {
    fit_moments_with(target, &SolverOptions::default())
}

pub fn fit_moments_with(target: &MomentTarget, opts: &SolverOptions) -> FitResult {
    let finite = target.mean.is_finite()
        && target.variance.is_finite()
        && target.skewness.is_finite()
        && target.excess_kurtosis.is_finite();
    if !finite || target.variance <= 0.0 {
        tracing::warn!(?target, "degenerate moment target");
        return FitResult::Unavailable(Unavailable::DegenerateInput);
    }

    let sd = target.variance.sqrt();
    let x0 = Vector4::new(0.0, 0.0, target.mean, sd.ln());

    let residuals = |theta: &Vector4<f64>| {
        let m = johnson_su_moments(&decode(theta));
        Some(Vector4::new(
            (m.mean - target.mean) / sd,
            m.variance / target.variance - 1.0,
            m.skewness - target.skewness,
            m.excess_kurtosis - target.excess_kurtosis,
        ))
    };

    let report = solve_levenberg_marquardt(residuals, x0, opts);
    let params = decode(&report.x);

    if report.converged && params.is_valid() {
        tracing::debug!(
            iterations = report.iterations,
            residual = report.max_residual,
            a = params.a,
            b = params.b,
            loc = params.loc,
            scale = params.scale,
            "johnson su fit converged"
        );
        return FitResult::Fitted {
            params,
            iterations: report.iterations,
        };
    }

    let outside_family = !within_su_region(target.skewness, target.excess_kurtosis);
    tracing::warn!(
        iterations = report.iterations,
        residual = report.max_residual,
        outside_family,
        "johnson su fit did not converge"
    );
    FitResult::Unavailable(Unavailable::SolverNonConvergence {
        iterations: report.iterations,
        residual: report.max_residual,
        outside_family,
    })
}

fn decode(theta: &Vector4<f64>) -> JohnsonSuParams {
    JohnsonSuParams {
        a: theta[0],
        b: theta[1].exp(),
        loc: theta[2],
        scale: theta[3].exp(),
    }
}
