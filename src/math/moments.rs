//! Analytic moments of the Johnson SU family.
//!
//! With `Z = a + b * asinh((X - loc) / scale)` standard normal we have
//! `X = loc + scale * sinh(U)` where `U = (Z - a) / b ~ N(μ, σ²)`, `μ = -a/b`,
//! `σ = 1/b`. Raw moments of `sinh(U)` follow from the binomial expansion of
//! `((e^U - e^{-U}) / 2)^n` and the normal MGF `E[e^{kU}] = exp(kμ + k²σ²/2)`.
//!
//! Numerical notes:
//! - For very small `b` the MGF overflows; the result is then non-finite and
//!   callers must treat it as "no moments" rather than a value.
//! - For large `b` the central moments suffer some cancellation, which stays
//!   well below the fitter's tolerance for the shapes that matter here.

use crate::domain::{JohnsonSuParams, MomentTarget};

const BINOMIAL: [[f64; 5]; 5] = [
    [1.0, 0.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 0.0, 0.0, 0.0],
    [1.0, 2.0, 1.0, 0.0, 0.0],
    [1.0, 3.0, 3.0, 1.0, 0.0],
    [1.0, 4.0, 6.0, 4.0, 1.0],
];

/// Mean, variance, skewness and excess kurtosis of a Johnson SU distribution.
///
/// Returned in the same shape as a `MomentTarget` so fit residuals can be formed
/// field by field. Fields may be non-finite for extreme shapes.
pub fn johnson_su_moments(p: &JohnsonSuParams) -> MomentTarget {
    let mu = -p.a / p.b;
    let var_u = 1.0 / (p.b * p.b);
    let [m1, m2, m3, m4] = sinh_raw_moments(mu, var_u);

    let c2 = m2 - m1 * m1;
    let c3 = m3 - 3.0 * m1 * m2 + 2.0 * m1.powi(3);
    let c4 = m4 - 4.0 * m1 * m3 + 6.0 * m1 * m1 * m2 - 3.0 * m1.powi(4);

    MomentTarget {
        mean: p.loc + p.scale * m1,
        variance: p.scale * p.scale * c2,
        skewness: c3 / c2.powf(1.5),
        excess_kurtosis: c4 / (c2 * c2) - 3.0,
    }
}

/// First four raw moments of `sinh(U)` for `U ~ N(mu, var_u)`.
fn sinh_raw_moments(mu: f64, var_u: f64) -> [f64; 4] {
    let mgf = |k: f64| (k * mu + 0.5 * k * k * var_u).exp();
    let mut out = [0.0; 4];
    for n in 1..=4usize {
        let mut acc = 0.0;
        for j in 0..=n {
            let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
            acc += BINOMIAL[n][j] * sign * mgf(n as f64 - 2.0 * j as f64);
        }
        out[n - 1] = acc / 2f64.powi(n as i32);
    }
    out
}

/// Excess kurtosis of the lognormal distribution with the given |skewness|.
///
/// The lognormal curve is the lower edge of the Johnson SU region in the
/// (skewness², kurtosis) plane; SU members lie strictly above it.
pub fn lognormal_excess_kurtosis(skewness: f64) -> f64 {
    let target = skewness * skewness;
    if !target.is_finite() {
        return f64::INFINITY;
    }
    // skew² = (ω + 2)² (ω - 1) is increasing in ω ≥ 1.
    let f = |w: f64| (w + 2.0) * (w + 2.0) * (w - 1.0);
    let mut lo = 1.0_f64;
    let mut hi = 2.0_f64;
    while f(hi) < target {
        hi *= 2.0;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if f(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-15 * hi {
            break;
        }
    }
    let w = 0.5 * (lo + hi);
    w.powi(4) + 2.0 * w.powi(3) + 3.0 * w * w - 6.0
}

/// Whether a Johnson SU member can have this skewness and excess kurtosis.
pub fn within_su_region(skewness: f64, excess_kurtosis: f64) -> bool {
    excess_kurtosis > lognormal_excess_kurtosis(skewness.abs())
}
