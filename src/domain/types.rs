//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built from CLI flags or a preset file
//! - passed by value into a single render pass
//! - written back out as a preset from the TUI

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One of the three summarized payment segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// The bulk of payments; fitted with a Johnson SU curve.
    Main,
    /// Payments below 10% of the benchmark.
    LowTail,
    /// Payments above 180% of the benchmark.
    HighTail,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 3] = [SegmentKind::Main, SegmentKind::LowTail, SegmentKind::HighTail];

    /// Human-readable label for legends and status lines.
    pub fn display_name(self) -> &'static str {
        match self {
            SegmentKind::Main => "MainData",
            SegmentKind::LowTail => "LT10",
            SegmentKind::HighTail => "GT180",
        }
    }
}

/// How the "kurtosis" input should be read.
///
/// Summary tables usually quote Pearson kurtosis (normal = 3), while the fitter
/// works in excess kurtosis (normal = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KurtosisConvention {
    /// Input is Pearson kurtosis; 3 is subtracted before fitting.
    #[default]
    Pearson,
    /// Input is already excess kurtosis.
    Excess,
}

impl KurtosisConvention {
    pub fn to_excess(self, kurtosis: f64) -> f64 {
        match self {
            KurtosisConvention::Pearson => kurtosis - 3.0,
            KurtosisConvention::Excess => kurtosis,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            KurtosisConvention::Pearson => KurtosisConvention::Excess,
            KurtosisConvention::Excess => KurtosisConvention::Pearson,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            KurtosisConvention::Pearson => "pearson",
            KurtosisConvention::Excess => "excess",
        }
    }
}

/// Target moments for the fitted segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentTarget {
    pub mean: f64,
    pub variance: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
}

/// Johnson SU shape/location/scale parameters.
///
/// `Z = a + b * asinh((x - loc) / scale)` is standard normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JohnsonSuParams {
    pub a: f64,
    pub b: f64,
    pub loc: f64,
    pub scale: f64,
}

impl JohnsonSuParams {
    /// Starting values offered when switching to manual parameters.
    pub const MANUAL_DEFAULT: JohnsonSuParams = JohnsonSuParams {
        a: -6.8112,
        b: 3.8942,
        loc: -2377.0314,
        scale: 1295.0398,
    };

    /// `b` and `scale` must be strictly positive and everything finite.
    pub fn is_valid(&self) -> bool {
        self.a.is_finite()
            && self.loc.is_finite()
            && self.b.is_finite()
            && self.scale.is_finite()
            && self.b > 0.0
            && self.scale > 0.0
    }
}

/// Why no fitted curve is available for the main segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unavailable {
    /// The main segment has a requested count of zero; the fitter was not run.
    ZeroCount,
    /// Zero (or non-finite) variance, or manual parameters with non-positive `b`/`scale`.
    DegenerateInput,
    /// The solver stopped without meeting its tolerance.
    SolverNonConvergence {
        iterations: usize,
        /// Largest absolute scaled residual at the last accepted iterate.
        residual: f64,
        /// The target lies on or below the lognormal boundary of the SU region.
        outside_family: bool,
    },
}

impl Unavailable {
    pub fn describe(&self) -> String {
        match self {
            Unavailable::ZeroCount => "no fit: main segment count is 0".to_string(),
            Unavailable::DegenerateInput => "no fit: degenerate input (zero variance or invalid shape)".to_string(),
            Unavailable::SolverNonConvergence {
                iterations,
                residual,
                outside_family,
            } => {
                let hint = if *outside_family {
                    " (skew/kurtosis outside the Johnson SU region)"
                } else {
                    ""
                };
                format!("no fit: solver did not converge after {iterations} iterations, residual={residual:.3e}{hint}")
            }
        }
    }
}

/// Outcome of fitting (or accepting) the main segment's distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitResult {
    /// Parameters found by moment matching.
    Fitted { params: JohnsonSuParams, iterations: usize },
    /// Parameters typed in by the analyst.
    Manual(JohnsonSuParams),
    Unavailable(Unavailable),
}

impl FitResult {
    pub fn params(&self) -> Option<&JohnsonSuParams> {
        match self {
            FitResult::Fitted { params, .. } | FitResult::Manual(params) => Some(params),
            FitResult::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.params().is_some()
    }
}

/// Where the main segment's Johnson SU parameters come from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FitSource {
    /// Solve for parameters matching the main segment's moments.
    #[default]
    Moments,
    /// Use the given parameters as-is.
    Manual(JohnsonSuParams),
}

impl FitSource {
    pub fn display_name(&self) -> &'static str {
        match self {
            FitSource::Moments => "moments",
            FitSource::Manual(_) => "manual",
        }
    }
}

/// Summary statistics for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SegmentSpec {
    fn validate(&self, kind: SegmentKind) -> Result<(), AppError> {
        let name = kind.display_name();
        if self.count > MAX_SEGMENT_COUNT {
            return Err(AppError::new(
                2,
                format!("{name}: count {} exceeds the limit of {MAX_SEGMENT_COUNT}.", self.count),
            ));
        }
        if !(self.mean.is_finite() && self.std_dev.is_finite() && self.min.is_finite() && self.max.is_finite()) {
            return Err(AppError::new(2, format!("{name}: all statistics must be finite.")));
        }
        if self.std_dev < 0.0 {
            return Err(AppError::new(2, format!("{name}: standard deviation must be >= 0.")));
        }
        if self.min > self.max {
            return Err(AppError::new(
                2,
                format!("{name}: min ({}) must not exceed max ({}).", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// The main segment also carries shape statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MainSegmentSpec {
    #[serde(flatten)]
    pub segment: SegmentSpec,
    pub skewness: f64,
    /// Read according to `Parameters::kurtosis_convention`.
    pub kurtosis: f64,
}

/// Reference payment levels drawn as vertical markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Benchmarks {
    pub current: f64,
    pub new: f64,
}

impl Benchmarks {
    /// Axis bound used when no sample contributes a maximum.
    pub fn axis_fallback(&self) -> f64 {
        self.current.max(self.new)
    }
}

/// One immutable snapshot of every user input.
///
/// Each render pass takes one of these by reference; nothing else is read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub bin_width: f64,
    pub benchmarks: Benchmarks,
    pub main: MainSegmentSpec,
    pub low_tail: SegmentSpec,
    pub high_tail: SegmentSpec,
    /// Size of the unfiltered reference draw behind the overlay curve.
    pub large_sample_size: usize,
    #[serde(default)]
    pub kurtosis_convention: KurtosisConvention,
    #[serde(default)]
    pub fit_source: FitSource,
}

/// Default size of the large reference sample.
pub const DEFAULT_LARGE_SAMPLE_SIZE: usize = 1_000_000;

/// Largest accepted count for a single segment.
pub const MAX_SEGMENT_COUNT: usize = 10_000_000;

/// Largest accepted size for the large reference sample.
pub const MAX_LARGE_SAMPLE_SIZE: usize = 20_000_000;

impl Default for Parameters {
    fn default() -> Self {
        Self {
            bin_width: 500.0,
            benchmarks: Benchmarks {
                current: 1354.0,
                new: 1500.0,
            },
            main: MainSegmentSpec {
                segment: SegmentSpec {
                    count: 428,
                    mean: 1354.0,
                    std_dev: 1033.0,
                    min: 357.0,
                    max: 6223.0,
                },
                skewness: 1.96,
                kurtosis: 4.24,
            },
            low_tail: SegmentSpec {
                count: 123,
                mean: 189.0,
                std_dev: 87.0,
                min: 4.0,
                max: 346.0,
            },
            high_tail: SegmentSpec {
                count: 5,
                mean: 9977.0,
                std_dev: 3932.0,
                min: 6401.0,
                max: 14285.0,
            },
            large_sample_size: DEFAULT_LARGE_SAMPLE_SIZE,
            kurtosis_convention: KurtosisConvention::Pearson,
            fit_source: FitSource::Moments,
        }
    }
}

impl Parameters {
    pub fn segment(&self, kind: SegmentKind) -> &SegmentSpec {
        match kind {
            SegmentKind::Main => &self.main.segment,
            SegmentKind::LowTail => &self.low_tail,
            SegmentKind::HighTail => &self.high_tail,
        }
    }

    /// Moment target for the main segment, with kurtosis converted to excess.
    pub fn moment_target(&self) -> MomentTarget {
        let main = &self.main;
        MomentTarget {
            mean: main.segment.mean,
            variance: main.segment.std_dev * main.segment.std_dev,
            skewness: main.skewness,
            excess_kurtosis: self.kurtosis_convention.to_excess(main.kurtosis),
        }
    }

    /// Reject inputs no render pass can work with.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.bin_width.is_finite() && self.bin_width > 0.0) {
            return Err(AppError::new(2, "Bin width must be finite and > 0."));
        }
        if !(self.benchmarks.current.is_finite() && self.benchmarks.new.is_finite()) {
            return Err(AppError::new(2, "Benchmarks must be finite."));
        }
        if self.large_sample_size == 0 || self.large_sample_size > MAX_LARGE_SAMPLE_SIZE {
            return Err(AppError::new(
                2,
                format!("Large-N sample size must be in 1..={MAX_LARGE_SAMPLE_SIZE}."),
            ));
        }
        if !(self.main.skewness.is_finite() && self.main.kurtosis.is_finite()) {
            return Err(AppError::new(2, "MainData: skewness and kurtosis must be finite."));
        }
        for kind in SegmentKind::ALL {
            self.segment(kind).validate(kind)?;
        }
        if let FitSource::Manual(p) = &self.fit_source {
            if !(p.a.is_finite() && p.b.is_finite() && p.loc.is_finite() && p.scale.is_finite()) {
                return Err(AppError::new(2, "Manual Johnson SU parameters must be finite."));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn pearson_kurtosis_is_shifted_to_excess() {
        let mut params = Parameters::default();
        let target = params.moment_target();
        assert!((target.excess_kurtosis - 1.24).abs() < 1e-12);
        assert!((target.variance - 1033.0 * 1033.0).abs() < 1e-9);

        params.kurtosis_convention = KurtosisConvention::Excess;
        assert!((params.moment_target().excess_kurtosis - 4.24).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_inverted_bounds_and_bad_bin_width() {
        let mut params = Parameters::default();
        params.low_tail.min = 500.0;
        let err = params.validate().unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let mut params = Parameters::default();
        params.bin_width = 0.0;
        assert!(params.validate().is_err());

        let mut params = Parameters::default();
        params.high_tail.std_dev = -1.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_counts() {
        let mut params = Parameters::default();
        params.high_tail.count = usize::MAX / 2;
        assert_eq!(params.validate().unwrap_err().exit_code(), 2);

        let mut params = Parameters::default();
        params.main.segment.count = MAX_SEGMENT_COUNT + 1;
        assert!(params.validate().is_err());
        params.main.segment.count = MAX_SEGMENT_COUNT;
        assert!(params.validate().is_ok());

        let mut params = Parameters::default();
        params.large_sample_size = MAX_LARGE_SAMPLE_SIZE + 1;
        assert_eq!(params.validate().unwrap_err().exit_code(), 2);
    }

    #[test]
    fn zero_counts_are_valid_input() {
        let mut params = Parameters::default();
        params.main.segment.count = 0;
        params.low_tail.count = 0;
        params.high_tail.count = 0;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn preset_json_round_trips_manual_source() {
        let mut params = Parameters::default();
        params.fit_source = FitSource::Manual(JohnsonSuParams::MANUAL_DEFAULT);
        let json = serde_json::to_string(&params).unwrap();
        let back: Parameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
