//! Sample reconciliation: draw every segment, bin them on one grid, and derive
//! the display scale for the main segment.
//!
//! Draw order is fixed (reference sample, main, low tail, high tail) so a seeded
//! RNG reproduces the same pass.
//!
//! Display scale:
//! the main segment usually has far more payments than either tail, so its bars
//! would dwarf the tails on a shared density axis. When both tails are present
//! we rescale the main histogram (and the overlay curve) so its peak sits at
//! `DISPLAY_PEAK_RATIO × max(tail peaks)`. Only the plotted densities change;
//! the sample arrays are left as drawn.

use rand::Rng;

use crate::data::sample::{
    ReconciledSample, SampleBounds, draw_normal_segment, draw_reference_sample, oversample_filter_pad,
};
use crate::domain::{FitResult, Parameters, SegmentKind, SegmentSpec};
use crate::error::AppError;
use crate::models::JohnsonSu;
use crate::plot::{BinGrid, density_histogram, max_over_non_empty, peak};

/// Target height of the rescaled main peak relative to the taller tail peak.
pub const DISPLAY_PEAK_RATIO: f64 = 0.8;

/// Conditions recovered locally during a pass, surfaced for display and logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recovered {
    /// Too few draws fell inside the bounds; the rest are the segment minimum.
    PaddedWithMinimum { segment: SegmentKind, padded: usize },
    /// No fitted curve; the main segment was drawn from a normal instead.
    MainDrawnFromNormal,
    /// Every sample was empty; the axis bound fell back to the benchmarks.
    EmptyAxisRange,
    /// The bin grid hit its size limit before reaching the largest value.
    BinGridClipped { bins: usize },
}

impl Recovered {
    pub fn describe(&self) -> String {
        match self {
            Recovered::PaddedWithMinimum { segment, padded } => format!(
                "{}: {padded} value(s) padded with the segment minimum",
                segment.display_name()
            ),
            Recovered::MainDrawnFromNormal => "MainData drawn from a normal (no Johnson SU fit)".to_string(),
            Recovered::EmptyAxisRange => "all samples empty; axis bound from benchmarks".to_string(),
            Recovered::BinGridClipped { bins } => format!("bin grid clipped at {bins} bins"),
        }
    }
}

/// The three user-described segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSet {
    pub main: SegmentSpec,
    pub low_tail: SegmentSpec,
    pub high_tail: SegmentSpec,
}

impl SegmentSet {
    pub fn from_parameters(params: &Parameters) -> Self {
        Self {
            main: params.main.segment,
            low_tail: params.low_tail,
            high_tail: params.high_tail,
        }
    }
}

/// Per-segment densities on the shared grid (main unscaled).
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentDensities {
    pub main: Vec<f64>,
    pub low_tail: Vec<f64>,
    pub high_tail: Vec<f64>,
}

/// Output of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// Unfiltered draw from the fitted distribution; empty without a fit.
    pub large: Vec<f64>,
    pub main: ReconciledSample,
    pub low_tail: ReconciledSample,
    pub high_tail: ReconciledSample,
    /// Largest value over all non-empty samples, or the benchmark fallback.
    pub x_max: f64,
    pub grid: BinGrid,
    pub densities: SegmentDensities,
    /// Multiplier for the main histogram and overlay curve (1.0 = unscaled).
    pub display_scale: f64,
    pub notes: Vec<Recovered>,
}

impl Reconciled {
    /// Main densities after applying `display_scale`.
    pub fn scaled_main_density(&self) -> Vec<f64> {
        self.densities.main.iter().map(|d| d * self.display_scale).collect()
    }
}

/// Draw, filter, and bin every segment.
///
/// `axis_fallback` is the axis bound used when every sample is empty.
pub fn reconcile<R>(
    fit: &FitResult,
    segments: &SegmentSet,
    large_sample_size: usize,
    bin_width: f64,
    axis_fallback: f64,
    rng: &mut R,
) -> Result<Reconciled, AppError>
where
    R: Rng + ?Sized,
{
    let mut notes = Vec::new();

    let fitted = fit.params().map(|p| JohnsonSu::new(*p)).transpose()?;

    let large = match &fitted {
        Some(dist) => draw_reference_sample(dist, large_sample_size, rng),
        None => Vec::new(),
    };

    // The low tail's maximum is an exclusive floor for the main segment.
    let mut main_bounds = SampleBounds::of(&segments.main);
    if segments.low_tail.count > 0 {
        main_bounds = main_bounds.above(segments.low_tail.max);
    }

    let main = match &fitted {
        Some(dist) => oversample_filter_pad(dist, segments.main.count, main_bounds, segments.main.min, rng),
        None => {
            if segments.main.count > 0 {
                notes.push(Recovered::MainDrawnFromNormal);
            }
            draw_normal_segment(&segments.main, main_bounds, rng)?
        }
    };
    let low_tail = draw_normal_segment(&segments.low_tail, SampleBounds::of(&segments.low_tail), rng)?;
    let high_tail = draw_normal_segment(&segments.high_tail, SampleBounds::of(&segments.high_tail), rng)?;

    for (kind, sample) in [
        (SegmentKind::Main, &main),
        (SegmentKind::LowTail, &low_tail),
        (SegmentKind::HighTail, &high_tail),
    ] {
        if sample.padded > 0 {
            tracing::warn!(
                segment = kind.display_name(),
                padded = sample.padded,
                requested = sample.len(),
                "filtered draws too few; padded with segment minimum"
            );
            notes.push(Recovered::PaddedWithMinimum {
                segment: kind,
                padded: sample.padded,
            });
        }
    }

    let x_max = match max_over_non_empty(&[
        main.values.as_slice(),
        low_tail.values.as_slice(),
        high_tail.values.as_slice(),
        large.as_slice(),
    ]) {
        Some(v) => v,
        None => {
            notes.push(Recovered::EmptyAxisRange);
            axis_fallback
        }
    };

    let grid = BinGrid::spanning(x_max, bin_width);
    if grid.clipped {
        tracing::warn!(x_max, bins = grid.bin_count(), "bin grid clipped");
        notes.push(Recovered::BinGridClipped { bins: grid.bin_count() });
    }

    let densities = SegmentDensities {
        main: density_histogram(&main.values, &grid),
        low_tail: density_histogram(&low_tail.values, &grid),
        high_tail: density_histogram(&high_tail.values, &grid),
    };

    let tail_peak = |sample: &ReconciledSample, density: &[f64]| (!sample.is_empty()).then(|| peak(density));
    let display_scale = display_scale(
        peak(&densities.main),
        [
            tail_peak(&low_tail, densities.low_tail.as_slice()),
            tail_peak(&high_tail, densities.high_tail.as_slice()),
        ],
    );

    Ok(Reconciled {
        large,
        main,
        low_tail,
        high_tail,
        x_max,
        grid,
        densities,
        display_scale,
        notes,
    })
}

/// Scale putting the main peak at `DISPLAY_PEAK_RATIO × max(tail peaks)`.
///
/// A tail is `None` when it has no samples; then no rescaling happens, and
/// likewise when either peak is not positive.
pub fn display_scale(main_peak: f64, tail_peaks: [Option<f64>; 2]) -> f64 {
    let peak_others = match tail_peaks {
        [Some(low), Some(high)] => low.max(high),
        _ => 0.0,
    };
    if peak_others > 0.0 && main_peak > 0.0 {
        DISPLAY_PEAK_RATIO * peak_others / main_peak
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JohnsonSuParams, Unavailable};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seg(count: usize, mean: f64, std_dev: f64, min: f64, max: f64) -> SegmentSpec {
        SegmentSpec {
            count,
            mean,
            std_dev,
            min,
            max,
        }
    }

    fn default_segments() -> SegmentSet {
        SegmentSet::from_parameters(&Parameters::default())
    }

    fn manual_fit() -> FitResult {
        FitResult::Manual(JohnsonSuParams {
            a: -6.8112,
            b: 3.8942,
            loc: -2377.0314,
            scale: 1295.0398,
        })
    }

    #[test]
    fn counts_match_requests() {
        let segments = default_segments();
        let mut rng = StdRng::seed_from_u64(11);
        let out = reconcile(&manual_fit(), &segments, 10_000, 500.0, 1500.0, &mut rng).unwrap();
        assert_eq!(out.main.len(), 428);
        assert_eq!(out.low_tail.len(), 123);
        assert_eq!(out.high_tail.len(), 5);
        assert_eq!(out.large.len(), 10_000);
    }

    #[test]
    fn main_draws_respect_bounds_and_low_tail_boundary() {
        let segments = default_segments();
        let mut rng = StdRng::seed_from_u64(12);
        let out = reconcile(&manual_fit(), &segments, 1_000, 500.0, 1500.0, &mut rng).unwrap();
        for &v in out.main.drawn() {
            assert!(v >= segments.main.min && v <= segments.main.max);
            assert!(v > segments.low_tail.max);
        }
        for &v in out.main.padding() {
            assert_eq!(v, segments.main.min);
        }
    }

    #[test]
    fn rescaled_main_peak_is_fraction_of_tail_peak() {
        let segments = default_segments();
        let mut rng = StdRng::seed_from_u64(13);
        let out = reconcile(&manual_fit(), &segments, 1_000, 500.0, 1500.0, &mut rng).unwrap();

        let tails = peak(&out.densities.low_tail).max(peak(&out.densities.high_tail));
        let scaled_peak = peak(&out.scaled_main_density());
        assert!((scaled_peak - DISPLAY_PEAK_RATIO * tails).abs() < 1e-12 * tails.max(1.0));
        // Sample arrays are untouched by the scale.
        assert_eq!(out.main.len(), 428);
    }

    #[test]
    fn no_rescale_when_a_tail_is_empty() {
        assert_eq!(display_scale(0.5, [None, None]), 1.0);
        assert_eq!(display_scale(0.5, [Some(0.2), None]), 1.0);
        assert_eq!(display_scale(0.0, [Some(0.2), Some(0.1)]), 1.0);
        assert!((display_scale(0.5, [Some(0.2), Some(0.1)]) - 0.32).abs() < 1e-15);

        let mut segments = default_segments();
        segments.low_tail.count = 0;
        segments.high_tail.count = 0;
        let mut rng = StdRng::seed_from_u64(14);
        let out = reconcile(&manual_fit(), &segments, 1_000, 500.0, 1500.0, &mut rng).unwrap();
        assert_eq!(out.display_scale, 1.0);
        assert!(out.low_tail.is_empty() && out.high_tail.is_empty());
    }

    #[test]
    fn everything_empty_falls_back_to_benchmarks() {
        let segments = SegmentSet {
            main: seg(0, 1354.0, 1033.0, 357.0, 6223.0),
            low_tail: seg(0, 189.0, 87.0, 4.0, 346.0),
            high_tail: seg(0, 9977.0, 3932.0, 6401.0, 14285.0),
        };
        let fit = FitResult::Unavailable(Unavailable::ZeroCount);
        let mut rng = StdRng::seed_from_u64(15);
        let out = reconcile(&fit, &segments, 1_000, 500.0, 1500.0, &mut rng).unwrap();

        assert_eq!(out.x_max, 1500.0);
        assert!(out.large.is_empty());
        assert!(out.notes.contains(&Recovered::EmptyAxisRange));
        assert!(!out.notes.contains(&Recovered::MainDrawnFromNormal));
        assert_eq!(out.display_scale, 1.0);
    }

    #[test]
    fn unavailable_fit_draws_main_from_normal() {
        let segments = default_segments();
        let fit = FitResult::Unavailable(Unavailable::DegenerateInput);
        let mut rng = StdRng::seed_from_u64(16);
        let out = reconcile(&fit, &segments, 1_000, 500.0, 1500.0, &mut rng).unwrap();

        assert!(out.large.is_empty());
        assert_eq!(out.main.len(), 428);
        assert!(out.notes.contains(&Recovered::MainDrawnFromNormal));
    }

    #[test]
    fn impossible_bounds_are_padded_and_reported() {
        let mut segments = default_segments();
        segments.high_tail = seg(5, 0.0, 1.0, 6401.0, 14285.0);
        let mut rng = StdRng::seed_from_u64(17);
        let out = reconcile(&manual_fit(), &segments, 1_000, 500.0, 1500.0, &mut rng).unwrap();

        assert_eq!(out.high_tail.values, vec![6401.0; 5]);
        assert!(out.notes.contains(&Recovered::PaddedWithMinimum {
            segment: SegmentKind::HighTail,
            padded: 5,
        }));
    }

    #[test]
    fn seeded_passes_are_reproducible() {
        let segments = default_segments();
        let a = reconcile(&manual_fit(), &segments, 2_000, 500.0, 1500.0, &mut StdRng::seed_from_u64(18)).unwrap();
        let b = reconcile(&manual_fit(), &segments, 2_000, 500.0, 1500.0, &mut StdRng::seed_from_u64(18)).unwrap();
        assert_eq!(a.main, b.main);
        assert_eq!(a.large, b.large);
        assert_eq!(a.display_scale, b.display_scale);
    }
}
