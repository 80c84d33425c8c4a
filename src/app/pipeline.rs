//! The single render pass behind every chart update.
//!
//! Keeping this in one place means the UI only ever does:
//! parameters -> `render` -> draw
//!
//! The pass itself is: fit main segment -> draw + reconcile samples -> overlay
//! curve + markers. It reads nothing but its arguments; randomness comes in
//! through the `rng` parameter (or a seed).

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;

use crate::data::{ReconciledSample, Recovered, SegmentSet, reconcile};
use crate::domain::{Benchmarks, FitResult, Parameters, SegmentKind};
use crate::error::AppError;
use crate::fit::fit_main_segment;
use crate::models::JohnsonSu;
use crate::plot::{BinGrid, linspace};

/// Number of points on the overlay density curve.
pub const OVERLAY_POINTS: usize = 1000;

/// Everything the chart needs for one set of parameters.
#[derive(Debug, Clone)]
pub struct RenderInputs {
    pub bin_width: f64,
    pub benchmarks: Benchmarks,
    pub fit: FitResult,
    /// Unfiltered reference draw; empty when the fit is unavailable.
    pub large_sample: Vec<f64>,
    pub main: ReconciledSample,
    pub low_tail: ReconciledSample,
    pub high_tail: ReconciledSample,
    /// Multiplier already applied to `main_density` and `overlay`.
    pub display_scale: f64,
    pub grid: BinGrid,
    pub main_density: Vec<f64>,
    pub low_tail_density: Vec<f64>,
    pub high_tail_density: Vec<f64>,
    /// `(x, scaled density)` of the fitted curve over the grid.
    pub overlay: Option<Vec<(f64, f64)>>,
    /// Median of the fitted distribution.
    pub median: Option<f64>,
    /// Largest sample value, or the larger benchmark when every sample is empty.
    pub axis_bound: f64,
    pub notes: Vec<Recovered>,
}

impl RenderInputs {
    pub fn sample(&self, kind: SegmentKind) -> &ReconciledSample {
        match kind {
            SegmentKind::Main => &self.main,
            SegmentKind::LowTail => &self.low_tail,
            SegmentKind::HighTail => &self.high_tail,
        }
    }

    pub fn density(&self, kind: SegmentKind) -> &[f64] {
        match kind {
            SegmentKind::Main => &self.main_density,
            SegmentKind::LowTail => &self.low_tail_density,
            SegmentKind::HighTail => &self.high_tail_density,
        }
    }
}

/// Run one pass, seeding from `seed` or from fresh entropy.
pub fn render_seeded(params: &Parameters, seed: Option<u64>) -> Result<RenderInputs, AppError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    render(params, &mut rng)
}

/// Run one pass with the given random source.
///
/// Fails only when `params` does not validate; unavailable fits, padding, and
/// empty samples are recovered and listed in `notes`.
pub fn render<R>(params: &Parameters, rng: &mut R) -> Result<RenderInputs, AppError>
where
    R: Rng + ?Sized,
{
    params.validate()?;

    let fit = fit_main_segment(params);
    if let FitResult::Unavailable(reason) = &fit {
        tracing::info!(reason = %reason.describe(), "fitted curve unavailable");
    }

    let segments = SegmentSet::from_parameters(params);
    let reconciled = reconcile(
        &fit,
        &segments,
        params.large_sample_size,
        params.bin_width,
        params.benchmarks.axis_fallback(),
        rng,
    )?;

    let main_density = reconciled.scaled_main_density();
    let display_scale = reconciled.display_scale;

    let fitted = fit.params().map(|p| JohnsonSu::new(*p)).transpose()?;
    let overlay = fitted.as_ref().map(|dist| {
        linspace(0.0, reconciled.grid.upper(), OVERLAY_POINTS)
            .into_iter()
            .map(|x| (x, dist.density(x) * display_scale))
            .collect::<Vec<_>>()
    });
    let median = fitted.as_ref().map(JohnsonSu::median);

    tracing::info!(
        fitted = fit.is_available(),
        main = reconciled.main.len(),
        low_tail = reconciled.low_tail.len(),
        high_tail = reconciled.high_tail.len(),
        large = reconciled.large.len(),
        bins = reconciled.grid.bin_count(),
        display_scale,
        notes = reconciled.notes.len(),
        "render pass complete"
    );

    Ok(RenderInputs {
        bin_width: params.bin_width,
        benchmarks: params.benchmarks,
        fit,
        large_sample: reconciled.large,
        main: reconciled.main,
        low_tail: reconciled.low_tail,
        high_tail: reconciled.high_tail,
        display_scale,
        grid: reconciled.grid,
        main_density,
        low_tail_density: reconciled.densities.low_tail,
        high_tail_density: reconciled.densities.high_tail,
        overlay,
        median,
        axis_bound: reconciled.x_max,
        notes: reconciled.notes,
    })
}
