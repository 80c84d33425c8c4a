//! Oversample-filter-pad draws for each segment.
//!
//! Every segment is drawn the same way:
//!
//! 1. draw `OVERSAMPLE_FACTOR × count` values from the segment's distribution
//! 2. keep the values inside the segment's bounds, in draw order
//! 3. truncate to `count`, or pad the shortfall with a fixed value
//!
//! Padding uses the segment minimum, which biases a short segment toward its
//! lower bound. Every padded pass is logged and reported to the caller.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::domain::SegmentSpec;
use crate::error::AppError;

/// Draws per requested value before filtering.
pub const OVERSAMPLE_FACTOR: usize = 2;

/// Interval a segment's draws must fall in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleBounds {
    pub min: f64,
    pub max: f64,
    /// Optional strict lower boundary shared with a neighbouring segment.
    pub exclusive_floor: Option<f64>,
}

impl SampleBounds {
    pub fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            exclusive_floor: None,
        }
    }

    pub fn of(spec: &SegmentSpec) -> Self {
        Self::closed(spec.min, spec.max)
    }

    /// Additionally require values strictly above `floor`.
    pub fn above(self, floor: f64) -> Self {
        Self {
            exclusive_floor: Some(floor),
            ..self
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max && self.exclusive_floor.is_none_or(|floor| x > floor)
    }
}

/// A segment's values: accepted draws first, then `padded` filler values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconciledSample {
    pub values: Vec<f64>,
    /// Number of trailing values that are padding rather than draws.
    pub padded: usize,
}

impl ReconciledSample {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The accepted (non-padded) prefix.
    pub fn drawn(&self) -> &[f64] {
        &self.values[..self.values.len() - self.padded]
    }

    pub fn padding(&self) -> &[f64] {
        &self.values[self.values.len() - self.padded..]
    }
}

/// Draw exactly `count` values from `dist` inside `bounds`, padding with `pad_value`.
///
/// All `OVERSAMPLE_FACTOR × count` draws are taken before filtering, so the number
/// of random numbers consumed does not depend on how many are accepted.
pub fn oversample_filter_pad<D, R>(
    dist: &D,
    count: usize,
    bounds: SampleBounds,
    pad_value: f64,
    rng: &mut R,
) -> ReconciledSample
where
    D: Distribution<f64> + ?Sized,
    R: Rng + ?Sized,
{
    if count == 0 {
        return ReconciledSample::default();
    }

    let n_draws = count.saturating_mul(OVERSAMPLE_FACTOR);
    let mut values: Vec<f64> = Vec::with_capacity(n_draws);
    for _ in 0..n_draws {
        values.push(dist.sample(rng));
    }
    values.retain(|&x| bounds.contains(x));
    values.truncate(count);

    let padded = count - values.len();
    values.resize(count, pad_value);

    ReconciledSample { values, padded }
}

/// Draw a segment from a normal distribution with the segment's own mean and stddev.
pub fn draw_normal_segment<R>(spec: &SegmentSpec, bounds: SampleBounds, rng: &mut R) -> Result<ReconciledSample, AppError>
where
    R: Rng + ?Sized,
{
    if spec.count == 0 {
        return Ok(ReconciledSample::default());
    }
    let normal = Normal::new(spec.mean, spec.std_dev)
        .map_err(|e| AppError::new(2, format!("Segment distribution error: {e}")))?;
    Ok(oversample_filter_pad(&normal, spec.count, bounds, spec.min, rng))
}

/// Unfiltered draw used for the overlay curve and axis range.
pub fn draw_reference_sample<D, R>(dist: &D, n: usize, rng: &mut R) -> Vec<f64>
where
    D: Distribution<f64> + ?Sized,
    R: Rng + ?Sized,
{
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(dist.sample(rng));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn spec(count: usize, mean: f64, std_dev: f64, min: f64, max: f64) -> SegmentSpec {
        SegmentSpec {
            count,
            mean,
            std_dev,
            min,
            max,
        }
    }

    #[test]
    fn zero_count_is_empty_and_consumes_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut fresh = StdRng::seed_from_u64(1);
        let s = spec(0, 10.0, 1.0, 0.0, 20.0);
        let out = draw_normal_segment(&s, SampleBounds::of(&s), &mut rng).unwrap();
        assert!(out.is_empty());
        assert_eq!(rng.r#gen::<u64>(), fresh.r#gen::<u64>());
    }

    #[test]
    fn same_seed_gives_same_prefix() {
        let s = spec(123, 189.0, 87.0, 4.0, 346.0);
        let a = draw_normal_segment(&s, SampleBounds::of(&s), &mut StdRng::seed_from_u64(9)).unwrap();
        let b = draw_normal_segment(&s, SampleBounds::of(&s), &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 123);
    }

    #[test]
    fn fully_filtered_segment_is_padded_with_min() {
        // Every draw lands far above the bounds.
        let s = spec(17, 1e6, 1.0, 0.0, 10.0);
        let out = draw_normal_segment(&s, SampleBounds::of(&s), &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(out.len(), 17);
        assert_eq!(out.padded, 17);
        assert!(out.values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn exclusive_floor_rejects_boundary_and_below() {
        let bounds = SampleBounds::closed(0.0, 10.0).above(5.0);
        assert!(!bounds.contains(5.0));
        assert!(!bounds.contains(4.0));
        assert!(bounds.contains(5.0 + 1e-9));
        assert!(bounds.contains(10.0));
        assert!(!bounds.contains(f64::NAN));
    }

    #[test]
    fn zero_stddev_repeats_the_mean_when_in_bounds() {
        let s = spec(4, 7.0, 0.0, 0.0, 10.0);
        let out = draw_normal_segment(&s, SampleBounds::of(&s), &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(out.values, vec![7.0; 4]);
        assert_eq!(out.padded, 0);
    }

    #[test]
    fn reference_sample_has_requested_size() {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let out = draw_reference_sample(&normal, 1000, &mut StdRng::seed_from_u64(2));
        assert_eq!(out.len(), 1000);
    }

    proptest! {
        #[test]
        fn count_and_bound_invariants(
            count in 0usize..400,
            mean in -1000.0f64..1000.0,
            std_dev in 0.0f64..500.0,
            lo in -1000.0f64..1000.0,
            width in 0.0f64..800.0,
            seed in any::<u64>(),
        ) {
            let s = spec(count, mean, std_dev, lo, lo + width);
            let mut rng = StdRng::seed_from_u64(seed);
            let out = draw_normal_segment(&s, SampleBounds::of(&s), &mut rng).unwrap();

            prop_assert_eq!(out.len(), count);
            prop_assert_eq!(out.is_empty(), count == 0);
            for &v in out.drawn() {
                prop_assert!(v >= s.min && v <= s.max);
            }
            for &v in out.padding() {
                prop_assert_eq!(v, s.min);
            }
        }
    }
}
