//! Shared bin grid and density histograms.
//!
//! All segments are binned on one grid so their densities are comparable:
//!
//! - edges are `0, w, 2w, …` strictly below `x_max + w`, so the last edge is the
//!   first multiple of `w` at or above `x_max`
//! - the last bin is closed on the right; values outside `[0, last edge]` are
//!   ignored
//! - density is `count / (in_range_total × w)`, i.e. each histogram integrates
//!   to 1 over the grid

/// Upper limit on the number of bins; heavy-tailed reference draws can otherwise
/// request millions.
pub const MAX_BINS: usize = 20_000;

/// Fixed-width bin edges starting at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BinGrid {
    pub width: f64,
    pub edges: Vec<f64>,
    /// Set when `MAX_BINS` cut the grid short of `x_max`.
    pub clipped: bool,
}

impl BinGrid {
    /// Grid covering `[0, x_max]` with bins of `width`.
    ///
    /// Always has at least one bin, even when `x_max <= 0`.
    pub fn spanning(x_max: f64, width: f64) -> Self {
        let stop = x_max + width;
        let requested_edges = if stop.is_finite() && stop > 0.0 {
            (stop / width).ceil() as usize
        } else {
            0
        };
        let n_edges = requested_edges.clamp(2, MAX_BINS + 1);
        let edges = (0..n_edges).map(|i| i as f64 * width).collect();
        Self {
            width,
            edges,
            clipped: requested_edges > MAX_BINS + 1,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    /// The last edge (right end of the grid).
    pub fn upper(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Bin index for `x`, or `None` when `x` is off the grid.
    pub fn bin_of(&self, x: f64) -> Option<usize> {
        if !(x >= 0.0 && x <= self.upper()) {
            return None;
        }
        let idx = (x / self.width).floor() as usize;
        Some(idx.min(self.bin_count() - 1))
    }

    /// `(left, right)` edges of each bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.edges.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Per-bin density of `values` on `grid`; all zeros when nothing lands on the grid.
pub fn density_histogram(values: &[f64], grid: &BinGrid) -> Vec<f64> {
    let mut counts = vec![0usize; grid.bin_count()];
    let mut total = 0usize;
    for &v in values {
        if let Some(idx) = grid.bin_of(v) {
            counts[idx] += 1;
            total += 1;
        }
    }
    if total == 0 {
        return vec![0.0; counts.len()];
    }
    let norm = total as f64 * grid.width;
    counts.into_iter().map(|c| c as f64 / norm).collect()
}

/// Largest bin density (0 for an empty histogram).
pub fn peak(densities: &[f64]) -> f64 {
    densities.iter().copied().fold(0.0, f64::max)
}

/// Maximum over all non-empty arrays, or `None` if every array is empty.
pub fn max_over_non_empty(arrays: &[&[f64]]) -> Option<f64> {
    arrays
        .iter()
        .filter(|a| !a.is_empty())
        .flat_map(|a| a.iter().copied())
        .filter(|v| v.is_finite())
        .reduce(f64::max)
}

/// `n` evenly spaced points on `[start, stop]` (inclusive).
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as f64 - 1.0);
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
