//! Legend labels and the fit summary shown beside the chart.
//!
//! Formatting lives here so the drawing code only places strings, and label
//! changes stay testable without a terminal.

use crate::app::pipeline::RenderInputs;
use crate::domain::{FitResult, JohnsonSuParams, SegmentKind};

/// Legend label for the fitted density curve.
pub const OVERLAY_LABEL: &str = "Large-N JSU fit";

/// What a legend entry refers to; the chart picks colors from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Segment(SegmentKind),
    Overlay,
    Median,
    CurrentBenchmark,
    NewBenchmark,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub series: Series,
    pub label: String,
}

/// `MainData (N=428)` style label; `n` is the displayed sample size.
pub fn segment_label(kind: SegmentKind, n: usize) -> String {
    format!("{} (N={n})", kind.display_name())
}

pub fn median_label(median: f64) -> String {
    format!("Median (large N) = {median:.0}")
}

pub fn current_benchmark_label(value: f64) -> String {
    format!("Current Benchmark = {}", fmt_amount(value))
}

pub fn new_benchmark_label(value: f64) -> String {
    format!("New Benchmark = {}", fmt_amount(value))
}

/// Legend entries in drawing order. Curve and median are left out without a fit.
pub fn legend_entries(out: &RenderInputs) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = SegmentKind::ALL
        .into_iter()
        .filter(|&kind| !out.sample(kind).is_empty())
        .map(|kind| LegendEntry {
            series: Series::Segment(kind),
            label: segment_label(kind, out.sample(kind).len()),
        })
        .collect();

    if out.overlay.is_some() {
        entries.push(LegendEntry {
            series: Series::Overlay,
            label: OVERLAY_LABEL.to_string(),
        });
    }
    if let Some(median) = out.median {
        entries.push(LegendEntry {
            series: Series::Median,
            label: median_label(median),
        });
    }
    entries.push(LegendEntry {
        series: Series::CurrentBenchmark,
        label: current_benchmark_label(out.benchmarks.current),
    });
    entries.push(LegendEntry {
        series: Series::NewBenchmark,
        label: new_benchmark_label(out.benchmarks.new),
    });
    entries
}

/// Short multi-line summary: fit outcome, grid, display scale, then any notes.
pub fn format_fit_summary(out: &RenderInputs) -> Vec<String> {
    let mut lines = Vec::new();

    match &out.fit {
        FitResult::Fitted { params, iterations } => {
            lines.push(format!("fit: {} ({iterations} iter)", fmt_params(params)));
        }
        FitResult::Manual(params) => {
            lines.push(format!("manual: {}", fmt_params(params)));
        }
        FitResult::Unavailable(reason) => lines.push(reason.describe()),
    }

    let clipped = if out.grid.clipped { " (clipped)" } else { "" };
    lines.push(format!(
        "bins: {} x {}{clipped} | axis max: {:.0} | display scale: {:.4}",
        out.grid.bin_count(),
        fmt_amount(out.bin_width),
        out.axis_bound,
        out.display_scale,
    ));

    for note in &out.notes {
        lines.push(format!("- {}", note.describe()));
    }
    lines
}

fn fmt_params(p: &JohnsonSuParams) -> String {
    format!("a={:.4} b={:.4} loc={:.4} scale={:.4}", p.a, p.b, p.loc, p.scale)
}

/// Whole amounts print without a fractional part.
fn fmt_amount(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::render_seeded;
    use crate::domain::{FitSource, Parameters};

    #[test]
    fn labels_match_chart_conventions() {
        assert_eq!(segment_label(SegmentKind::Main, 428), "MainData (N=428)");
        assert_eq!(segment_label(SegmentKind::LowTail, 123), "LT10 (N=123)");
        assert_eq!(segment_label(SegmentKind::HighTail, 5), "GT180 (N=5)");
        assert_eq!(median_label(1204.6), "Median (large N) = 1205");
        assert_eq!(current_benchmark_label(1354.0), "Current Benchmark = 1354");
        assert_eq!(new_benchmark_label(1500.5), "New Benchmark = 1500.5");
    }

    #[test]
    fn legend_without_fit_has_no_curve_or_median() {
        let out = render_seeded(&Parameters::default(), Some(1)).unwrap();
        let series: Vec<Series> = legend_entries(&out).into_iter().map(|e| e.series).collect();
        assert_eq!(
            series,
            vec![
                Series::Segment(SegmentKind::Main),
                Series::Segment(SegmentKind::LowTail),
                Series::Segment(SegmentKind::HighTail),
                Series::CurrentBenchmark,
                Series::NewBenchmark,
            ]
        );
        assert!(format_fit_summary(&out)[0].starts_with("no fit"));
    }

    #[test]
    fn legend_skips_empty_segments() {
        let mut params = Parameters::default();
        params.high_tail.count = 0;
        let out = render_seeded(&params, Some(1)).unwrap();
        let series: Vec<Series> = legend_entries(&out).into_iter().map(|e| e.series).collect();
        assert!(!series.contains(&Series::Segment(SegmentKind::HighTail)));
        assert_eq!(series[0], Series::Segment(SegmentKind::Main));
        assert_eq!(series[1], Series::Segment(SegmentKind::LowTail));
        assert_eq!(series.len(), 4);
    }

    #[test]
    fn legend_with_manual_fit_lists_every_series() {
        let mut params = Parameters::default();
        params.large_sample_size = 5_000;
        params.fit_source = FitSource::Manual(JohnsonSuParams::MANUAL_DEFAULT);
        let out = render_seeded(&params, Some(2)).unwrap();

        let entries = legend_entries(&out);
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].label, "MainData (N=428)");
        assert_eq!(entries[3].label, OVERLAY_LABEL);
        assert!(entries[4].label.starts_with("Median (large N) = "));

        let summary = format_fit_summary(&out);
        assert!(summary[0].starts_with("manual: a=-6.8112"));
        assert!(summary[1].starts_with("bins: "));
    }
}
