//! Plotters-powered density chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! Bars are drawn as outlines; filled bars from three overlapping histograms
//! would hide each other on a terminal canvas.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::SegmentKind;
use crate::plot::BinGrid;
use crate::report::Series;

/// One histogram: per-bin heights on the shared grid.
pub struct Bars<'a> {
    pub heights: &'a [f64],
    pub color: RGBColor,
}

/// A render-only chart description; every series and bound is computed by the caller.
pub struct DensityChart<'a> {
    pub grid: &'a BinGrid,
    /// Drawn in order, so later histograms sit on top.
    pub bars: Vec<Bars<'a>>,
    /// Scaled fitted density.
    pub overlay: Option<&'a [(f64, f64)]>,
    /// Vertical marker lines (median, benchmarks).
    pub markers: Vec<(f64, RGBColor)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

/// Palette shared by the chart and the legend panel.
pub fn series_color(series: Series) -> RGBColor {
    match series {
        Series::Segment(SegmentKind::Main) => RGBColor(173, 216, 230), // light blue
        Series::Segment(SegmentKind::LowTail) => RGBColor(90, 90, 255),
        Series::Segment(SegmentKind::HighTail) => RGBColor(255, 165, 0), // orange
        Series::Overlay | Series::Median => WHITE,
        Series::CurrentBenchmark => RGBColor(0, 255, 255),
        Series::NewBenchmark => RGBColor(0, 255, 0),
    }
}

pub fn ratatui_color(c: RGBColor) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

impl<'a> Widget for DensityChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart this small.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for bars in &self.bars {
                chart.draw_series(
                    self.grid
                        .bins()
                        .zip(bars.heights.iter().copied())
                        .filter(|&(_, h)| h > 0.0)
                        .map(|((left, right), h)| Rectangle::new([(left, 0.0), (right, h.min(y1))], &bars.color)),
                )?;
            }

            if let Some(curve) = self.overlay {
                let color = series_color(Series::Overlay);
                chart.draw_series(LineSeries::new(curve.iter().map(|&(x, y)| (x, y.min(y1))), &color))?;
            }

            for &(x, color) in &self.markers {
                if x >= x0 && x <= x1 {
                    chart.draw_series(LineSeries::new([(x, y0), (x, y1)], &color))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
