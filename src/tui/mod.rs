//! Ratatui-based terminal UI.
//!
//! The chart takes the left side; the right column shows the legend, the fit
//! summary, and one settings row per input. Every accepted change runs exactly
//! one render pass; a change that fails validation is rejected and the previous
//! chart stays up.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::pipeline::{RenderInputs, render_seeded};
use crate::domain::{FitSource, JohnsonSuParams, Parameters, SegmentKind};
use crate::error::AppError;
use crate::plot::peak;
use crate::report::{Series, format_fit_summary, legend_entries};

mod fields;
mod plotters_chart;

use fields::{Field, visible_fields};
use plotters_chart::{Bars, DensityChart, ratatui_color, series_color};

const X_LABEL: &str = "Value (AUD$)";
const Y_LABEL: &str = "Density";

/// Start the TUI with `params` as the initial inputs.
pub fn run(params: Parameters, seed: Option<u64>, save_path: PathBuf) -> Result<(), AppError> {
    // First pass before taking over the terminal so input errors print normally.
    let mut app = App::new(params, seed, save_path)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    params: Parameters,
    seed: Option<u64>,
    save_path: PathBuf,
    /// Manual parameters remembered while the fit source is `Moments`.
    stashed_manual: JohnsonSuParams,
    selected: usize,
    /// Text being typed into the selected row.
    editing: Option<String>,
    status: String,
    out: RenderInputs,
}

impl App {
    fn new(params: Parameters, seed: Option<u64>, save_path: PathBuf) -> Result<Self, AppError> {
        let out = render_seeded(&params, seed)?;
        let stashed_manual = match params.fit_source {
            FitSource::Manual(p) => p,
            FitSource::Moments => JohnsonSuParams::MANUAL_DEFAULT,
        };
        Ok(Self {
            params,
            seed,
            save_path,
            stashed_manual,
            selected: 0,
            editing: None,
            status: "Ready.".to_string(),
            out,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn selected_field(&self) -> Field {
        let fields = visible_fields(&self.params);
        fields[self.selected.min(fields.len() - 1)]
    }

    /// Returns `true` when the UI should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing.is_some() {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                let last = visible_fields(&self.params).len() - 1;
                self.selected = (self.selected + 1).min(last);
            }
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::Enter => {
                let field = self.selected_field();
                self.editing = Some(field.display(&self.params));
                self.status = format!("Editing {}. Enter to apply, Esc to cancel.", field.label());
            }
            KeyCode::Char('k') => {
                let mut next = self.params;
                next.kurtosis_convention = next.kurtosis_convention.toggled();
                let msg = format!("kurtosis convention: {}", next.kurtosis_convention.display_name());
                self.apply(next, msg);
            }
            KeyCode::Char('m') => {
                let mut next = self.params;
                next.fit_source = match self.params.fit_source {
                    FitSource::Moments => FitSource::Manual(self.stashed_manual),
                    FitSource::Manual(p) => {
                        self.stashed_manual = p;
                        FitSource::Moments
                    }
                };
                let msg = format!("fit source: {}", next.fit_source.display_name());
                self.apply(next, msg);
            }
            KeyCode::Char('r') => {
                if let Some(seed) = self.seed {
                    self.seed = Some(seed.wrapping_add(1));
                }
                self.apply(self.params, "Resampled.".to_string());
            }
            KeyCode::Char('w') => match crate::io::write_preset(&self.save_path, &self.params) {
                Ok(()) => self.status = format!("Wrote preset: {}", self.save_path.display()),
                Err(err) => self.status = format!("Preset write failed: {err}"),
            },
            _ => {}
        }
        false
    }

    fn handle_edit(&mut self, code: KeyCode) {
        let Some(buffer) = self.editing.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = std::mem::take(buffer);
                self.editing = None;
                let field = self.selected_field();
                match field.parsed(&self.params, &text) {
                    Ok(next) => self.apply(next, format!("{} = {}", field.label(), text.trim())),
                    Err(msg) => self.status = msg,
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E') {
                    buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust(&mut self, steps: i32) {
        let field = self.selected_field();
        let next = field.adjusted(&self.params, steps);
        let msg = format!("{} = {}", field.label(), field.display(&next));
        self.apply(next, msg);
    }

    /// Run one render pass for `next`; keep it only if it succeeds.
    fn apply(&mut self, next: Parameters, msg: String) {
        match render_seeded(&next, self.seed) {
            Ok(out) => {
                self.params = next;
                self.out = out;
                self.status = msg;
                let last = visible_fields(&self.params).len() - 1;
                self.selected = self.selected.min(last);
            }
            Err(err) => {
                tracing::debug!(error = %err, "input change rejected");
                self.status = format!("Rejected: {}", err.message());
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let seed = match self.seed {
            Some(s) => s.to_string(),
            None => "entropy".to_string(),
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("dx", Style::default().fg(Color::Cyan)),
                Span::raw(": payment distribution explorer"),
            ]),
            Line::from(Span::styled(
                format!(
                    "fit source: {} | kurtosis: {} | seed: {seed}",
                    self.params.fit_source.display_name(),
                    self.params.kurtosis_convention.display_name(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(46)])
            .split(area);

        self.draw_chart(frame, columns[0]);

        let legend = legend_entries(&self.out);
        let summary = format_fit_summary(&self.out);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(legend.len() as u16 + 2),
                Constraint::Length(summary.len() as u16 + 3),
                Constraint::Min(5),
            ])
            .split(columns[1]);

        let legend_lines: Vec<Line> = legend
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(ratatui_color(series_color(entry.series)))),
                    Span::raw(entry.label.clone()),
                ])
            })
            .collect();
        frame.render_widget(
            Paragraph::new(legend_lines).block(Block::default().title("Legend").borders(Borders::ALL)),
            side[0],
        );

        let summary_lines: Vec<Line> = summary
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Gray))))
            .collect();
        frame.render_widget(
            Paragraph::new(summary_lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().title("Fit").borders(Borders::ALL)),
            side[1],
        );

        self.draw_settings(frame, side[2]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Payment distribution").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let out = &self.out;
        let (x_bounds, y_bounds) = chart_bounds(out);

        let bars = SegmentKind::ALL
            .into_iter()
            .map(|kind| Bars {
                heights: out.density(kind),
                color: series_color(Series::Segment(kind)),
            })
            .collect();

        let mut markers = Vec::new();
        if let Some(m) = out.median {
            markers.push((m, series_color(Series::Median)));
        }
        markers.push((out.benchmarks.current, series_color(Series::CurrentBenchmark)));
        markers.push((out.benchmarks.new, series_color(Series::NewBenchmark)));

        let (chart_rect, insets) = chart_layout(inner);
        let widget = DensityChart {
            grid: &out.grid,
            bars,
            overlay: out.overlay.as_deref(),
            markers,
            x_bounds,
            y_bounds,
            x_label: X_LABEL,
            y_label: Y_LABEL,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let fields = visible_fields(&self.params);
        let items: Vec<ListItem> = fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let value = match &self.editing {
                    Some(text) if i == self.selected => format!("{text}_"),
                    _ => field.display(&self.params),
                };
                ListItem::new(format!("{:<18} {value}", field.label()))
            })
            .collect();

        let highlight = if self.editing.is_some() {
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Black).bg(Color::White)
        };
        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(highlight)
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected.min(fields.len() - 1)));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter type  k kurtosis  m fit source  r resample  w save  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// X range covers the grid and every marker; Y range the tallest bar or curve point.
fn chart_bounds(out: &RenderInputs) -> ([f64; 2], [f64; 2]) {
    let mut x_max = out.grid.upper().max(out.benchmarks.current).max(out.benchmarks.new);
    if let Some(m) = out.median.filter(|m| m.is_finite()) {
        x_max = x_max.max(m);
    }
    if !(x_max.is_finite() && x_max > 0.0) {
        x_max = 1.0;
    }

    let curve_peak = out
        .overlay
        .as_ref()
        .map(|c| c.iter().map(|&(_, y)| y).filter(|y| y.is_finite()).fold(0.0, f64::max))
        .unwrap_or(0.0);
    let y_max = SegmentKind::ALL
        .into_iter()
        .map(|kind| peak(out.density(kind)))
        .fold(curve_peak, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    ([0.0, x_max], [0.0, y_max])
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{x_val:.0}");
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        // Densities per AUD$ are small; scientific notation keeps labels narrow.
        let label = if y_val == 0.0 { "0".to_string() } else { format!("{y_val:.1e}") };
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(X_LABEL)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(Y_LABEL).style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
