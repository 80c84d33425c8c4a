//! Command-line parsing for the payment distribution explorer.
//!
//! Flags only seed the initial inputs; everything can be changed afterwards in
//! the TUI. Values given here override a `--preset` file, which in turn
//! overrides the built-in defaults.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

use crate::domain::KurtosisConvention;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "dx",
    version,
    about = "Interactive payment distribution explorer (Johnson SU fit + segment histograms)"
)]
pub struct Cli {
    /// Load initial inputs from a preset JSON file.
    #[arg(long, value_name = "JSON")]
    pub preset: Option<PathBuf>,

    /// Where the `w` key writes presets (defaults to the `--preset` path, then `dx-preset.json`).
    #[arg(long, value_name = "JSON")]
    pub save_preset: Option<PathBuf>,

    /// Seed for every sampling routine; without it each redraw uses fresh entropy.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write structured logs to this file (the terminal belongs to the TUI).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Maximum log level written to `--log-file`.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(flatten)]
    pub inputs: InputArgs,
}

/// Per-field overrides; `None` keeps the preset/default value.
#[derive(Debug, Args, Clone, Default)]
pub struct InputArgs {
    /// Histogram bin width (AUD$).
    #[arg(long)]
    pub bin_width: Option<f64>,

    /// Current benchmark (AUD$).
    #[arg(long, allow_hyphen_values = true)]
    pub current_benchmark: Option<f64>,

    /// New benchmark (AUD$).
    #[arg(long, allow_hyphen_values = true)]
    pub new_benchmark: Option<f64>,

    /// MainData: number of payments.
    #[arg(long)]
    pub main_count: Option<usize>,

    /// MainData: mean.
    #[arg(long, allow_hyphen_values = true)]
    pub main_mean: Option<f64>,

    /// MainData: standard deviation.
    #[arg(long)]
    pub main_std: Option<f64>,

    /// MainData: skewness.
    #[arg(long, allow_hyphen_values = true)]
    pub skewness: Option<f64>,

    /// MainData: kurtosis (see `--kurtosis-convention`).
    #[arg(long, allow_hyphen_values = true)]
    pub kurtosis: Option<f64>,

    /// MainData: minimum.
    #[arg(long, allow_hyphen_values = true)]
    pub main_min: Option<f64>,

    /// MainData: maximum.
    #[arg(long, allow_hyphen_values = true)]
    pub main_max: Option<f64>,

    /// LT10: number of payments.
    #[arg(long)]
    pub lt_count: Option<usize>,

    /// LT10: mean.
    #[arg(long, allow_hyphen_values = true)]
    pub lt_mean: Option<f64>,

    /// LT10: standard deviation.
    #[arg(long)]
    pub lt_std: Option<f64>,

    /// LT10: minimum.
    #[arg(long, allow_hyphen_values = true)]
    pub lt_min: Option<f64>,

    /// LT10: maximum.
    #[arg(long, allow_hyphen_values = true)]
    pub lt_max: Option<f64>,

    /// GT180: number of payments.
    #[arg(long)]
    pub gt_count: Option<usize>,

    /// GT180: mean.
    #[arg(long, allow_hyphen_values = true)]
    pub gt_mean: Option<f64>,

    /// GT180: standard deviation.
    #[arg(long)]
    pub gt_std: Option<f64>,

    /// GT180: minimum.
    #[arg(long, allow_hyphen_values = true)]
    pub gt_min: Option<f64>,

    /// GT180: maximum.
    #[arg(long, allow_hyphen_values = true)]
    pub gt_max: Option<f64>,

    /// Size of the large reference sample behind the fitted curve.
    #[arg(long = "large-n")]
    pub large_sample_size: Option<usize>,

    /// How `--kurtosis` is read: pearson (normal = 3) or excess (normal = 0).
    #[arg(long, value_enum)]
    pub kurtosis_convention: Option<KurtosisConvention>,

    /// Use these Johnson SU parameters instead of fitting (all four required).
    #[arg(long, allow_hyphen_values = true, requires = "manual_b")]
    pub manual_a: Option<f64>,

    #[arg(long, requires = "manual_loc")]
    pub manual_b: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires = "manual_scale")]
    pub manual_loc: Option<f64>,

    #[arg(long, requires = "manual_a")]
    pub manual_scale: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
