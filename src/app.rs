//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs file logging when requested
//! - builds the initial `Parameters` (defaults -> preset -> flags)
//! - hands over to the TUI

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;

use crate::cli::{Cli, InputArgs, LogLevel};
use crate::domain::{FitSource, JohnsonSuParams, Parameters};
use crate::error::AppError;

pub mod pipeline;

/// Preset path used by the `w` key when neither `--save-preset` nor `--preset` is given.
pub const DEFAULT_PRESET_PATH: &str = "dx-preset.json";

/// Entry point for the `dx` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_file_logging(path, cli.log_level)?;
    }

    let base = match &cli.preset {
        Some(path) => crate::io::read_preset(path)?,
        None => Parameters::default(),
    };
    let params = parameters_from_args(base, &cli.inputs);
    params.validate()?;

    let save_path = preset_save_path(&cli);
    tracing::info!(seed = ?cli.seed, preset = ?cli.preset, "starting explorer");

    crate::tui::run(params, cli.seed, save_path)
}

/// Overlay any flags given on the command line onto `base`.
pub fn parameters_from_args(mut base: Parameters, args: &InputArgs) -> Parameters {
    fn set<T: Copy>(slot: &mut T, value: Option<T>) {
        if let Some(v) = value {
            *slot = v;
        }
    }

    set(&mut base.bin_width, args.bin_width);
    set(&mut base.benchmarks.current, args.current_benchmark);
    set(&mut base.benchmarks.new, args.new_benchmark);

    let main = &mut base.main;
    set(&mut main.segment.count, args.main_count);
    set(&mut main.segment.mean, args.main_mean);
    set(&mut main.segment.std_dev, args.main_std);
    set(&mut main.segment.min, args.main_min);
    set(&mut main.segment.max, args.main_max);
    set(&mut main.skewness, args.skewness);
    set(&mut main.kurtosis, args.kurtosis);

    let low = &mut base.low_tail;
    set(&mut low.count, args.lt_count);
    set(&mut low.mean, args.lt_mean);
    set(&mut low.std_dev, args.lt_std);
    set(&mut low.min, args.lt_min);
    set(&mut low.max, args.lt_max);

    let high = &mut base.high_tail;
    set(&mut high.count, args.gt_count);
    set(&mut high.mean, args.gt_mean);
    set(&mut high.std_dev, args.gt_std);
    set(&mut high.min, args.gt_min);
    set(&mut high.max, args.gt_max);

    set(&mut base.large_sample_size, args.large_sample_size);
    set(&mut base.kurtosis_convention, args.kurtosis_convention);

    // clap guarantees the four manual values come together.
    if let (Some(a), Some(b), Some(loc), Some(scale)) = (args.manual_a, args.manual_b, args.manual_loc, args.manual_scale)
    {
        base.fit_source = FitSource::Manual(JohnsonSuParams { a, b, loc, scale });
    }

    base
}

fn preset_save_path(cli: &Cli) -> PathBuf {
    cli.save_preset
        .clone()
        .or_else(|| cli.preset.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PRESET_PATH))
}

/// Send `tracing` events to `path`; stdout/stderr stay untouched for the TUI.
fn init_file_logging(path: &Path, level: LogLevel) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create log file '{}': {e}", path.display())))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(level.as_tracing())
        .try_init()
        .map_err(|e| AppError::new(4, format!("Failed to install logger: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::KurtosisConvention;

    #[test]
    fn no_flags_keep_the_base() {
        let base = Parameters::default();
        assert_eq!(parameters_from_args(base, &InputArgs::default()), base);
    }

    #[test]
    fn flags_override_individual_fields() {
        let args = InputArgs {
            bin_width: Some(250.0),
            main_count: Some(0),
            lt_max: Some(400.0),
            gt_std: Some(1.0),
            kurtosis_convention: Some(KurtosisConvention::Excess),
            ..InputArgs::default()
        };
        let params = parameters_from_args(Parameters::default(), &args);

        assert_eq!(params.bin_width, 250.0);
        assert_eq!(params.main.segment.count, 0);
        assert_eq!(params.main.segment.mean, 1354.0);
        assert_eq!(params.low_tail.max, 400.0);
        assert_eq!(params.high_tail.std_dev, 1.0);
        assert_eq!(params.kurtosis_convention, KurtosisConvention::Excess);
        assert_eq!(params.fit_source, FitSource::Moments);
    }

    #[test]
    fn manual_flags_switch_fit_source() {
        let args = InputArgs {
            manual_a: Some(0.5),
            manual_b: Some(2.0),
            manual_loc: Some(100.0),
            manual_scale: Some(50.0),
            ..InputArgs::default()
        };
        let params = parameters_from_args(Parameters::default(), &args);
        assert_eq!(
            params.fit_source,
            FitSource::Manual(JohnsonSuParams {
                a: 0.5,
                b: 2.0,
                loc: 100.0,
                scale: 50.0
            })
        );
    }

    #[test]
    fn save_path_prefers_explicit_flag() {
        let cli = Cli::try_parse_from(["dx", "--preset", "a.json", "--save-preset", "b.json"]).unwrap();
        assert_eq!(preset_save_path(&cli), PathBuf::from("b.json"));
        let cli = Cli::try_parse_from(["dx", "--preset", "a.json"]).unwrap();
        assert_eq!(preset_save_path(&cli), PathBuf::from("a.json"));
        let cli = Cli::try_parse_from(["dx"]).unwrap();
        assert_eq!(preset_save_path(&cli), PathBuf::from(DEFAULT_PRESET_PATH));
    }
}
