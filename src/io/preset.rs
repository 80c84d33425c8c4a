//! Read/write preset JSON files.
//!
//! A preset is the portable form of the analyst's inputs:
//! - every `Parameters` field (segments, benchmarks, bin width, fit source)
//! - a `tool` tag so stray JSON files are rejected early
//!
//! Fitted parameters are never stored; they are recomputed on load.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Parameters;
use crate::error::AppError;

const TOOL_TAG: &str = "dx";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetFile {
    pub tool: String,
    pub parameters: Parameters,
}

/// Write `params` to a preset JSON file.
pub fn write_preset(path: &Path, params: &Parameters) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create preset '{}': {e}", path.display())))?;

    let preset = PresetFile {
        tool: TOOL_TAG.to_string(),
        parameters: *params,
    };
    serde_json::to_writer_pretty(file, &preset)
        .map_err(|e| AppError::new(2, format!("Failed to write preset JSON: {e}")))?;

    tracing::info!(path = %path.display(), "preset written");
    Ok(())
}

/// Read and validate a preset JSON file.
pub fn read_preset(path: &Path) -> Result<Parameters, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open preset '{}': {e}", path.display())))?;
    let preset: PresetFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid preset JSON: {e}")))?;

    if preset.tool != TOOL_TAG {
        return Err(AppError::new(
            2,
            format!("Preset '{}' was written by '{}', not '{TOOL_TAG}'.", path.display(), preset.tool),
        ));
    }
    preset.parameters.validate()?;
    Ok(preset.parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitSource, JohnsonSuParams, KurtosisConvention};
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dx-preset-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn written_preset_reads_back() {
        let path = scratch("roundtrip");
        let mut params = Parameters::default();
        params.bin_width = 250.0;
        params.kurtosis_convention = KurtosisConvention::Excess;
        params.fit_source = FitSource::Manual(JohnsonSuParams::MANUAL_DEFAULT);

        write_preset(&path, &params).unwrap();
        let back = read_preset(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, params);
    }

    #[test]
    fn optional_fields_default_when_missing() {
        let path = scratch("minimal");
        let mut value = serde_json::to_value(PresetFile {
            tool: TOOL_TAG.to_string(),
            parameters: Parameters::default(),
        })
        .unwrap();
        let obj = value["parameters"].as_object_mut().unwrap();
        obj.remove("kurtosis_convention");
        obj.remove("fit_source");
        std::fs::write(&path, value.to_string()).unwrap();

        let back = read_preset(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back.kurtosis_convention, KurtosisConvention::Pearson);
        assert_eq!(back.fit_source, FitSource::Moments);
    }

    #[test]
    fn invalid_presets_are_rejected() {
        let path = scratch("invalid");
        let mut params = Parameters::default();
        params.bin_width = -5.0;
        std::fs::write(
            &path,
            serde_json::to_string(&PresetFile {
                tool: TOOL_TAG.to_string(),
                parameters: params,
            })
            .unwrap(),
        )
        .unwrap();
        let err = read_preset(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        std::fs::write(&path, r#"{"tool":"rv","parameters":{}}"#).unwrap();
        assert!(read_preset(&path).is_err());
        let _ = std::fs::remove_file(&path);

        assert!(read_preset(&scratch("missing")).is_err());
    }
}
