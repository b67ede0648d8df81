use crate::detector::{DetectionTarget, Method, MethodConfig, QualityMode};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Result (or full report) JSON; printed to stdout when absent.
    pub json_out: Option<PathBuf>,
    /// Final region mask as a black/white PNG.
    pub mask_png: Option<PathBuf>,
    /// Write the stage trace next to the result.
    #[serde(default)]
    pub include_trace: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectToolConfig {
    pub input: PathBuf,
    #[serde(default = "default_method")]
    pub method: Method,
    #[serde(default)]
    pub mode: QualityMode,
    /// Preset the overrides are applied to.
    #[serde(default)]
    pub target: DetectionTarget,
    /// Partial [`MethodConfig`] merged into the preset.
    #[serde(default)]
    pub overrides: Option<Value>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_method() -> Method {
    Method::Combined
}

impl DetectToolConfig {
    /// Preset for `target` with `overrides` merged in and validated.
    pub fn method_config(&self) -> Result<MethodConfig, String> {
        let base = MethodConfig::for_target(self.target);
        match &self.overrides {
            Some(overrides) => base
                .with_overrides(overrides)
                .map_err(|e| format!("Invalid overrides: {e}")),
            None => Ok(base),
        }
    }
}

pub fn load_config(path: &Path) -> Result<DetectToolConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: DetectToolConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg: DetectToolConfig = serde_json::from_str(r#"{ "input": "road.png" }"#).expect("parse");
        assert_eq!(cfg.method, Method::Combined);
        assert_eq!(cfg.mode, QualityMode::Precision);
        assert_eq!(cfg.method_config().expect("preset"), MethodConfig::pothole());
        assert!(cfg.output.json_out.is_none());
    }

    #[test]
    fn overrides_apply_to_selected_preset() {
        let cfg: DetectToolConfig = serde_json::from_str(
            r#"{
                "input": "lawn.jpg",
                "method": "color",
                "mode": "realtime",
                "target": "vegetation",
                "overrides": { "regions": { "coverage_min_area": 250.0 } },
                "output": { "mask_png": "out/mask.png", "include_trace": true }
            }"#,
        )
        .expect("parse");
        let method = cfg.method_config().expect("valid overrides");
        assert_eq!(method.target, DetectionTarget::Vegetation);
        assert_eq!(method.regions.coverage_min_area, 250.0);
        assert_eq!(cfg.mode, QualityMode::RealTime);
        assert!(cfg.output.include_trace);
    }

    #[test]
    fn bad_override_key_is_reported() {
        let cfg: DetectToolConfig = serde_json::from_str(
            r#"{ "input": "x.png", "overrides": { "fusion": { "cut": 0.3 } } }"#,
        )
        .expect("parse");
        assert!(cfg.method_config().is_err());
    }
}
