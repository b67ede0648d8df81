//! Quality modes and the per-call profile they resolve to.
use super::params::ModeParams;
use serde::{Deserialize, Serialize};

/// Speed/accuracy trade-off selected per call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityMode {
    /// Downscaled input, texture skipped, single-pass closing-only cleanup.
    #[serde(alias = "real_time")]
    RealTime,
    /// Full resolution with multi-scale texture, watershed splitting and
    /// confidence refinement.
    #[default]
    Precision,
}

/// Concrete knobs derived from a [`QualityMode`] and [`ModeParams`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeProfile {
    pub mode: QualityMode,
    /// Working resolution relative to the input (1.0 = full).
    pub scale: f32,
    pub skip_texture: bool,
    /// Closing only (no opening) in fusion refinement.
    pub closing_only: bool,
    pub multi_scale_texture: bool,
    pub watershed: bool,
    pub refine_confidence: bool,
}

impl ModeProfile {
    pub fn resolve(mode: QualityMode, params: &ModeParams) -> Self {
        match mode {
            QualityMode::RealTime => ModeProfile {
                mode,
                scale: params.realtime_scale,
                skip_texture: true,
                closing_only: true,
                multi_scale_texture: false,
                watershed: false,
                refine_confidence: false,
            },
            QualityMode::Precision => ModeProfile {
                mode,
                scale: 1.0,
                skip_texture: false,
                closing_only: false,
                multi_scale_texture: params.multi_scale_texture,
                watershed: params.watershed,
                refine_confidence: params.refine_confidence,
            },
        }
    }

    pub fn is_downscaled(&self) -> bool {
        self.scale < 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realtime_profile_is_lean() {
        let p = ModeProfile::resolve(QualityMode::RealTime, &ModeParams::default());
        assert!(p.is_downscaled());
        assert!(p.skip_texture && p.closing_only);
        assert!(!p.watershed && !p.refine_confidence);
    }

    #[test]
    fn precision_profile_runs_at_full_resolution() {
        let p = ModeProfile::resolve(QualityMode::Precision, &ModeParams::default());
        assert_eq!(p.scale, 1.0);
        assert!(p.watershed && p.multi_scale_texture && p.refine_confidence);
    }

    #[test]
    fn mode_names_deserialize() {
        let m: QualityMode = serde_json::from_str("\"realtime\"").expect("alias");
        assert_eq!(m, QualityMode::RealTime);
        assert_eq!(QualityMode::default(), QualityMode::Precision);
    }
}
