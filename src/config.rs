//! Engine tunables, loadable from TOML
//!
//! ```toml
//! calibration_warmup_ms = 2500
//! normal_cooldown_ms = 4000
//!
//! [guard_ms]
//! push_up = 350
//! ```
//!
//! Every key is optional; missing keys keep the crate-root defaults.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::ExerciseKind;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_landmark_visibility: f64,

    pub smoothing_window: usize,
    pub outlier_sigma: f64,

    pub calibration_warmup_ms: u64,
    pub calibration_min_range_deg: f64,
    pub down_threshold_fraction: f64,
    pub up_threshold_fraction: f64,
    pub baseline_min_samples: usize,

    pub level_tolerance: f64,
    pub min_torso_height: f64,
    pub symmetry_tolerance_deg: f64,

    pub high_cooldown_ms: u64,
    pub normal_cooldown_ms: u64,
    pub duplicate_window_ms: u64,

    /// Per-exercise guard interval overrides, keyed by exercise id
    pub guard_ms: HashMap<String, u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_landmark_visibility: crate::MIN_LANDMARK_VISIBILITY,
            smoothing_window: crate::SMOOTHING_WINDOW,
            outlier_sigma: crate::OUTLIER_SIGMA,
            calibration_warmup_ms: crate::CALIBRATION_WARMUP_MS,
            calibration_min_range_deg: crate::CALIBRATION_MIN_RANGE_DEG,
            down_threshold_fraction: crate::DOWN_THRESHOLD_FRACTION,
            up_threshold_fraction: crate::UP_THRESHOLD_FRACTION,
            baseline_min_samples: crate::BASELINE_MIN_SAMPLES,
            level_tolerance: crate::LEVEL_TOLERANCE,
            min_torso_height: crate::MIN_TORSO_HEIGHT,
            symmetry_tolerance_deg: crate::SYMMETRY_TOLERANCE_DEG,
            high_cooldown_ms: crate::HIGH_PRIORITY_COOLDOWN_MS,
            normal_cooldown_ms: crate::NORMAL_PRIORITY_COOLDOWN_MS,
            duplicate_window_ms: crate::DUPLICATE_WINDOW_MS,
            guard_ms: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse from TOML text and validate
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Guard interval for an exercise: override if configured, profile default otherwise
    pub fn guard_ms_for(&self, kind: ExerciseKind, profile_default: u64) -> u64 {
        self.guard_ms
            .iter()
            .find(|(key, _)| ExerciseKind::from_id(key) == Some(kind))
            .map(|(_, ms)| *ms)
            .unwrap_or(profile_default)
    }

    fn validate(&self) -> Result<()> {
        if self.smoothing_window == 0 {
            return Err(crate::Error::Config("smoothing_window must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.min_landmark_visibility) {
            return Err(crate::Error::Config(
                "min_landmark_visibility must be within [0, 1]".into(),
            ));
        }
        let fractions = 0.0..=1.0;
        if !fractions.contains(&self.down_threshold_fraction)
            || !fractions.contains(&self.up_threshold_fraction)
            || self.down_threshold_fraction > self.up_threshold_fraction
        {
            return Err(crate::Error::Config(
                "threshold fractions must satisfy 0 <= down <= up <= 1".into(),
            ));
        }
        if self.baseline_min_samples == 0 {
            return Err(crate::Error::Config("baseline_min_samples must be at least 1".into()));
        }
        let mut seen: HashMap<ExerciseKind, &str> = HashMap::new();
        for key in self.guard_ms.keys() {
            let kind = ExerciseKind::from_id(key).ok_or_else(|| {
                crate::Error::Config(format!("unknown exercise in [guard_ms]: {}", key))
            })?;
            if let Some(other) = seen.insert(kind, key) {
                return Err(crate::Error::Config(format!(
                    "[guard_ms] sets {} twice: {} and {}",
                    kind, other, key
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            "calibration_warmup_ms = 2000\n[guard_ms]\npush_up = 350\n",
        )
        .unwrap();
        assert_eq!(config.calibration_warmup_ms, 2000);
        assert_eq!(config.normal_cooldown_ms, crate::NORMAL_PRIORITY_COOLDOWN_MS);
        assert_eq!(config.guard_ms_for(ExerciseKind::PushUp, 400), 350);
        assert_eq!(config.guard_ms_for(ExerciseKind::Squat, 500), 500);
    }

    #[test]
    fn test_rejects_inverted_fractions() {
        let err = EngineConfig::from_toml_str(
            "down_threshold_fraction = 0.7\nup_threshold_fraction = 0.3\n",
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_unknown_guard_key() {
        assert!(EngineConfig::from_toml_str("[guard_ms]\nzumba = 100\n").is_err());
    }

    #[test]
    fn test_rejects_aliased_guard_keys() {
        let err = EngineConfig::from_toml_str("[guard_ms]\npushup = 300\npush_up = 350\n");
        assert!(matches!(err, Err(crate::Error::Config(_))));
        assert!(EngineConfig::from_toml_str("[guard_ms]\npushup = 300\nsquat = 350\n").is_ok());
    }
}
