//! Calibration Controller: derives person-specific thresholds from warm-up motion
//!
//! Range strategy: after the warm-up window, once max - min exceeds the
//! minimum range, down = min + 0.4 * range and up = min + 0.6 * range.
//! Baseline strategy: after the warm-up window and a minimum sample count,
//! the mean of the most recent samples becomes the baseline.
//!
//! Neither strategy times out. Once thresholds are set they are frozen until
//! the controller is replaced or reset.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::core::profile::CalibrationStrategy;
use crate::types::Thresholds;
use crate::EngineConfig;

/// Retained warm-up samples; older ones age out while waiting for motion
const MAX_CALIBRATION_SAMPLES: usize = 900;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationProgress {
    /// Inside the warm-up window
    Collecting,
    /// Warm-up elapsed, motion or sample count still insufficient
    WaitingForMotion,
    /// Thresholds derived on this sample
    Completed(Thresholds),
    /// Already calibrated; the sample was ignored
    Frozen(Thresholds),
}

#[derive(Debug, Clone)]
pub struct CalibrationController {
    strategy: CalibrationStrategy,
    warmup_ms: u64,
    min_range: f64,
    down_fraction: f64,
    up_fraction: f64,
    baseline_samples: usize,
    start_ms: Option<u64>,
    samples: VecDeque<f64>,
    thresholds: Option<Thresholds>,
}

impl CalibrationController {
    pub fn new(strategy: CalibrationStrategy, config: &EngineConfig) -> Self {
        Self {
            strategy,
            warmup_ms: config.calibration_warmup_ms,
            min_range: config.calibration_min_range_deg,
            down_fraction: config.down_threshold_fraction,
            up_fraction: config.up_threshold_fraction,
            baseline_samples: config.baseline_min_samples,
            start_ms: None,
            samples: VecDeque::new(),
            thresholds: None,
        }
    }

    /// Feed one smoothed primary-angle sample
    pub fn observe(&mut self, smoothed: f64, now_ms: u64) -> CalibrationProgress {
        if let Some(thresholds) = self.thresholds {
            return CalibrationProgress::Frozen(thresholds);
        }

        let start = *self.start_ms.get_or_insert(now_ms);
        if self.samples.len() == MAX_CALIBRATION_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(smoothed);

        if now_ms.saturating_sub(start) < self.warmup_ms {
            return CalibrationProgress::Collecting;
        }

        let derived = match self.strategy {
            CalibrationStrategy::Range => self.derive_range(),
            CalibrationStrategy::Baseline { .. } => self.derive_baseline(),
        };

        match derived {
            Some(thresholds) => {
                info!(
                    down = thresholds.down,
                    up = thresholds.up,
                    samples = self.samples.len(),
                    elapsed_ms = now_ms.saturating_sub(start),
                    "calibration complete"
                );
                self.thresholds = Some(thresholds);
                CalibrationProgress::Completed(thresholds)
            }
            None => CalibrationProgress::WaitingForMotion,
        }
    }

    fn derive_range(&self) -> Option<Thresholds> {
        let (min, max) = self
            .samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
        let range = max - min;

        if range <= self.min_range {
            debug!(range, min_range = self.min_range, "not enough motion yet");
            return None;
        }
        Some(Thresholds::new(
            min + range * self.down_fraction,
            min + range * self.up_fraction,
        ))
    }

    fn derive_baseline(&self) -> Option<Thresholds> {
        if self.samples.len() < self.baseline_samples {
            debug!(samples = self.samples.len(), needed = self.baseline_samples, "baseline needs more samples");
            return None;
        }
        let recent = self.samples.iter().rev().take(self.baseline_samples);
        let mean = recent.sum::<f64>() / self.baseline_samples as f64;
        Some(Thresholds::baseline(mean))
    }

    pub fn is_calibrating(&self) -> bool {
        self.thresholds.is_none()
    }

    pub fn thresholds(&self) -> Option<Thresholds> {
        self.thresholds
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Back to a fresh, uncalibrated state
    pub fn reset(&mut self) {
        self.start_ms = None;
        self.samples.clear();
        self.thresholds = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::Direction;

    fn range_controller() -> CalibrationController {
        CalibrationController::new(CalibrationStrategy::Range, &EngineConfig::default())
    }

    #[test]
    fn test_collects_during_warmup() {
        let mut cal = range_controller();
        assert_eq!(cal.observe(60.0, 0), CalibrationProgress::Collecting);
        assert_eq!(cal.observe(160.0, 2999), CalibrationProgress::Collecting);
        assert!(cal.is_calibrating());
    }

    #[test]
    fn test_range_thresholds() {
        let mut cal = range_controller();
        cal.observe(60.0, 0);
        cal.observe(160.0, 1500);
        match cal.observe(110.0, 3000) {
            CalibrationProgress::Completed(t) => {
                assert!((t.down - 100.0).abs() < 1e-9);
                assert!((t.up - 120.0).abs() < 1e-9);
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert!(!cal.is_calibrating());
    }

    #[test]
    fn test_waits_without_motion() {
        let mut cal = range_controller();
        for i in 0..300 {
            let progress = cal.observe(150.0 + (i % 3) as f64, i * 33);
            assert!(!matches!(progress, CalibrationProgress::Completed(_)));
        }
        assert!(cal.is_calibrating());
        assert_eq!(cal.observe(150.0, 10_000), CalibrationProgress::WaitingForMotion);
    }

    #[test]
    fn test_frozen_after_completion() {
        let mut cal = range_controller();
        cal.observe(60.0, 0);
        cal.observe(160.0, 3000);
        let frozen = cal.thresholds().unwrap();

        assert_eq!(cal.observe(10.0, 4000), CalibrationProgress::Frozen(frozen));
        assert_eq!(cal.observe(179.0, 5000), CalibrationProgress::Frozen(frozen));
        assert_eq!(cal.thresholds(), Some(frozen));
    }

    #[test]
    fn test_baseline_needs_sample_count() {
        let strategy = CalibrationStrategy::Baseline {
            contraction: Direction::Decreasing,
            contraction_offset: 30.0,
            extension_offset: 10.0,
        };
        let mut cal = CalibrationController::new(strategy, &EngineConfig::default());

        // Warm-up elapses on the second sample, but the count is short
        cal.observe(150.0, 0);
        assert_eq!(cal.observe(150.0, 3000), CalibrationProgress::WaitingForMotion);

        let mut last = CalibrationProgress::Collecting;
        for i in 0..crate::BASELINE_MIN_SAMPLES as u64 {
            last = cal.observe(160.0, 3100 + i * 33);
            if matches!(last, CalibrationProgress::Completed(_)) {
                break;
            }
        }
        match last {
            CalibrationProgress::Completed(t) => {
                assert_eq!(t.down, t.up);
                assert!(t.down > 150.0 && t.down <= 160.0);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut cal = range_controller();
        cal.observe(60.0, 0);
        cal.observe(160.0, 3000);
        cal.reset();
        assert!(cal.is_calibrating());
        assert_eq!(cal.sample_count(), 0);
        assert_eq!(cal.observe(100.0, 50_000), CalibrationProgress::Collecting);
    }
}
