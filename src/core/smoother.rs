//! Sample Smoother: rolling median-gated mean of the primary angle
//!
//! Keeps the last N samples. With at least 3, samples farther than
//! k standard deviations from the median are dropped and the survivors
//! are averaged. Fewer samples pass the raw value through.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct SampleSmoother {
    window: VecDeque<f64>,
    capacity: usize,
    sigma: f64,
}

impl Default for SampleSmoother {
    fn default() -> Self {
        Self::new(crate::SMOOTHING_WINDOW, crate::OUTLIER_SIGMA)
    }
}

impl SampleSmoother {
    pub fn new(capacity: usize, sigma: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            sigma,
        }
    }

    /// Push a raw sample and return the smoothed value
    pub fn push(&mut self, raw: f64) -> f64 {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(raw);

        if self.window.len() < crate::SMOOTHING_MIN_SAMPLES {
            return raw;
        }
        filtered_mean(self.window.iter().copied(), self.sigma).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

/// Mean of the samples within `sigma` population std devs of the median.
/// `None` if nothing survives.
pub fn filtered_mean(samples: impl Iterator<Item = f64>, sigma: f64) -> Option<f64> {
    let values: Vec<f64> = samples.collect();
    if values.is_empty() {
        return None;
    }

    let median = median(&values);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let bound = sigma * variance.sqrt();

    let kept: Vec<f64> = values
        .into_iter()
        .filter(|v| (v - median).abs() <= bound)
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.iter().sum::<f64>() / kept.len() as f64)
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_passthrough_below_three_samples() {
        let mut smoother = SampleSmoother::default();
        assert_eq!(smoother.push(42.0), 42.0);
        assert_eq!(smoother.push(50.0), 50.0);
    }

    #[test]
    fn test_outlier_excluded() {
        let mut smoother = SampleSmoother::default();
        let mut out = 0.0;
        for v in [10.0, 12.0, 11.0, 90.0, 13.0] {
            out = smoother.push(v);
        }
        // mean of 10, 12, 11, 13
        assert!((out - 11.5).abs() < 1e-9, "got {}", out);
    }

    #[test]
    fn test_window_is_capped() {
        let mut smoother = SampleSmoother::default();
        for i in 0..100 {
            smoother.push(i as f64);
        }
        assert_eq!(smoother.len(), crate::SMOOTHING_WINDOW);
        // last five are 95..=99
        assert!((smoother.push(100.0) - 98.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_signal_survives_zero_variance() {
        let mut smoother = SampleSmoother::default();
        for _ in 0..5 {
            assert_eq!(smoother.push(120.0), 120.0);
        }
    }

    #[test]
    fn test_clear() {
        let mut smoother = SampleSmoother::default();
        smoother.push(1.0);
        smoother.push(2.0);
        smoother.clear();
        assert!(smoother.is_empty());
        assert_eq!(smoother.push(7.0), 7.0);
    }
}
