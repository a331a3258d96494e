//! Rep state and calibrated thresholds

use serde::{Deserialize, Serialize};

/// Position of the current repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepState {
    /// No threshold crossed yet since calibration or reset
    Unset,
    /// Above the up threshold (extended / start position)
    Up,
    /// Below the down threshold (contracted / bottom position)
    Down,
}

impl RepState {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            RepState::Unset => "\x1b[90m", // Gray
            RepState::Up => "\x1b[32m",    // Green
            RepState::Down => "\x1b[33m",  // Yellow
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RepState::Unset => "⏳",
            RepState::Up => "⬆️",
            RepState::Down => "⬇️",
        }
    }
}

impl std::fmt::Display for RepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RepState::Unset => "UNSET",
            RepState::Up => "UP",
            RepState::Down => "DOWN",
        };
        write!(f, "{}", name)
    }
}

/// Rep-detection thresholds derived during calibration (degrees).
/// For the baseline strategy both fields hold the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub down: f64,
    pub up: f64,
}

impl Thresholds {
    pub fn new(down: f64, up: f64) -> Self {
        Self { down, up }
    }

    pub fn baseline(value: f64) -> Self {
        Self { down: value, up: value }
    }
}
