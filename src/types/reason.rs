//! Reason codes attached to every analysis frame

use serde::{Deserialize, Serialize};

/// Why the engine reported what it reported for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Calibration
    // =========================================================================
    /// Inside the warm-up window, collecting samples
    R001_CALIBRATING,
    /// Warm-up over but not enough motion observed yet
    R001_WAITING_FOR_MOTION,
    /// Thresholds derived on this frame
    R001_CALIBRATION_COMPLETE,

    // =========================================================================
    // R002: Rep state
    // =========================================================================
    /// No threshold crossed yet
    R002_STATE_UNSET,
    /// In the up position
    R002_STATE_UP,
    /// In the down position
    R002_STATE_DOWN,

    // =========================================================================
    // R003: Rep events
    // =========================================================================
    /// A repetition was counted on this frame
    R003_REP_COUNTED,
    /// Down condition met inside the guard interval, suppressed
    R003_REP_BLOCKED_GUARD,

    // =========================================================================
    // R004: Input quality
    // =========================================================================
    /// Primary-angle joints not visible, state machine skipped
    R004_PRIMARY_ANGLE_UNAVAILABLE,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_CALIBRATING => "R001_CALIBRATING",
            Self::R001_WAITING_FOR_MOTION => "R001_WAITING_FOR_MOTION",
            Self::R001_CALIBRATION_COMPLETE => "R001_CALIBRATION_COMPLETE",
            Self::R002_STATE_UNSET => "R002_STATE_UNSET",
            Self::R002_STATE_UP => "R002_STATE_UP",
            Self::R002_STATE_DOWN => "R002_STATE_DOWN",
            Self::R003_REP_COUNTED => "R003_REP_COUNTED",
            Self::R003_REP_BLOCKED_GUARD => "R003_REP_BLOCKED_GUARD",
            Self::R004_PRIMARY_ANGLE_UNAVAILABLE => "R004_PRIMARY_ANGLE_UNAVAILABLE",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_CALIBRATING => "Calibrating",
            Self::R001_WAITING_FOR_MOTION => "Calibrating - move through your full range",
            Self::R001_CALIBRATION_COMPLETE => "Calibration complete",
            Self::R002_STATE_UNSET => "Waiting for first rep",
            Self::R002_STATE_UP => "Up position",
            Self::R002_STATE_DOWN => "Down position",
            Self::R003_REP_COUNTED => "Rep counted",
            Self::R003_REP_BLOCKED_GUARD => "Rep suppressed - too soon after the last one",
            Self::R004_PRIMARY_ANGLE_UNAVAILABLE => "Tracked joints not visible",
        }
    }

    pub fn is_calibrating(&self) -> bool {
        matches!(self, Self::R001_CALIBRATING | Self::R001_WAITING_FOR_MOTION)
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
