//! repcoach: real-time repetition counter and form scorer
//!
//! Pose frame → joint angles → smoother → calibration | rep state machine
//! → form scorer → feedback dispatcher → AnalysisFrame

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{Error, Result};

// =============================================================================
// LANDMARKS [C]
// =============================================================================

/// Number of landmarks in a full pose (MediaPipe Pose topology)
pub const LANDMARK_COUNT: usize = 33;

/// Landmarks under this visibility are treated as missing
pub const MIN_LANDMARK_VISIBILITY: f64 = 0.5;

// =============================================================================
// SMOOTHER [C]
// =============================================================================

/// Rolling window of primary-angle samples
pub const SMOOTHING_WINDOW: usize = 5;

/// Below this many samples the raw value passes through
pub const SMOOTHING_MIN_SAMPLES: usize = 3;

/// Samples farther than this many std devs from the median are dropped
pub const OUTLIER_SIGMA: f64 = 2.0;

// =============================================================================
// CALIBRATION [C]
// =============================================================================

/// Warm-up window before thresholds may be derived (milliseconds)
pub const CALIBRATION_WARMUP_MS: u64 = 3000;

/// Observed max - min must exceed this before range thresholds are set (degrees)
pub const CALIBRATION_MIN_RANGE_DEG: f64 = 20.0;

/// Down threshold as a fraction of the observed range, from the bottom
pub const DOWN_THRESHOLD_FRACTION: f64 = 0.4;

/// Up threshold as a fraction of the observed range, from the bottom
pub const UP_THRESHOLD_FRACTION: f64 = 0.6;

/// Baseline strategy: samples required, and how many recent ones are averaged
pub const BASELINE_MIN_SAMPLES: usize = 10;

// =============================================================================
// REP STATE MACHINE [C]
// =============================================================================

/// Default minimum interval between counted reps (milliseconds)
pub const DEFAULT_GUARD_MS: u64 = 500;

/// Baseline strategy: deviation that counts as a contraction (degrees)
pub const BASELINE_CONTRACTION_OFFSET_DEG: f64 = 30.0;

/// Baseline strategy: deviation under which the joint is back at extension (degrees)
pub const BASELINE_EXTENSION_OFFSET_DEG: f64 = 10.0;

// =============================================================================
// FORM SCORER [C]
// =============================================================================

pub const FORM_SCORE_MAX: u8 = 100;
pub const FORM_SCORE_FLOOR: u8 = 60;

/// Allowed left/right height difference in normalized image units
pub const LEVEL_TOLERANCE: f64 = 0.05;

/// Shoulder-to-hip vertical separation below this is a collapsed posture
pub const MIN_TORSO_HEIGHT: f64 = 0.1;

pub const SHOULDER_TILT_PENALTY: u8 = 10;
pub const HIP_TILT_PENALTY: u8 = 10;
pub const SLOUCH_PENALTY: u8 = 15;

/// Left/right joint angle difference that triggers a symmetry cue (degrees)
pub const SYMMETRY_TOLERANCE_DEG: f64 = 15.0;

// =============================================================================
// FEEDBACK DISPATCHER [C]
// =============================================================================

/// Cooldown since the last spoken message before a high-priority one (milliseconds)
pub const HIGH_PRIORITY_COOLDOWN_MS: u64 = 1500;

/// Cooldown since the last spoken message before a normal one (milliseconds)
pub const NORMAL_PRIORITY_COOLDOWN_MS: u64 = 3000;

/// Identical text is never repeated inside this window (milliseconds)
pub const DUPLICATE_WINDOW_MS: u64 = 500;

/// Every Nth rep gets a milestone message instead of a bare count
pub const REP_MILESTONE_EVERY: u32 = 5;

// =============================================================================
// SUMMARY [C]
// =============================================================================

/// Average angular velocity above this is rated explosive (deg/s)
pub const TEMPO_EXPLOSIVE_DEG_PER_SEC: f64 = 100.0;

/// Average angular velocity above this is rated controlled (deg/s)
pub const TEMPO_CONTROLLED_DEG_PER_SEC: f64 = 50.0;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
