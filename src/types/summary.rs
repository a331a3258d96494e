//! End-of-session summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ExerciseKind, Thresholds};

/// Movement speed rating from average angular velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tempo {
    Explosive,
    Controlled,
    Slow,
}

impl Tempo {
    pub fn from_velocity(avg_deg_per_sec: f64) -> Self {
        if avg_deg_per_sec > crate::TEMPO_EXPLOSIVE_DEG_PER_SEC {
            Tempo::Explosive
        } else if avg_deg_per_sec > crate::TEMPO_CONTROLLED_DEG_PER_SEC {
            Tempo::Controlled
        } else {
            Tempo::Slow
        }
    }
}

/// Smoothed primary-angle extremes (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeOfMotion {
    pub min: f64,
    pub max: f64,
}

impl RangeOfMotion {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub exercise_type: ExerciseKind,
    pub rep_count: u32,
    pub rep_timestamps_ms: Vec<u64>,
    /// Mean form score over processed frames
    pub form_score_avg: Option<f64>,
    pub range_of_motion: Option<RangeOfMotion>,
    pub avg_velocity_deg_per_sec: f64,
    pub max_velocity_deg_per_sec: f64,
    pub tempo: Tempo,
    pub duration_ms: u64,
    pub frames_processed: u64,
    /// Frames without a person or without a usable primary angle
    pub frames_skipped: u64,
    pub thresholds: Option<Thresholds>,
}
