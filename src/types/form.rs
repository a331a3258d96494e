//! Posture issues found by the form scorer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormIssue {
    /// Shoulders at different heights
    ShoulderTilt,
    /// Hips at different heights
    HipTilt,
    /// Shoulders too close to hip height on an upright exercise
    Slouch,
}

impl FormIssue {
    /// Coaching cue for the issue
    pub fn cue(&self) -> &'static str {
        match self {
            FormIssue::ShoulderTilt => "Level your shoulders",
            FormIssue::HipTilt => "Keep your hips level",
            FormIssue::Slouch => "Stand tall, chest up",
        }
    }
}
