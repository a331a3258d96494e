//! Coaching messages and speech commands

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
}

/// What produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueKind {
    RepCount,
    Milestone,
    Calibration,
    Depth,
    Alignment,
    Symmetry,
}

/// A short coaching cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMessage {
    pub text: String,
    pub priority: Priority,
    pub kind: CueKind,
    /// Frame timestamp the message was produced for (milliseconds)
    pub timestamp_ms: u64,
}

impl FeedbackMessage {
    pub fn new(text: impl Into<String>, priority: Priority, kind: CueKind, timestamp_ms: u64) -> Self {
        Self {
            text: text.into(),
            priority,
            kind,
            timestamp_ms,
        }
    }

    pub fn high(text: impl Into<String>, kind: CueKind, timestamp_ms: u64) -> Self {
        Self::new(text, Priority::High, kind, timestamp_ms)
    }

    pub fn normal(text: impl Into<String>, kind: CueKind, timestamp_ms: u64) -> Self {
        Self::new(text, Priority::Normal, kind, timestamp_ms)
    }
}

/// Result of offering a message to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    Dispatched,
    /// Not enough time since the last spoken message for this priority
    Cooldown,
    /// Same text as the last spoken message, too soon
    Duplicate,
}

impl DispatchOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, DispatchOutcome::Dispatched)
    }
}

/// Instruction for whatever renders speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SpeechCommand {
    Say { message: FeedbackMessage },
    /// Drop anything queued or playing
    CancelAll,
}
