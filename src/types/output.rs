//! Per-frame engine output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    ExerciseKind, FeedbackMessage, FormIssue, JointAngleSet, ReasonCode, RepState, Thresholds,
};

/// Immutable snapshot emitted once per processed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFrame {
    /// Frame timestamp (milliseconds)
    pub timestamp_ms: u64,
    /// Wall-clock time the frame was analyzed
    pub produced_at: DateTime<Utc>,
    pub exercise_type: ExerciseKind,
    /// 0-100, floored at 60 when a pose is present
    pub form_score: u8,
    pub form_issues: Vec<FormIssue>,
    pub rep_count: u32,
    /// True only on the frame that counted a rep
    pub rep_completed: bool,
    /// Smoothed primary angle, if its joints were visible
    pub primary_angle: Option<f64>,
    pub joint_angles: JointAngleSet,
    pub rep_state: RepState,
    pub is_calibrating: bool,
    pub thresholds: Option<Thresholds>,
    /// Messages the dispatcher let through on this frame
    pub feedback_messages: Vec<FeedbackMessage>,
    pub reason: ReasonCode,
}

impl AnalysisFrame {
    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.rep_state.color_code();
        let reset = RepState::color_reset();
        let emoji = if self.is_calibrating { "🎯" } else { self.rep_state.emoji() };

        let mut line = format!(
            "{}{} t={:.2}s | reps={} | state={} | angle={} | form={} | {}{}",
            color,
            emoji,
            self.timestamp_ms as f64 / 1000.0,
            self.rep_count,
            self.rep_state,
            format_angle(self.primary_angle),
            self.form_score,
            self.reason.code(),
            reset
        );
        for message in &self.feedback_messages {
            line.push_str(&format!("\n   🔊 {}", message.text));
        }
        line
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let feedback: Vec<&str> = self.feedback_messages.iter().map(|m| m.text.as_str()).collect();
        format!(
            "t={:.3} | reps={} | state={} | angle={} | form={} | reason={} | feedback={}",
            self.timestamp_ms as f64 / 1000.0,
            self.rep_count,
            self.rep_state,
            format_angle(self.primary_angle),
            self.form_score,
            self.reason.code(),
            feedback.join("; ")
        )
    }
}

fn format_angle(angle: Option<f64>) -> String {
    angle
        .map(|a| format!("{:.1}°", a))
        .unwrap_or_else(|| "-".to_string())
}
