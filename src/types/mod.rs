//! Core types for repcoach

mod landmark;
mod joint;
mod state;
mod exercise;
mod feedback;
mod form;
mod reason;
mod output;
mod summary;

pub use landmark::{Landmark, BodyPart, PoseFrame};
pub use joint::{Joint, JointAngleSet};
pub use state::{RepState, Thresholds};
pub use exercise::ExerciseKind;
pub use feedback::{Priority, CueKind, FeedbackMessage, DispatchOutcome, SpeechCommand};
pub use form::FormIssue;
pub use reason::ReasonCode;
pub use output::AnalysisFrame;
pub use summary::{SessionSummary, Tempo, RangeOfMotion};
