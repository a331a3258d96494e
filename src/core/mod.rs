//! Core engine components for repcoach

pub mod angle;
pub mod smoother;
pub mod profile;
pub mod calibration;
pub mod rep_counter;
pub mod form;
pub mod dispatcher;
pub mod speech;
pub mod summary;
pub mod session;
pub mod synth;
pub mod api;

pub use angle::{calculate_angle, compute_joint_angles, joint_angle};
pub use smoother::{filtered_mean, SampleSmoother};
pub use profile::{profile_for, all_profiles, ExerciseProfile, PrimaryAngle, CalibrationStrategy, Direction};
pub use calibration::{CalibrationController, CalibrationProgress};
pub use rep_counter::{RepStateMachine, RepUpdate};
pub use form::{FormAssessment, FormScorer};
pub use dispatcher::FeedbackDispatcher;
pub use speech::{SpeechSink, NullSink, ChannelSink};
pub use summary::{SessionTracker, save_summary, load_summary};
pub use session::CoachSession;
pub use api::{create_router, run_server};
