//! CoachSession: owns all per-session state and runs the frame pipeline
//!
//! angles → smoother → calibration | rep state machine → form scorer
//! → feedback dispatcher → AnalysisFrame
//!
//! One frame is processed to completion before the next is accepted.
//! Reset and exercise switch replace calibration and rep state together.

use chrono::Utc;
use tracing::info;

use crate::core::angle::compute_joint_angles;
use crate::core::calibration::{CalibrationController, CalibrationProgress};
use crate::core::dispatcher::FeedbackDispatcher;
use crate::core::form::FormScorer;
use crate::core::profile::{profile_for, ExerciseProfile};
use crate::core::rep_counter::RepStateMachine;
use crate::core::smoother::SampleSmoother;
use crate::core::speech::{NullSink, SpeechSink};
use crate::core::summary::SessionTracker;
use crate::types::{
    AnalysisFrame, CueKind, ExerciseKind, FeedbackMessage, PoseFrame, Priority, ReasonCode,
    RepState, SessionSummary, Thresholds,
};
use crate::{EngineConfig, REP_MILESTONE_EVERY};

pub const CALIBRATION_DONE_CUE: &str = "Calibration done. Start your set.";
pub const SYMMETRY_CUE: &str = "Keep both sides even";

pub struct CoachSession {
    config: EngineConfig,
    profile: &'static ExerciseProfile,
    smoother: SampleSmoother,
    calibration: CalibrationController,
    reps: RepStateMachine,
    form: FormScorer,
    dispatcher: FeedbackDispatcher,
    tracker: SessionTracker,
    sink: Box<dyn SpeechSink>,
    voice_enabled: bool,
    calibration_announced: bool,
    stopped: bool,
}

impl std::fmt::Debug for CoachSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoachSession")
            .field("exercise", &self.profile.kind)
            .field("calibration", &self.calibration)
            .field("reps", &self.reps)
            .field("voice_enabled", &self.voice_enabled)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl CoachSession {
    /// Session without speech output
    pub fn new(exercise: ExerciseKind, config: &EngineConfig) -> Self {
        Self::with_sink(exercise, config, Box::new(NullSink))
    }

    pub fn with_sink(exercise: ExerciseKind, config: &EngineConfig, sink: Box<dyn SpeechSink>) -> Self {
        let profile = profile_for(exercise);
        Self {
            config: config.clone(),
            profile,
            smoother: SampleSmoother::new(config.smoothing_window, config.outlier_sigma),
            calibration: CalibrationController::new(profile.strategy, config),
            reps: RepStateMachine::new(profile.strategy, config.guard_ms_for(exercise, profile.guard_ms)),
            form: FormScorer::new(config),
            dispatcher: FeedbackDispatcher::new(config),
            tracker: SessionTracker::new(),
            sink,
            voice_enabled: true,
            calibration_announced: false,
            stopped: false,
        }
    }

    /// Run the full pipeline for one frame.
    ///
    /// Returns `None` when the session is stopped or no person is in the frame;
    /// neither case changes calibration or rep state.
    pub fn process_frame(&mut self, frame: &PoseFrame) -> Option<AnalysisFrame> {
        if self.stopped {
            return None;
        }
        let now = frame.timestamp_ms;
        if !frame.has_person() {
            self.tracker.record_skipped(now);
            return None;
        }

        let joint_angles = compute_joint_angles(frame, self.config.min_landmark_visibility);
        let form = self.form.assess(frame, self.profile.upright);

        let mut candidates = Vec::new();
        let mut rep_completed = false;

        let (primary_angle, reason) = match self.profile.primary.select(&joint_angles) {
            None => {
                self.tracker.record_skipped(now);
                (None, ReasonCode::R004_PRIMARY_ANGLE_UNAVAILABLE)
            }
            Some(raw) => {
                let smoothed = self.smoother.push(raw);
                let reason = if self.calibration.is_calibrating() {
                    self.calibrate(smoothed, now, &mut candidates)
                } else {
                    self.count(smoothed, now, &mut candidates, &mut rep_completed)
                };
                (Some(smoothed), reason)
            }
        };

        if !self.calibration.is_calibrating() {
            for issue in &form.issues {
                candidates.push(FeedbackMessage::normal(issue.cue(), CueKind::Alignment, now));
            }
            if let Some((left, right)) = self.profile.symmetry {
                if let Some(diff) = joint_angles.difference(left, right) {
                    if diff > self.config.symmetry_tolerance_deg {
                        candidates.push(FeedbackMessage::normal(SYMMETRY_CUE, CueKind::Symmetry, now));
                    }
                }
            }
        }

        let feedback_messages = self.dispatch(candidates, now);

        if primary_angle.is_some() {
            self.tracker.record_frame(now, form.score, primary_angle);
        }

        Some(AnalysisFrame {
            timestamp_ms: now,
            produced_at: Utc::now(),
            exercise_type: self.profile.kind,
            form_score: form.score,
            form_issues: form.issues,
            rep_count: self.reps.rep_count(),
            rep_completed,
            primary_angle,
            joint_angles,
            rep_state: self.reps.state(),
            is_calibrating: self.calibration.is_calibrating(),
            thresholds: self.calibration.thresholds(),
            feedback_messages,
            reason,
        })
    }

    fn calibrate(&mut self, smoothed: f64, now: u64, candidates: &mut Vec<FeedbackMessage>) -> ReasonCode {
        if !self.calibration_announced {
            self.calibration_announced = true;
            candidates.push(FeedbackMessage::normal(
                self.profile.calibration_cue,
                CueKind::Calibration,
                now,
            ));
        }

        match self.calibration.observe(smoothed, now) {
            CalibrationProgress::Collecting => ReasonCode::R001_CALIBRATING,
            CalibrationProgress::WaitingForMotion => ReasonCode::R001_WAITING_FOR_MOTION,
            CalibrationProgress::Completed(_) => {
                candidates.push(FeedbackMessage::high(CALIBRATION_DONE_CUE, CueKind::Calibration, now));
                ReasonCode::R001_CALIBRATION_COMPLETE
            }
            CalibrationProgress::Frozen(_) => self.state_reason(),
        }
    }

    fn count(
        &mut self,
        smoothed: f64,
        now: u64,
        candidates: &mut Vec<FeedbackMessage>,
        rep_completed: &mut bool,
    ) -> ReasonCode {
        let Some(thresholds) = self.calibration.thresholds() else {
            return ReasonCode::R001_CALIBRATING;
        };
        let update = self.reps.update(smoothed, &thresholds, now);

        if let Some(deepest) = update.phase_deepest {
            if let Some(text) = self.profile.depth_cue(deepest) {
                candidates.push(FeedbackMessage::normal(text, CueKind::Depth, now));
            }
        }

        if let Some(count) = update.rep_completed {
            *rep_completed = true;
            self.tracker.record_rep(now);
            candidates.push(rep_cue(count, now));
            ReasonCode::R003_REP_COUNTED
        } else if update.blocked {
            ReasonCode::R003_REP_BLOCKED_GUARD
        } else {
            self.state_reason()
        }
    }

    /// Offer candidates high priority first; returns what got through
    fn dispatch(&mut self, mut candidates: Vec<FeedbackMessage>, now: u64) -> Vec<FeedbackMessage> {
        candidates.sort_by_key(|m| match m.priority {
            Priority::High => 0,
            Priority::Normal => 1,
        });

        let mut spoken = Vec::new();
        for message in candidates {
            if self.dispatcher.offer(&message, now).is_dispatched() {
                if self.voice_enabled {
                    self.sink.say(&message);
                }
                spoken.push(message);
            }
        }
        spoken
    }

    fn state_reason(&self) -> ReasonCode {
        match self.reps.state() {
            RepState::Unset => ReasonCode::R002_STATE_UNSET,
            RepState::Up => ReasonCode::R002_STATE_UP,
            RepState::Down => ReasonCode::R002_STATE_DOWN,
        }
    }

    /// Clear calibration, rep state, smoothing window and set statistics together.
    /// Calling it repeatedly has the same effect as calling it once.
    pub fn reset(&mut self) {
        self.rebuild(self.profile.kind);
        info!(exercise = %self.profile.kind, "session reset, recalibrating");
    }

    /// Change exercise; resets like `reset` with the new profile
    pub fn switch_exercise(&mut self, exercise: ExerciseKind) {
        let previous = self.profile.kind;
        self.rebuild(exercise);
        info!(from = %previous, to = %exercise, "exercise switched, recalibrating");
    }

    fn rebuild(&mut self, exercise: ExerciseKind) {
        let profile = profile_for(exercise);
        self.profile = profile;
        self.smoother = SampleSmoother::new(self.config.smoothing_window, self.config.outlier_sigma);
        self.calibration = CalibrationController::new(profile.strategy, &self.config);
        self.reps = RepStateMachine::new(
            profile.strategy,
            self.config.guard_ms_for(exercise, profile.guard_ms),
        );
        self.tracker.reset();
        self.calibration_announced = false;
        self.sink.cancel_all();
    }

    pub fn set_voice_enabled(&mut self, enabled: bool) {
        if self.voice_enabled && !enabled {
            self.sink.cancel_all();
        }
        self.voice_enabled = enabled;
    }

    /// Halt frame processing and cancel speech; later frames are ignored
    pub fn stop(&mut self) -> SessionSummary {
        if !self.stopped {
            self.stopped = true;
            self.sink.cancel_all();
            info!(exercise = %self.profile.kind, reps = self.reps.rep_count(), "session stopped");
        }
        self.summary()
    }

    pub fn summary(&self) -> SessionSummary {
        self.tracker.summarize(self.profile.kind, self.reps.rep_count(), self.calibration.thresholds())
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.profile.kind
    }

    pub fn profile(&self) -> &'static ExerciseProfile {
        self.profile
    }

    pub fn rep_count(&self) -> u32 {
        self.reps.rep_count()
    }

    pub fn rep_state(&self) -> RepState {
        self.reps.state()
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_calibrating()
    }

    pub fn thresholds(&self) -> Option<Thresholds> {
        self.calibration.thresholds()
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn frames_processed(&self) -> u64 {
        self.tracker.frames_processed()
    }
}

fn rep_cue(count: u32, now: u64) -> FeedbackMessage {
    if count % REP_MILESTONE_EVERY == 0 {
        FeedbackMessage::high(format!("{} reps, keep it up!", count), CueKind::Milestone, now)
    } else {
        FeedbackMessage::high(count.to_string(), CueKind::RepCount, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::synth::{pose_with_angles, squat_sequence};

    #[test]
    fn test_no_person_is_a_no_op() {
        let mut session = CoachSession::new(ExerciseKind::Squat, &EngineConfig::default());
        assert!(session.process_frame(&PoseFrame::empty(0)).is_none());
        assert!(session.is_calibrating());
        assert_eq!(session.rep_count(), 0);
        assert_eq!(session.summary().frames_skipped, 1);
    }

    #[test]
    fn test_first_frame_announces_calibration() {
        let mut session = CoachSession::new(ExerciseKind::Squat, &EngineConfig::default());
        let frame = session.process_frame(&pose_with_angles(0, 170.0, 170.0)).unwrap();
        assert!(frame.is_calibrating);
        assert_eq!(frame.reason, ReasonCode::R001_CALIBRATING);
        assert_eq!(frame.feedback_messages.len(), 1);
        assert_eq!(frame.feedback_messages[0].kind, CueKind::Calibration);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = CoachSession::new(ExerciseKind::Squat, &EngineConfig::default());
        for frame in squat_sequence(30, 6_000, 70.0, 150.0, 1.0) {
            session.process_frame(&frame);
        }
        assert!(session.rep_count() > 0);

        session.reset();
        assert_eq!(session.rep_count(), 0);
        assert!(session.is_calibrating());
        session.reset();
        assert_eq!(session.rep_count(), 0);
        assert!(session.is_calibrating());
        assert_eq!(session.rep_state(), RepState::Unset);
    }

    #[test]
    fn test_stop_halts_processing() {
        let mut session = CoachSession::new(ExerciseKind::Squat, &EngineConfig::default());
        session.process_frame(&pose_with_angles(0, 170.0, 170.0));
        let summary = session.stop();
        assert_eq!(summary.frames_processed, 1);
        assert!(session.process_frame(&pose_with_angles(33, 170.0, 170.0)).is_none());
        assert_eq!(session.frames_processed(), 1);
    }

    #[test]
    fn test_rep_cue_milestones() {
        assert_eq!(rep_cue(3, 0).text, "3");
        assert_eq!(rep_cue(5, 0).kind, CueKind::Milestone);
    }
}
