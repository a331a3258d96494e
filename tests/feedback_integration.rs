//! Integration tests for spoken feedback
//!
//! Cooldowns, rep announcements and the speech channel.

use pretty_assertions::assert_eq;
use tokio::sync::broadcast;

use repcoach::core::synth::{pose_with_angles, squat_sequence};
use repcoach::core::{ChannelSink, CoachSession};
use repcoach::types::{CueKind, ExerciseKind, PoseFrame, Priority, SpeechCommand};
use repcoach::EngineConfig;

fn spoken(rx: &mut broadcast::Receiver<SpeechCommand>) -> Vec<SpeechCommand> {
    let mut commands = Vec::new();
    while let Ok(command) = rx.try_recv() {
        commands.push(command);
    }
    commands
}

fn say_texts(commands: &[SpeechCommand]) -> Vec<String> {
    commands
        .iter()
        .filter_map(|c| match c {
            SpeechCommand::Say { message } => Some(message.text.clone()),
            SpeechCommand::CancelAll => None,
        })
        .collect()
}

fn session_with_channel() -> (CoachSession, broadcast::Receiver<SpeechCommand>) {
    let sink = ChannelSink::new(64);
    let rx = sink.subscribe();
    let session = CoachSession::with_sink(ExerciseKind::Squat, &EngineConfig::default(), Box::new(sink));
    (session, rx)
}

fn run(session: &mut CoachSession, frames: &[PoseFrame]) {
    for frame in frames {
        session.process_frame(frame);
    }
}

#[test]
fn test_squat_set_speech_timeline() {
    let (mut session, mut rx) = session_with_channel();
    run(&mut session, &squat_sequence(30, 6000, 70.0, 150.0, 1.0));

    // Rep 1 lands inside the high-priority cooldown after "Calibration done"
    assert_eq!(
        say_texts(&spoken(&mut rx)),
        vec![
            "Calibrating. Do two slow squats.".to_string(),
            "Calibration done. Start your set.".to_string(),
            "2".to_string(),
        ]
    );
}

#[test]
fn test_rep_announcements_are_high_priority() {
    let config = EngineConfig {
        high_cooldown_ms: 0,
        normal_cooldown_ms: 0,
        ..EngineConfig::default()
    };
    let mut session = CoachSession::new(ExerciseKind::Squat, &config);

    let mut announcements = Vec::new();
    for frame in squat_sequence(30, 10_000, 70.0, 150.0, 1.0) {
        if let Some(analysis) = session.process_frame(&frame) {
            if analysis.rep_completed {
                announcements.extend(
                    analysis
                        .feedback_messages
                        .into_iter()
                        .filter(|m| matches!(m.kind, CueKind::RepCount | CueKind::Milestone)),
                );
            }
        }
    }

    assert_eq!(announcements.len(), session.rep_count() as usize);
    assert!(announcements.iter().all(|m| m.priority == Priority::High));
    assert_eq!(announcements[4].kind, CueKind::Milestone);
    assert_eq!(announcements[4].text, "5 reps, keep it up!");
}

#[test]
fn test_voice_off_still_reports_feedback() {
    let (mut session, mut rx) = session_with_channel();
    session.set_voice_enabled(false);
    assert_eq!(spoken(&mut rx), vec![SpeechCommand::CancelAll]);

    let analysis = session.process_frame(&pose_with_angles(0, 170.0, 180.0)).unwrap();
    assert_eq!(analysis.feedback_messages.len(), 1);
    assert!(spoken(&mut rx).is_empty());

    session.set_voice_enabled(true);
    assert!(session.voice_enabled());
}

#[test]
fn test_stop_cancels_speech() {
    let (mut session, mut rx) = session_with_channel();
    session.process_frame(&pose_with_angles(0, 170.0, 180.0));
    spoken(&mut rx);

    session.stop();
    assert_eq!(spoken(&mut rx), vec![SpeechCommand::CancelAll]);

    // Frames after stop produce nothing, spoken or otherwise
    assert!(session.process_frame(&pose_with_angles(33, 170.0, 180.0)).is_none());
    assert!(spoken(&mut rx).is_empty());
}

#[test]
fn test_alignment_cue_after_calibration() {
    let (mut session, mut rx) = session_with_channel();
    run(&mut session, &squat_sequence(30, 3100, 70.0, 150.0, 1.0));
    spoken(&mut rx);

    // Left shoulder dropped well below the right one
    let mut frame = pose_with_angles(6500, 160.0, 180.0);
    frame.landmarks[11].y += 0.1;
    let analysis = session.process_frame(&frame).unwrap();

    assert_eq!(analysis.form_score, 90);
    assert_eq!(say_texts(&spoken(&mut rx)), vec!["Level your shoulders".to_string()]);
}

#[test]
fn test_no_alignment_cues_while_calibrating() {
    let (mut session, mut rx) = session_with_channel();

    let mut frame = pose_with_angles(0, 170.0, 180.0);
    frame.landmarks[11].y += 0.1;
    let analysis = session.process_frame(&frame).unwrap();

    // Scored, but only the calibration cue is spoken
    assert_eq!(analysis.form_score, 90);
    assert_eq!(say_texts(&spoken(&mut rx)), vec!["Calibrating. Do two slow squats.".to_string()]);
}
