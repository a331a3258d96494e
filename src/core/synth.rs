//! Synthetic pose generator
//!
//! Builds left/right symmetric 33-point frames whose knee, elbow, hip and
//! shoulder angles are exactly the requested values. Drives `--demo` and the
//! tests.

use std::f64::consts::PI;

use crate::core::profile::{profile_for, CalibrationStrategy, PrimaryAngle};
use crate::types::{BodyPart, ExerciseKind, Joint, Landmark, PoseFrame};
use crate::LANDMARK_COUNT;

const VISIBILITY: f64 = 0.99;
const HIP_Y: f64 = 0.5;
const TORSO: f64 = 0.25;
const THIGH: f64 = 0.2;
const SHIN: f64 = 0.2;
const UPPER_ARM: f64 = 0.15;
const FOREARM: f64 = 0.15;

/// Joint angles for one synthetic frame, applied to both sides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posture {
    pub knee: f64,
    pub elbow: f64,
    /// 180 is standing tall; lower values hinge the torso over the hips
    pub hip: f64,
    /// 0 is the arm along the torso; 90 is raised out to the side
    pub shoulder: f64,
}

impl Default for Posture {
    fn default() -> Self {
        Self { knee: 180.0, elbow: 180.0, hip: 180.0, shoulder: 0.0 }
    }
}

impl Posture {
    pub fn new(knee: f64, elbow: f64) -> Self {
        Self { knee, elbow, ..Self::default() }
    }
}

/// Point at `length` from `vertex`, rotated `degrees` away from straight up.
/// `side` is -1.0 for the left half of the body, 1.0 for the right.
fn limb_end(vertex: (f64, f64), degrees: f64, length: f64, side: f64) -> (f64, f64) {
    let rad = degrees.to_radians();
    (vertex.0 + side * rad.sin() * length, vertex.1 - rad.cos() * length)
}

fn set(landmarks: &mut [Landmark], part: BodyPart, point: (f64, f64)) {
    landmarks[part.index()] = Landmark::new(point.0, point.1, VISIBILITY);
}

/// One frame with both knees at `knee_deg` and both elbows at `elbow_deg`
pub fn pose_with_angles(timestamp_ms: u64, knee_deg: f64, elbow_deg: f64) -> PoseFrame {
    pose(timestamp_ms, Posture::new(knee_deg, elbow_deg))
}

/// One frame in the given posture
pub fn pose(timestamp_ms: u64, posture: Posture) -> PoseFrame {
    let mut landmarks = vec![Landmark::new(0.5, 0.5, VISIBILITY); LANDMARK_COUNT];
    set(&mut landmarks, BodyPart::Nose, (0.5, 0.1));

    let sides = [
        (-1.0, 0.45, BodyPart::LeftShoulder, BodyPart::LeftElbow, BodyPart::LeftWrist,
         BodyPart::LeftHip, BodyPart::LeftKnee, BodyPart::LeftAnkle, BodyPart::LeftFootIndex),
        (1.0, 0.55, BodyPart::RightShoulder, BodyPart::RightElbow, BodyPart::RightWrist,
         BodyPart::RightHip, BodyPart::RightKnee, BodyPart::RightAnkle, BodyPart::RightFootIndex),
    ];

    // Directions in degrees from straight up: the torso leans by 180 - hip,
    // the upper arm swings `shoulder` away from the shoulder-hip line and the
    // forearm bends `elbow` away from the upper arm.
    let torso_dir = 180.0 - posture.hip;
    let upper_arm_dir = torso_dir + 180.0 - posture.shoulder;
    let forearm_dir = torso_dir - posture.shoulder + posture.elbow;

    for (side, x, shoulder, elbow, wrist, hip, knee, ankle, foot) in sides {
        let hip_pt = (x, HIP_Y);
        let knee_pt = (x, HIP_Y + THIGH);
        let ankle_pt = limb_end(knee_pt, posture.knee, SHIN, side);
        let shoulder_pt = limb_end(hip_pt, torso_dir, TORSO, side);
        let elbow_pt = limb_end(shoulder_pt, upper_arm_dir, UPPER_ARM, side);

        set(&mut landmarks, shoulder, shoulder_pt);
        set(&mut landmarks, elbow, elbow_pt);
        set(&mut landmarks, wrist, limb_end(elbow_pt, forearm_dir, FOREARM, side));
        set(&mut landmarks, hip, hip_pt);
        set(&mut landmarks, knee, knee_pt);
        set(&mut landmarks, ankle, ankle_pt);
        set(&mut landmarks, foot, (ankle_pt.0 + side * 0.05, ankle_pt.1));
    }

    PoseFrame::new(timestamp_ms, landmarks)
}

/// Drop the visibility of some landmarks below any sensible threshold
pub fn occlude(mut frame: PoseFrame, parts: &[BodyPart]) -> PoseFrame {
    for part in parts {
        if let Some(landmark) = frame.landmarks.get_mut(part.index()) {
            landmark.visibility = 0.1;
        }
    }
    frame
}

/// Frames at `fps` for `duration_ms`, posture from `posture(t_seconds)`
pub fn posture_sequence(fps: u32, duration_ms: u64, posture: impl Fn(f64) -> Posture) -> Vec<PoseFrame> {
    let fps = u64::from(fps.max(1));
    let count = duration_ms * fps / 1000;
    (0..count)
        .map(|i| {
            let timestamp_ms = i * 1000 / fps;
            pose(timestamp_ms, posture(timestamp_ms as f64 / 1000.0))
        })
        .collect()
}

/// Frames at `fps` for `duration_ms`, angles from `angles(t_seconds) -> (knee, elbow)`
pub fn sequence(fps: u32, duration_ms: u64, angles: impl Fn(f64) -> (f64, f64)) -> Vec<PoseFrame> {
    posture_sequence(fps, duration_ms, |t| {
        let (knee, elbow) = angles(t);
        Posture::new(knee, elbow)
    })
}

/// Cosine oscillation between `low` and `high`, starting at `low`
pub fn oscillate(t: f64, low: f64, high: f64, period_s: f64) -> f64 {
    let mid = (low + high) / 2.0;
    let amp = (high - low) / 2.0;
    mid - amp * (2.0 * PI * t / period_s).cos()
}

/// Squats: knees oscillate between `low` and `high`, arms hang straight
pub fn squat_sequence(fps: u32, duration_ms: u64, low: f64, high: f64, period_s: f64) -> Vec<PoseFrame> {
    sequence(fps, duration_ms, |t| (oscillate(t, low, high, period_s), 180.0))
}

/// Arm hangs at 170° for `hold_ms`, then curls between 170° and 40°
pub fn curl_sequence(fps: u32, duration_ms: u64, hold_ms: u64) -> Vec<PoseFrame> {
    let hold_s = hold_ms as f64 / 1000.0;
    sequence(fps, duration_ms, |t| {
        let elbow = if t < hold_s { 170.0 } else { oscillate(t - hold_s, 170.0, 40.0, 1.5) };
        (180.0, elbow)
    })
}

/// Knees soft, torso hinging between 70° and 170° at the hips
pub fn hinge_sequence(fps: u32, duration_ms: u64) -> Vec<PoseFrame> {
    posture_sequence(fps, duration_ms, |t| Posture {
        knee: 165.0,
        hip: oscillate(t, 70.0, 170.0, 2.0),
        ..Posture::default()
    })
}

/// Arms rest at 15° from the torso for `hold_ms`, then raise to 90° and back
pub fn raise_sequence(fps: u32, duration_ms: u64, hold_ms: u64) -> Vec<PoseFrame> {
    let hold_s = hold_ms as f64 / 1000.0;
    posture_sequence(fps, duration_ms, |t| {
        let shoulder = if t < hold_s { 15.0 } else { oscillate(t - hold_s, 15.0, 90.0, 2.0) };
        Posture { shoulder, ..Posture::default() }
    })
}

/// A set the exercise's primary angle responds to
pub fn demo_sequence(kind: ExerciseKind, fps: u32, duration_ms: u64) -> Vec<PoseFrame> {
    let profile = profile_for(kind);
    let driver = match profile.primary {
        PrimaryAngle::Single(joint) | PrimaryAngle::Pair(joint, _) => joint,
    };

    match (driver, profile.strategy) {
        (Joint::LeftElbow | Joint::RightElbow, CalibrationStrategy::Baseline { .. }) => {
            curl_sequence(fps, duration_ms, 3500)
        }
        (Joint::LeftElbow | Joint::RightElbow, _) => {
            sequence(fps, duration_ms, |t| (180.0, oscillate(t, 80.0, 165.0, 1.5)))
        }
        (Joint::LeftHip | Joint::RightHip, _) => hinge_sequence(fps, duration_ms),
        (Joint::LeftShoulder | Joint::RightShoulder, _) => raise_sequence(fps, duration_ms, 3500),
        _ => squat_sequence(fps, duration_ms, 70.0, 150.0, 1.5),
    }
}
