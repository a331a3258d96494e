//! Exercise profiles: one static table instead of per-exercise branching
//!
//! Each profile names the joints feeding the primary angle, the calibration
//! strategy, the guard interval and the cue tables used for feedback.

use lazy_static::lazy_static;
use serde::Serialize;

use crate::types::{ExerciseKind, Joint, JointAngleSet};
use crate::{BASELINE_CONTRACTION_OFFSET_DEG, BASELINE_EXTENSION_OFFSET_DEG};

/// Which joint angle(s) drive calibration and counting
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAngle {
    Single(Joint),
    /// Average of both sides; one side alone is used under partial occlusion
    Pair(Joint, Joint),
}

impl PrimaryAngle {
    pub fn select(&self, angles: &JointAngleSet) -> Option<f64> {
        match *self {
            PrimaryAngle::Single(joint) => angles.get(joint),
            PrimaryAngle::Pair(left, right) => match (angles.get(left), angles.get(right)) {
                (Some(l), Some(r)) => Some((l + r) / 2.0),
                (Some(one), None) | (None, Some(one)) => Some(one),
                (None, None) => None,
            },
        }
    }
}

/// Direction the primary angle moves while the muscle contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Decreasing,
    Increasing,
}

impl Direction {
    /// Deviation from `baseline`, positive in the contraction direction
    pub fn signed_deviation(&self, baseline: f64, angle: f64) -> f64 {
        match self {
            Direction::Decreasing => baseline - angle,
            Direction::Increasing => angle - baseline,
        }
    }

    /// True if `candidate` is further into the contraction than `current`
    pub fn is_deeper(&self, candidate: f64, current: f64) -> bool {
        match self {
            Direction::Decreasing => candidate < current,
            Direction::Increasing => candidate > current,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationStrategy {
    /// Thresholds at fixed fractions of the observed range
    Range,
    /// Single baseline; reps measured as signed deviation from it
    Baseline {
        contraction: Direction,
        contraction_offset: f64,
        extension_offset: f64,
    },
}

impl CalibrationStrategy {
    /// Contraction direction used for depth tracking
    pub fn contraction(&self) -> Direction {
        match self {
            CalibrationStrategy::Range => Direction::Decreasing,
            CalibrationStrategy::Baseline { contraction, .. } => *contraction,
        }
    }
}

/// A depth cue: spoken when the deepest angle of a rep falls in [min, max)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngleBand {
    pub min: f64,
    pub max: f64,
    pub text: &'static str,
}

impl AngleBand {
    const fn new(min: f64, max: f64, text: &'static str) -> Self {
        Self { min, max, text }
    }

    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle < self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseProfile {
    pub kind: ExerciseKind,
    pub display_name: &'static str,
    pub primary: PrimaryAngle,
    pub strategy: CalibrationStrategy,
    /// Minimum interval between counted reps (milliseconds)
    pub guard_ms: u64,
    /// Whether the slouch check applies (torso expected vertical)
    pub upright: bool,
    /// Left/right joints compared for the symmetry cue
    pub symmetry: Option<(Joint, Joint)>,
    pub depth_bands: Vec<AngleBand>,
    pub calibration_cue: &'static str,
}

impl ExerciseProfile {
    /// Depth cue for the deepest angle reached in a rep
    pub fn depth_cue(&self, deepest: f64) -> Option<&'static str> {
        self.depth_bands
            .iter()
            .find(|band| band.contains(deepest))
            .map(|band| band.text)
    }
}

const ANGLE_CEILING: f64 = 181.0;

fn baseline(contraction: Direction) -> CalibrationStrategy {
    CalibrationStrategy::Baseline {
        contraction,
        contraction_offset: BASELINE_CONTRACTION_OFFSET_DEG,
        extension_offset: BASELINE_EXTENSION_OFFSET_DEG,
    }
}

fn build_profile(kind: ExerciseKind) -> ExerciseProfile {
    use Joint::*;
    match kind {
        ExerciseKind::Squat => ExerciseProfile {
            kind,
            display_name: "Squat",
            primary: PrimaryAngle::Pair(LeftKnee, RightKnee),
            strategy: CalibrationStrategy::Range,
            guard_ms: 500,
            upright: true,
            symmetry: Some((LeftKnee, RightKnee)),
            depth_bands: vec![
                AngleBand::new(0.0, 90.0, "Great depth!"),
                AngleBand::new(90.0, 110.0, "Almost there, sink a little lower"),
                AngleBand::new(110.0, ANGLE_CEILING, "Go deeper, aim for thighs parallel"),
            ],
            calibration_cue: "Calibrating. Do two slow squats.",
        },
        ExerciseKind::PushUp => ExerciseProfile {
            kind,
            display_name: "Push-up",
            primary: PrimaryAngle::Pair(LeftElbow, RightElbow),
            strategy: CalibrationStrategy::Range,
            guard_ms: 400,
            upright: false,
            symmetry: Some((LeftElbow, RightElbow)),
            depth_bands: vec![
                AngleBand::new(0.0, 100.0, "Nice full push-up"),
                AngleBand::new(100.0, 120.0, "Lower your chest a bit more"),
                AngleBand::new(120.0, ANGLE_CEILING, "Bend your elbows more"),
            ],
            calibration_cue: "Calibrating. Do two slow push-ups.",
        },
        ExerciseKind::Deadlift => ExerciseProfile {
            kind,
            display_name: "Deadlift",
            primary: PrimaryAngle::Pair(LeftHip, RightHip),
            strategy: CalibrationStrategy::Range,
            guard_ms: 800,
            upright: false,
            symmetry: Some((LeftHip, RightHip)),
            depth_bands: vec![
                AngleBand::new(0.0, 80.0, "Good hip hinge"),
                AngleBand::new(80.0, ANGLE_CEILING, "Hinge further at the hips"),
            ],
            calibration_cue: "Calibrating. Do two slow deadlifts.",
        },
        ExerciseKind::Lunge => ExerciseProfile {
            kind,
            display_name: "Lunge",
            primary: PrimaryAngle::Pair(LeftKnee, RightKnee),
            strategy: CalibrationStrategy::Range,
            guard_ms: 600,
            upright: true,
            symmetry: None,
            depth_bands: vec![
                AngleBand::new(0.0, 100.0, "Good lunge depth"),
                AngleBand::new(100.0, ANGLE_CEILING, "Drop your back knee lower"),
            ],
            calibration_cue: "Calibrating. Do two slow lunges.",
        },
        ExerciseKind::ShoulderPress => ExerciseProfile {
            kind,
            display_name: "Shoulder press",
            primary: PrimaryAngle::Pair(LeftElbow, RightElbow),
            strategy: CalibrationStrategy::Range,
            guard_ms: 600,
            upright: true,
            symmetry: Some((LeftElbow, RightElbow)),
            depth_bands: vec![
                AngleBand::new(0.0, 100.0, "Good, full range"),
                AngleBand::new(100.0, ANGLE_CEILING, "Bring the weights down to shoulder level"),
            ],
            calibration_cue: "Calibrating. Do two slow presses.",
        },
        ExerciseKind::BicepCurl => ExerciseProfile {
            kind,
            display_name: "Bicep curl",
            primary: PrimaryAngle::Single(RightElbow),
            strategy: baseline(Direction::Decreasing),
            guard_ms: 500,
            upright: true,
            symmetry: None,
            depth_bands: vec![
                AngleBand::new(0.0, 50.0, "Full curl, nice squeeze"),
                AngleBand::new(50.0, ANGLE_CEILING, "Curl the weight all the way up"),
            ],
            calibration_cue: "Calibrating. Hold your arm straight down.",
        },
        ExerciseKind::LateralRaise => ExerciseProfile {
            kind,
            display_name: "Lateral raise",
            primary: PrimaryAngle::Pair(LeftShoulder, RightShoulder),
            strategy: baseline(Direction::Increasing),
            guard_ms: 800,
            upright: true,
            symmetry: Some((LeftShoulder, RightShoulder)),
            depth_bands: vec![
                AngleBand::new(80.0, ANGLE_CEILING, "Good height"),
                AngleBand::new(0.0, 80.0, "Raise your arms to shoulder height"),
            ],
            calibration_cue: "Calibrating. Let your arms hang relaxed.",
        },
        ExerciseKind::General => ExerciseProfile {
            kind,
            display_name: "General",
            primary: PrimaryAngle::Pair(LeftKnee, RightKnee),
            strategy: CalibrationStrategy::Range,
            guard_ms: crate::DEFAULT_GUARD_MS,
            upright: true,
            symmetry: None,
            depth_bands: Vec::new(),
            calibration_cue: "Calibrating. Move through your full range a few times.",
        },
    }
}

lazy_static! {
    // Indexed by ExerciseKind discriminant
    static ref PROFILES: Vec<ExerciseProfile> =
        ExerciseKind::ALL.iter().map(|kind| build_profile(*kind)).collect();
}

/// Static profile for an exercise
pub fn profile_for(kind: ExerciseKind) -> &'static ExerciseProfile {
    &PROFILES[kind as usize]
}

/// All profiles in table order
pub fn all_profiles() -> &'static [ExerciseProfile] {
    &PROFILES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_kind() {
        for kind in ExerciseKind::ALL {
            assert_eq!(profile_for(kind).kind, kind);
        }
    }

    #[test]
    fn test_pair_falls_back_to_visible_side() {
        let primary = PrimaryAngle::Pair(Joint::LeftKnee, Joint::RightKnee);
        let mut angles = JointAngleSet::new();
        assert_eq!(primary.select(&angles), None);
        angles.insert(Joint::RightKnee, 100.0);
        assert_eq!(primary.select(&angles), Some(100.0));
        angles.insert(Joint::LeftKnee, 80.0);
        assert_eq!(primary.select(&angles), Some(90.0));
    }

    #[test]
    fn test_squat_depth_bands() {
        let squat = profile_for(ExerciseKind::Squat);
        assert_eq!(squat.depth_cue(85.0), Some("Great depth!"));
        assert_eq!(squat.depth_cue(100.0), Some("Almost there, sink a little lower"));
        assert_eq!(squat.depth_cue(130.0), Some("Go deeper, aim for thighs parallel"));
    }

    #[test]
    fn test_curl_uses_baseline() {
        let curl = profile_for(ExerciseKind::BicepCurl);
        assert!(matches!(curl.strategy, CalibrationStrategy::Baseline { .. }));
        assert_eq!(curl.strategy.contraction(), Direction::Decreasing);
        assert_eq!(profile_for(ExerciseKind::LateralRaise).strategy.contraction(), Direction::Increasing);
    }

    #[test]
    fn test_signed_deviation() {
        assert_eq!(Direction::Decreasing.signed_deviation(160.0, 120.0), 40.0);
        assert_eq!(Direction::Increasing.signed_deviation(15.0, 60.0), 45.0);
    }
}
