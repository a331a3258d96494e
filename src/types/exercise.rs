//! Exercise identifiers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Squat,
    PushUp,
    Deadlift,
    Lunge,
    ShoulderPress,
    BicepCurl,
    LateralRaise,
    /// Fallback for anything unrecognized
    General,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 8] = [
        ExerciseKind::Squat,
        ExerciseKind::PushUp,
        ExerciseKind::Deadlift,
        ExerciseKind::Lunge,
        ExerciseKind::ShoulderPress,
        ExerciseKind::BicepCurl,
        ExerciseKind::LateralRaise,
        ExerciseKind::General,
    ];

    /// Canonical identifier
    pub fn id(&self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::PushUp => "push_up",
            ExerciseKind::Deadlift => "deadlift",
            ExerciseKind::Lunge => "lunge",
            ExerciseKind::ShoulderPress => "shoulder_press",
            ExerciseKind::BicepCurl => "bicep_curl",
            ExerciseKind::LateralRaise => "lateral_raise",
            ExerciseKind::General => "general",
        }
    }

    /// Strict lookup: case-insensitive, `-` and spaces read as `_`, common aliases.
    pub fn from_id(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        let kind = match normalized.as_str() {
            "squat" | "squats" => ExerciseKind::Squat,
            "push_up" | "pushup" | "push_ups" | "pushups" => ExerciseKind::PushUp,
            "deadlift" | "dead_lift" => ExerciseKind::Deadlift,
            "lunge" | "lunges" => ExerciseKind::Lunge,
            "shoulder_press" | "overhead_press" => ExerciseKind::ShoulderPress,
            "bicep_curl" | "biceps_curl" | "curl" | "curls" => ExerciseKind::BicepCurl,
            "lateral_raise" | "side_raise" | "arm_raise" => ExerciseKind::LateralRaise,
            "general" | "generic" => ExerciseKind::General,
            _ => return None,
        };
        Some(kind)
    }

    /// Lenient lookup: unknown identifiers fall back to `General`
    pub fn parse_or_general(raw: &str) -> Self {
        Self::from_id(raw).unwrap_or_else(|| {
            tracing::warn!(exercise = raw, "unknown exercise, using general profile");
            ExerciseKind::General
        })
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for kind in ExerciseKind::ALL {
            assert_eq!(ExerciseKind::from_id(kind.id()), Some(kind));
        }
    }

    #[test]
    fn test_loose_spellings() {
        assert_eq!(ExerciseKind::from_id("Push-Up"), Some(ExerciseKind::PushUp));
        assert_eq!(ExerciseKind::from_id(" bicep curl "), Some(ExerciseKind::BicepCurl));
        assert_eq!(ExerciseKind::from_id("curl"), Some(ExerciseKind::BicepCurl));
    }

    #[test]
    fn test_unknown_falls_back_to_general() {
        assert_eq!(ExerciseKind::from_id("zumba"), None);
        assert_eq!(ExerciseKind::parse_or_general("zumba"), ExerciseKind::General);
    }
}
