//! Pose landmarks as delivered by the pose-estimation model

use serde::{Deserialize, Serialize};

/// One 2D body point in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Model confidence that the point is visible (0.0-1.0)
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    pub fn point(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Named landmark indices (MediaPipe Pose ordering).
/// Only the points the engine reads are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftFootIndex,
    RightFootIndex,
}

impl BodyPart {
    /// Index into the landmark array
    pub fn index(&self) -> usize {
        match self {
            BodyPart::Nose => 0,
            BodyPart::LeftShoulder => 11,
            BodyPart::RightShoulder => 12,
            BodyPart::LeftElbow => 13,
            BodyPart::RightElbow => 14,
            BodyPart::LeftWrist => 15,
            BodyPart::RightWrist => 16,
            BodyPart::LeftHip => 23,
            BodyPart::RightHip => 24,
            BodyPart::LeftKnee => 25,
            BodyPart::RightKnee => 26,
            BodyPart::LeftAnkle => 27,
            BodyPart::RightAnkle => 28,
            BodyPart::LeftFootIndex => 31,
            BodyPart::RightFootIndex => 32,
        }
    }
}

/// Everything the pose model produced for one video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Capture time of the frame, monotonic within a session (milliseconds)
    pub timestamp_ms: u64,
    /// Empty when no person was detected
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl PoseFrame {
    pub fn new(timestamp_ms: u64, landmarks: Vec<Landmark>) -> Self {
        Self { timestamp_ms, landmarks }
    }

    /// Frame with no person in it
    pub fn empty(timestamp_ms: u64) -> Self {
        Self { timestamp_ms, landmarks: Vec::new() }
    }

    pub fn has_person(&self) -> bool {
        !self.landmarks.is_empty()
    }

    /// Parse one JSON-lines record (replay files)
    pub fn from_json_line(line: &str) -> crate::Result<Self> {
        let frame: PoseFrame = serde_json::from_str(line)?;
        frame.validate()?;
        Ok(frame)
    }

    /// At most 33 landmarks, every visibility within [0, 1]
    pub fn validate(&self) -> crate::Result<()> {
        if self.landmarks.len() > crate::LANDMARK_COUNT {
            return Err(crate::Error::InvalidFrame(format!(
                "{} landmarks, expected at most {}",
                self.landmarks.len(),
                crate::LANDMARK_COUNT
            )));
        }
        if let Some(index) = self
            .landmarks
            .iter()
            .position(|lm| !(0.0..=1.0).contains(&lm.visibility))
        {
            return Err(crate::Error::InvalidFrame(format!(
                "landmark {} visibility outside [0, 1]",
                index
            )));
        }
        Ok(())
    }

    /// Landmark for a body part, if present and at least `min_visibility` confident
    pub fn visible(&self, part: BodyPart, min_visibility: f64) -> Option<&Landmark> {
        self.landmarks
            .get(part.index())
            .filter(|lm| lm.visibility >= min_visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_filters_low_confidence() {
        let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.9); crate::LANDMARK_COUNT];
        landmarks[BodyPart::LeftKnee.index()].visibility = 0.2;
        let frame = PoseFrame::new(0, landmarks);

        assert!(frame.visible(BodyPart::RightKnee, 0.5).is_some());
        assert!(frame.visible(BodyPart::LeftKnee, 0.5).is_none());
    }

    #[test]
    fn test_short_landmark_list_is_missing_not_panic() {
        let frame = PoseFrame::new(0, vec![Landmark::new(0.5, 0.5, 1.0); 5]);
        assert!(frame.has_person());
        assert!(frame.visible(BodyPart::RightFootIndex, 0.5).is_none());
    }

    #[test]
    fn test_json_line_validation() {
        let frame = PoseFrame::from_json_line(r#"{"timestamp_ms": 40, "landmarks": []}"#).unwrap();
        assert!(!frame.has_person());

        let bad = PoseFrame::from_json_line(r#"{"timestamp_ms": 40, "landmarks": [{"x": 0.1, "y": 0.2, "visibility": 3.0}]}"#);
        assert!(matches!(bad, Err(crate::Error::InvalidFrame(_))));
        assert!(matches!(PoseFrame::from_json_line("not json"), Err(crate::Error::Json(_))));
    }

    #[test]
    fn test_too_many_landmarks_is_invalid() {
        let frame = PoseFrame::new(0, vec![Landmark::new(0.5, 0.5, 1.0); crate::LANDMARK_COUNT + 1]);
        assert!(matches!(frame.validate(), Err(crate::Error::InvalidFrame(_))));
        let frame = PoseFrame::new(0, vec![Landmark::new(0.5, 0.5, 1.0); crate::LANDMARK_COUNT]);
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn test_visibility_defaults_when_absent() {
        let lm: Landmark = serde_json::from_str(r#"{"x": 0.1, "y": 0.2}"#).unwrap();
        assert_eq!(lm.visibility, 1.0);
    }
}
