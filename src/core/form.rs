//! Form Scorer: coarse symmetry and posture heuristics on raw landmarks
//!
//! Starts at 100 and subtracts fixed penalties; the result is clamped to
//! [60, 100]. Runs on every frame with a person, calibrated or not.

use crate::types::{BodyPart, FormIssue, PoseFrame};
use crate::{
    EngineConfig, FORM_SCORE_FLOOR, FORM_SCORE_MAX, HIP_TILT_PENALTY, SHOULDER_TILT_PENALTY,
    SLOUCH_PENALTY,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FormAssessment {
    pub score: u8,
    pub issues: Vec<FormIssue>,
}

#[derive(Debug, Clone)]
pub struct FormScorer {
    level_tolerance: f64,
    min_torso_height: f64,
    min_visibility: f64,
}

impl Default for FormScorer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl FormScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            level_tolerance: config.level_tolerance,
            min_torso_height: config.min_torso_height,
            min_visibility: config.min_landmark_visibility,
        }
    }

    /// Score one frame. `upright` enables the slouch check.
    /// Checks whose landmarks are occluded are skipped, not penalized.
    pub fn assess(&self, frame: &PoseFrame, upright: bool) -> FormAssessment {
        let mut issues = Vec::new();
        let mut penalty: u8 = 0;

        if let Some(tilt) = self.height_difference(frame, BodyPart::LeftShoulder, BodyPart::RightShoulder) {
            if tilt > self.level_tolerance {
                issues.push(FormIssue::ShoulderTilt);
                penalty += SHOULDER_TILT_PENALTY;
            }
        }

        if let Some(tilt) = self.height_difference(frame, BodyPart::LeftHip, BodyPart::RightHip) {
            if tilt > self.level_tolerance {
                issues.push(FormIssue::HipTilt);
                penalty += HIP_TILT_PENALTY;
            }
        }

        if upright {
            if let Some(torso) = self.torso_height(frame) {
                if torso < self.min_torso_height {
                    issues.push(FormIssue::Slouch);
                    penalty += SLOUCH_PENALTY;
                }
            }
        }

        FormAssessment {
            score: FORM_SCORE_MAX.saturating_sub(penalty).clamp(FORM_SCORE_FLOOR, FORM_SCORE_MAX),
            issues,
        }
    }

    fn height_difference(&self, frame: &PoseFrame, left: BodyPart, right: BodyPart) -> Option<f64> {
        let l = frame.visible(left, self.min_visibility)?;
        let r = frame.visible(right, self.min_visibility)?;
        Some((l.y - r.y).abs())
    }

    /// Hip height minus shoulder height (image y grows downward)
    fn torso_height(&self, frame: &PoseFrame) -> Option<f64> {
        let shoulders = self.mean_y(frame, BodyPart::LeftShoulder, BodyPart::RightShoulder)?;
        let hips = self.mean_y(frame, BodyPart::LeftHip, BodyPart::RightHip)?;
        Some(hips - shoulders)
    }

    fn mean_y(&self, frame: &PoseFrame, left: BodyPart, right: BodyPart) -> Option<f64> {
        match (frame.visible(left, self.min_visibility), frame.visible(right, self.min_visibility)) {
            (Some(l), Some(r)) => Some((l.y + r.y) / 2.0),
            (Some(one), None) | (None, Some(one)) => Some(one.y),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Landmark;

    fn pose(shoulder_y: (f64, f64), hip_y: (f64, f64)) -> PoseFrame {
        let mut landmarks = vec![Landmark::new(0.5, 0.5, 1.0); crate::LANDMARK_COUNT];
        landmarks[BodyPart::LeftShoulder.index()] = Landmark::new(0.45, shoulder_y.0, 1.0);
        landmarks[BodyPart::RightShoulder.index()] = Landmark::new(0.55, shoulder_y.1, 1.0);
        landmarks[BodyPart::LeftHip.index()] = Landmark::new(0.46, hip_y.0, 1.0);
        landmarks[BodyPart::RightHip.index()] = Landmark::new(0.54, hip_y.1, 1.0);
        PoseFrame::new(0, landmarks)
    }

    #[test]
    fn test_symmetric_upright_is_perfect() {
        let result = FormScorer::default().assess(&pose((0.3, 0.3), (0.55, 0.55)), true);
        assert_eq!(result.score, 100);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_shoulder_tilt_penalty() {
        let result = FormScorer::default().assess(&pose((0.3, 0.4), (0.6, 0.6)), true);
        assert_eq!(result.score, 90);
        assert_eq!(result.issues, vec![FormIssue::ShoulderTilt]);
    }

    #[test]
    fn test_slouch_only_when_upright() {
        let collapsed = pose((0.5, 0.5), (0.55, 0.55));
        assert_eq!(FormScorer::default().assess(&collapsed, true).score, 85);
        assert_eq!(FormScorer::default().assess(&collapsed, false).score, 100);
    }

    #[test]
    fn test_floor_at_sixty() {
        // All three penalties: 100 - 35 = 65, still above the floor
        let result = FormScorer::default().assess(&pose((0.5, 0.58), (0.56, 0.64)), true);
        assert_eq!(result.issues.len(), 3);
        assert_eq!(result.score, 65);
        assert!(result.score >= crate::FORM_SCORE_FLOOR);
    }

    #[test]
    fn test_occluded_checks_are_skipped() {
        let mut frame = pose((0.3, 0.5), (0.6, 0.6));
        frame.landmarks[BodyPart::RightShoulder.index()].visibility = 0.0;
        let result = FormScorer::default().assess(&frame, true);
        assert_eq!(result.score, 100);
    }
}
