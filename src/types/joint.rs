//! Tracked joints and the per-frame angle set

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::BodyPart;

/// A joint whose included angle is tracked every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    LeftElbow,
    RightElbow,
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Joint {
    pub const ALL: [Joint; 10] = [
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    /// (outer, vertex, outer) landmarks; the angle is measured at the vertex
    pub fn landmarks(&self) -> (BodyPart, BodyPart, BodyPart) {
        use BodyPart::*;
        match self {
            Joint::LeftElbow => (LeftShoulder, LeftElbow, LeftWrist),
            Joint::RightElbow => (RightShoulder, RightElbow, RightWrist),
            Joint::LeftShoulder => (LeftHip, LeftShoulder, LeftElbow),
            Joint::RightShoulder => (RightHip, RightShoulder, RightElbow),
            Joint::LeftHip => (LeftShoulder, LeftHip, LeftKnee),
            Joint::RightHip => (RightShoulder, RightHip, RightKnee),
            Joint::LeftKnee => (LeftHip, LeftKnee, LeftAnkle),
            Joint::RightKnee => (RightHip, RightKnee, RightAnkle),
            Joint::LeftAnkle => (LeftKnee, LeftAnkle, LeftFootIndex),
            Joint::RightAnkle => (RightKnee, RightAnkle, RightFootIndex),
        }
    }
}

impl std::fmt::Display for Joint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Joint::LeftElbow => "left_elbow",
            Joint::RightElbow => "right_elbow",
            Joint::LeftShoulder => "left_shoulder",
            Joint::RightShoulder => "right_shoulder",
            Joint::LeftHip => "left_hip",
            Joint::RightHip => "right_hip",
            Joint::LeftKnee => "left_knee",
            Joint::RightKnee => "right_knee",
            Joint::LeftAnkle => "left_ankle",
            Joint::RightAnkle => "right_ankle",
        };
        write!(f, "{}", name)
    }
}

/// Joint angles (degrees) computable from one frame.
/// Joints whose landmarks are occluded are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointAngleSet {
    angles: BTreeMap<Joint, f64>,
}

impl JointAngleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, joint: Joint, degrees: f64) {
        self.angles.insert(joint, degrees);
    }

    pub fn get(&self, joint: Joint) -> Option<f64> {
        self.angles.get(&joint).copied()
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Joint, f64)> + '_ {
        self.angles.iter().map(|(j, a)| (*j, *a))
    }

    /// |left - right| when both are present
    pub fn difference(&self, left: Joint, right: Joint) -> Option<f64> {
        Some((self.get(left)? - self.get(right)?).abs())
    }
}
