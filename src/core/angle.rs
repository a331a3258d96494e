//! Angle Calculator: included angle at a joint from three landmarks
//!
//! angle = |atan2(c - b) - atan2(a - b)|, folded into [0, 180]

use crate::types::{Joint, JointAngleSet, PoseFrame};

/// Points closer than this are treated as coincident
const COINCIDENT_EPSILON: f64 = 1e-9;

/// Angle at `vertex` between rays to `a` and `c`, in degrees within [0, 180].
///
/// Any two coincident points return 0.0.
pub fn calculate_angle(a: (f64, f64), vertex: (f64, f64), c: (f64, f64)) -> f64 {
    if coincident(a, vertex) || coincident(c, vertex) || coincident(a, c) {
        return 0.0;
    }

    let radians = (c.1 - vertex.1).atan2(c.0 - vertex.0) - (a.1 - vertex.1).atan2(a.0 - vertex.0);
    let mut angle = radians.to_degrees().abs();

    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    angle
}

fn coincident(p: (f64, f64), q: (f64, f64)) -> bool {
    (p.0 - q.0).abs() < COINCIDENT_EPSILON && (p.1 - q.1).abs() < COINCIDENT_EPSILON
}

/// Angle for one joint, if all three of its landmarks are visible enough
pub fn joint_angle(frame: &PoseFrame, joint: Joint, min_visibility: f64) -> Option<f64> {
    let (a, vertex, c) = joint.landmarks();
    let a = frame.visible(a, min_visibility)?;
    let vertex = frame.visible(vertex, min_visibility)?;
    let c = frame.visible(c, min_visibility)?;
    Some(calculate_angle(a.point(), vertex.point(), c.point()))
}

/// Every tracked joint angle computable from this frame
pub fn compute_joint_angles(frame: &PoseFrame, min_visibility: f64) -> JointAngleSet {
    let mut angles = JointAngleSet::new();
    for joint in Joint::ALL {
        if let Some(angle) = joint_angle(frame, joint, min_visibility) {
            angles.insert(joint, angle);
        }
    }
    angles
}
