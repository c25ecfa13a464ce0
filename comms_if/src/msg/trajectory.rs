//! # Trajectory Messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Header;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single point of a [`JointTrajectory`].
///
/// Every non-empty vector holds one value per entry of the owning trajectory's `joint_names`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct JointTrajectoryPoint {
    pub positions: Vec<f64>,

    #[serde(default)]
    pub velocities: Vec<f64>,

    #[serde(default)]
    pub accelerations: Vec<f64>,

    #[serde(default)]
    pub effort: Vec<f64>,

    /// Time at which this point should be reached, measured from `header.stamp_s`.
    ///
    /// Units: seconds
    pub time_from_start_s: f64,
}

/// A trajectory over a set of named joints.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct JointTrajectory {
    #[serde(default)]
    pub header: Header,

    pub joint_names: Vec<String>,

    pub points: Vec<JointTrajectoryPoint>,
}

/// Trajectory message as produced by a planner.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RobotTrajectoryMsg {
    pub joint_trajectory: JointTrajectory,
}
