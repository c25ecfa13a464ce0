//! # Robot State Messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Header;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The state of a set of named joints.
///
/// `position`, `velocity` and `effort` are either empty or the same length as `name`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct JointState {
    #[serde(default)]
    pub header: Header,

    pub name: Vec<String>,

    /// Units: radians or meters depending on the joint type
    #[serde(default)]
    pub position: Vec<f64>,

    /// Units: radians/second or meters/second
    #[serde(default)]
    pub velocity: Vec<f64>,

    #[serde(default)]
    pub effort: Vec<f64>,
}

/// A (possibly partial) robot state.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RobotStateMsg {
    pub joint_state: JointState,
}
