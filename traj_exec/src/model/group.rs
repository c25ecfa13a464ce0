//! Joint model groups

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing a named group of joints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupParams {
    pub name: String,

    /// Names of the joints in the group, in the order they should be reported.
    pub joints: Vec<String>,
}

/// A named subset of the joints of a robot model, such as an arm or a gripper.
#[derive(Debug, Clone, PartialEq)]
pub struct JointModelGroup {
    name: String,
    joint_names: Vec<String>,
    joint_indices: Vec<usize>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl JointModelGroup {
    pub(crate) fn new(name: String, joint_names: Vec<String>, joint_indices: Vec<usize>) -> Self {
        Self {
            name,
            joint_names,
            joint_indices,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the active joints of this group.
    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    /// Variable indices of the active joints of this group.
    pub fn joint_indices(&self) -> &[usize] {
        &self.joint_indices
    }

    pub fn contains_joint(&self, name: &str) -> bool {
        self.joint_names.iter().any(|n| n == name)
    }
}
