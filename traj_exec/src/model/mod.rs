//! # Robot model
//!
//! The kinematic description of the robot: which joints exist, how they are
//! chained together, their limits and the named groups of joints used to scope
//! trajectories.
//!
//! Models are loaded from a TOML parameter file and then shared immutably
//! (`Arc<RobotModel>`) between every state and trajectory built for them.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod group;
mod joint;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Internal
pub use group::*;
pub use joint::*;
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for a robot model, the contents of a model parameter file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotModelParams {
    /// Name of the robot
    pub name: String,

    /// Name of the frame the robot is attached to
    #[serde(default = "default_root_frame")]
    pub root_frame: String,

    /// The joints of the robot. Parents must come before their children.
    pub joints: Vec<JointParams>,

    /// Named groups of joints
    #[serde(default)]
    pub groups: Vec<GroupParams>,
}

/// A validated kinematic model of the robot.
#[derive(Debug, Clone)]
pub struct RobotModel {
    name: String,
    root_frame: String,
    joints: Vec<JointModel>,
    joint_index_map: HashMap<String, usize>,
    groups: Vec<JointModelGroup>,
    default_positions: Vec<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while building a robot model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("The model has no joints")]
    NoJoints,

    #[error("Joint {0} is defined more than once")]
    DuplicateJoint(String),

    #[error("Joint {joint} has parent {parent} which is not defined before it")]
    UnknownParent { joint: String, parent: String },

    #[error("Joint {0} has a zero length axis")]
    ZeroAxis(String),

    #[error("Joint {0} has a lower limit greater than its upper limit")]
    InvalidBounds(String),

    #[error("Joint {0} has only one of its limits set")]
    PartialBounds(String),

    #[error("The default position of joint {0} is outside its limits")]
    DefaultOutOfBounds(String),

    #[error("Group {0} is defined more than once")]
    DuplicateGroup(String),

    #[error("Group {group} contains unknown joint {joint}")]
    UnknownGroupJoint { group: String, joint: String },

    #[error("Group {group} contains joint {joint} more than once")]
    DuplicateGroupJoint { group: String, joint: String },

    #[error("Could not load the model parameters: {0}")]
    LoadError(#[from] params::LoadError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotModel {
    /// Load a model from a parameter file relative to the params directory.
    pub fn load(param_file_path: &str) -> Result<Self, ModelError> {
        let p: RobotModelParams = params::load(param_file_path)?;
        Self::from_params(p)
    }

    /// Load a model from a parameter file at an arbitrary path.
    pub fn load_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ModelError> {
        let p: RobotModelParams = params::load_path(path)?;
        Self::from_params(p)
    }

    /// Validate the parameters and build the model.
    pub fn from_params(params: RobotModelParams) -> Result<Self, ModelError> {
        if params.joints.is_empty() {
            return Err(ModelError::NoJoints);
        }

        let mut joints = Vec::with_capacity(params.joints.len());
        let mut joint_index_map = HashMap::new();
        let mut default_positions = Vec::with_capacity(params.joints.len());

        for (index, jp) in params.joints.iter().enumerate() {
            if joint_index_map.contains_key(&jp.name) {
                return Err(ModelError::DuplicateJoint(jp.name.clone()));
            }

            // Parents must already be in the map, which also rules out cycles
            let parent_index = match &jp.parent {
                Some(parent) => match joint_index_map.get(parent) {
                    Some(i) => Some(*i),
                    None => {
                        return Err(ModelError::UnknownParent {
                            joint: jp.name.clone(),
                            parent: parent.clone(),
                        })
                    }
                },
                None => None,
            };

            let axis = Vector3::new(jp.axis[0], jp.axis[1], jp.axis[2]);
            if axis.norm() <= std::f64::EPSILON {
                return Err(ModelError::ZeroAxis(jp.name.clone()));
            }

            if jp.joint_type != JointType::Continuous {
                match (jp.min_pos, jp.max_pos) {
                    (Some(min), Some(max)) if min > max => {
                        return Err(ModelError::InvalidBounds(jp.name.clone()))
                    }
                    (Some(_), None) | (None, Some(_)) => {
                        return Err(ModelError::PartialBounds(jp.name.clone()))
                    }
                    _ => (),
                }
            }

            let joint = JointModel::new(jp, index, parent_index, Unit::new_normalize(axis));

            if !joint.satisfies_bounds(jp.default_pos) {
                return Err(ModelError::DefaultOutOfBounds(jp.name.clone()));
            }

            default_positions.push(jp.default_pos);
            joint_index_map.insert(jp.name.clone(), index);
            joints.push(joint);
        }

        let mut groups: Vec<JointModelGroup> = Vec::with_capacity(params.groups.len());

        for gp in params.groups {
            if groups.iter().any(|g| g.name() == gp.name) {
                return Err(ModelError::DuplicateGroup(gp.name));
            }

            let mut indices = Vec::with_capacity(gp.joints.len());
            for joint in gp.joints.iter() {
                match joint_index_map.get(joint) {
                    Some(i) if indices.contains(i) => {
                        return Err(ModelError::DuplicateGroupJoint {
                            group: gp.name.clone(),
                            joint: joint.clone(),
                        })
                    }
                    Some(i) => indices.push(*i),
                    None => {
                        return Err(ModelError::UnknownGroupJoint {
                            group: gp.name.clone(),
                            joint: joint.clone(),
                        })
                    }
                }
            }

            groups.push(JointModelGroup::new(gp.name, gp.joints, indices));
        }

        debug!(
            "Built model {} with {} joints and {} groups",
            params.name,
            joints.len(),
            groups.len()
        );

        Ok(Self {
            name: params.name,
            root_frame: params.root_frame,
            joints,
            joint_index_map,
            groups,
            default_positions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_frame(&self) -> &str {
        &self.root_frame
    }

    /// All joints of the model in variable order.
    pub fn joint_models(&self) -> &[JointModel] {
        &self.joints
    }

    pub fn joint_model(&self, name: &str) -> Option<&JointModel> {
        self.joint_index(name).map(|i| &self.joints[i])
    }

    /// Index of the named joint's variable, or `None` if the joint doesn't exist.
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joint_index_map.get(name).copied()
    }

    pub fn variable_count(&self) -> usize {
        self.joints.len()
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.joints.iter().map(|j| j.name()).collect()
    }

    pub fn default_positions(&self) -> &[f64] {
        &self.default_positions
    }

    pub fn joint_model_groups(&self) -> &[JointModelGroup] {
        &self.groups
    }

    pub fn joint_model_group(&self, name: &str) -> Option<&JointModelGroup> {
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn has_joint_model_group(&self, name: &str) -> bool {
        self.joint_model_group(name).is_some()
    }

    /// Variable indices of the active joints: those of `group`, or every joint if no group is
    /// given.
    pub fn active_joint_indices(&self, group: Option<&JointModelGroup>) -> Vec<usize> {
        match group {
            Some(g) => g.joint_indices().to_vec(),
            None => (0..self.joints.len()).collect(),
        }
    }

    /// Active joints whose position wraps.
    pub fn continuous_joint_models(&self, group: Option<&JointModelGroup>) -> Vec<&JointModel> {
        self.active_joint_indices(group)
            .into_iter()
            .map(|i| &self.joints[i])
            .filter(|j| j.is_continuous())
            .collect()
    }
}

fn default_root_frame() -> String {
    String::from("world")
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// A four joint arm: continuous base, two revolute links and a prismatic gripper.
    pub(crate) const ARM_TOML: &str = r#"
name = "test_arm"
root_frame = "base_link"

[[joints]]
name = "base"
joint_type = "continuous"
origin_m = [0.0, 0.0, 0.1]

[[joints]]
name = "shoulder"
joint_type = "revolute"
parent = "base"
min_pos = -2.0
max_pos = 2.0
axis = [0.0, 1.0, 0.0]
origin_m = [0.0, 0.0, 0.2]

[[joints]]
name = "elbow"
joint_type = "revolute"
parent = "shoulder"
min_pos = -2.5
max_pos = 2.5
axis = [0.0, 1.0, 0.0]
origin_m = [0.3, 0.0, 0.0]

[[joints]]
name = "gripper"
joint_type = "prismatic"
parent = "elbow"
min_pos = 0.0
max_pos = 0.05
axis = [1.0, 0.0, 0.0]
origin_m = [0.25, 0.0, 0.0]

[[groups]]
name = "arm"
joints = ["base", "shoulder", "elbow"]

[[groups]]
name = "hand"
joints = ["gripper"]
"#;

    pub(crate) fn arm_params() -> RobotModelParams {
        params::from_str(ARM_TOML).unwrap()
    }

    pub(crate) fn arm_model() -> RobotModel {
        RobotModel::from_params(arm_params()).unwrap()
    }

    #[test]
    fn test_from_params() {
        let model = arm_model();

        assert_eq!(model.name(), "test_arm");
        assert_eq!(model.root_frame(), "base_link");
        assert_eq!(model.variable_count(), 4);
        assert_eq!(model.joint_index("elbow"), Some(2));
        assert_eq!(model.joint_model("elbow").unwrap().parent_index(), Some(1));
        assert_eq!(
            model.variable_names(),
            vec!["base", "shoulder", "elbow", "gripper"]
        );

        let arm = model.joint_model_group("arm").unwrap();
        assert_eq!(arm.joint_indices(), &[0, 1, 2]);
        assert!(arm.contains_joint("shoulder"));
        assert!(!arm.contains_joint("gripper"));
        assert!(!model.has_joint_model_group("leg"));
    }

    #[test]
    fn test_continuous_joints() {
        let model = arm_model();

        let all: Vec<&str> = model
            .continuous_joint_models(None)
            .iter()
            .map(|j| j.name())
            .collect();
        assert_eq!(all, vec!["base"]);

        let hand = model.joint_model_group("hand");
        assert!(model.continuous_joint_models(hand).is_empty());
    }

    #[test]
    fn test_invalid_models() {
        let mut p = arm_params();
        p.joints[2].parent = Some("gripper".into());
        assert!(matches!(
            RobotModel::from_params(p),
            Err(ModelError::UnknownParent { .. })
        ));

        let mut p = arm_params();
        p.joints[1].name = "base".into();
        assert!(matches!(
            RobotModel::from_params(p),
            Err(ModelError::DuplicateJoint(_))
        ));

        let mut p = arm_params();
        p.joints[1].min_pos = Some(3.0);
        assert!(matches!(
            RobotModel::from_params(p),
            Err(ModelError::InvalidBounds(_))
        ));

        let mut p = arm_params();
        p.joints[3].default_pos = 1.0;
        assert!(matches!(
            RobotModel::from_params(p),
            Err(ModelError::DefaultOutOfBounds(_))
        ));

        let mut p = arm_params();
        p.groups[0].joints.push("wrist".into());
        assert!(matches!(
            RobotModel::from_params(p),
            Err(ModelError::UnknownGroupJoint { .. })
        ));

        let mut p = arm_params();
        p.groups[1].joints.push("gripper".into());
        assert!(matches!(
            RobotModel::from_params(p),
            Err(ModelError::DuplicateGroupJoint { .. })
        ));

        let mut p = arm_params();
        p.joints[0].axis = [0.0; 3];
        assert!(matches!(
            RobotModel::from_params(p),
            Err(ModelError::ZeroAxis(_))
        ));

        let mut p = arm_params();
        p.joints.clear();
        assert!(matches!(
            RobotModel::from_params(p),
            Err(ModelError::NoJoints)
        ));
    }
}
