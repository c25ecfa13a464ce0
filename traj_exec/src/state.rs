//! # Robot state
//!
//! A full pose of the robot: one position per joint of the model, optionally
//! with velocities and accelerations, plus a cache of the joint frame
//! transforms computed by forward kinematics.
//!
//! Setting any position marks the state dirty; [`RobotState::update`] must be
//! called before the transforms are read again. Trajectories do this for every
//! state they store.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Isometry3;
use std::fmt;
use std::sync::Arc;

// Internal
use crate::model::{JointModelGroup, RobotModel};
use comms_if::msg::{JointState, RobotStateMsg};
use util::maths::lerp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pose of every joint in a [`RobotModel`].
#[derive(Clone)]
pub struct RobotState {
    model: Arc<RobotModel>,

    /// Units: radians or meters
    positions: Vec<f64>,

    /// Units: radians/second or meters/second
    velocities: Option<Vec<f64>>,

    /// Units: radians/second^2 or meters/second^2
    accelerations: Option<Vec<f64>>,

    /// Transform from the root frame to each joint's child frame
    joint_transforms: Vec<Isometry3<f64>>,

    dirty: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur when setting state values.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StateError {
    #[error("Joint {0} is not part of the robot model")]
    UnknownJoint(String),

    #[error("Expected {expected} values but found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotState {
    /// Create a new state with every joint at its default position and no velocities or
    /// accelerations.
    pub fn new(model: Arc<RobotModel>) -> Self {
        let positions = model.default_positions().to_vec();
        let n = positions.len();

        let mut state = Self {
            model,
            positions,
            velocities: None,
            accelerations: None,
            joint_transforms: vec![Isometry3::identity(); n],
            dirty: true,
        };
        state.update();

        state
    }

    pub fn robot_model(&self) -> &Arc<RobotModel> {
        &self.model
    }

    pub fn variable_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn velocities(&self) -> Option<&[f64]> {
        self.velocities.as_deref()
    }

    pub fn accelerations(&self) -> Option<&[f64]> {
        self.accelerations.as_deref()
    }

    pub fn has_velocities(&self) -> bool {
        self.velocities.is_some()
    }

    pub fn has_accelerations(&self) -> bool {
        self.accelerations.is_some()
    }

    /// Returns true if positions changed since the last [`RobotState::update`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn variable_position(&self, index: usize) -> f64 {
        self.positions[index]
    }

    /// Position of the named joint, or `None` if the model has no such joint.
    pub fn joint_position(&self, name: &str) -> Option<f64> {
        self.model.joint_index(name).map(|i| self.positions[i])
    }

    pub fn set_variable_position(&mut self, index: usize, value: f64) {
        self.positions[index] = value;
        self.dirty = true;
    }

    pub fn set_joint_position(&mut self, name: &str, value: f64) -> Result<(), StateError> {
        let index = self.index_of(name)?;
        self.set_variable_position(index, value);
        Ok(())
    }

    /// Set all positions at once.
    pub fn set_variable_positions(&mut self, values: &[f64]) -> Result<(), StateError> {
        self.check_len(values.len())?;
        self.positions.copy_from_slice(values);
        self.dirty = true;
        Ok(())
    }

    /// Set the positions of the named joints, leaving the others untouched.
    ///
    /// Nothing is changed if any name is unknown or the lengths differ.
    pub fn set_variable_positions_by_name(
        &mut self,
        names: &[String],
        values: &[f64],
    ) -> Result<(), StateError> {
        let indices = self.indices_of(names, values.len())?;
        for (i, v) in indices.into_iter().zip(values.iter()) {
            self.positions[i] = *v;
        }
        self.dirty = true;
        Ok(())
    }

    /// Set the velocities of the named joints.
    ///
    /// If the state had no velocities the other joints get zero velocity.
    pub fn set_variable_velocities_by_name(
        &mut self,
        names: &[String],
        values: &[f64],
    ) -> Result<(), StateError> {
        let indices = self.indices_of(names, values.len())?;
        let n = self.positions.len();
        let vels = self.velocities.get_or_insert_with(|| vec![0.0; n]);
        for (i, v) in indices.into_iter().zip(values.iter()) {
            vels[i] = *v;
        }
        Ok(())
    }

    /// Set the accelerations of the named joints.
    ///
    /// If the state had no accelerations the other joints get zero acceleration.
    pub fn set_variable_accelerations_by_name(
        &mut self,
        names: &[String],
        values: &[f64],
    ) -> Result<(), StateError> {
        let indices = self.indices_of(names, values.len())?;
        let n = self.positions.len();
        let accs = self.accelerations.get_or_insert_with(|| vec![0.0; n]);
        for (i, v) in indices.into_iter().zip(values.iter()) {
            accs[i] = *v;
        }
        Ok(())
    }

    pub fn set_variable_velocities(&mut self, values: &[f64]) -> Result<(), StateError> {
        self.check_len(values.len())?;
        self.velocities = Some(values.to_vec());
        Ok(())
    }

    pub fn set_variable_accelerations(&mut self, values: &[f64]) -> Result<(), StateError> {
        self.check_len(values.len())?;
        self.accelerations = Some(values.to_vec());
        Ok(())
    }

    /// Drop velocities and accelerations.
    pub fn clear_derivatives(&mut self) {
        self.velocities = None;
        self.accelerations = None;
    }

    /// Negate every velocity, used when a trajectory is played backwards.
    pub fn invert_velocities(&mut self) {
        if let Some(vels) = self.velocities.as_mut() {
            for v in vels.iter_mut() {
                *v = -*v;
            }
        }
    }

    /// Overlay this state with the joints present in a state message.
    pub fn set_from_msg(&mut self, msg: &RobotStateMsg) -> Result<(), StateError> {
        let js: &JointState = &msg.joint_state;

        // Validate every field first so a bad message changes nothing
        if !js.position.is_empty() {
            self.indices_of(&js.name, js.position.len())?;
        }
        if !js.velocity.is_empty() {
            self.indices_of(&js.name, js.velocity.len())?;
        }

        if !js.position.is_empty() {
            self.set_variable_positions_by_name(&js.name, &js.position)?;
        }
        if !js.velocity.is_empty() {
            self.set_variable_velocities_by_name(&js.name, &js.velocity)?;
        }

        Ok(())
    }

    /// Build a state message holding every joint of the model.
    pub fn to_msg(&self) -> RobotStateMsg {
        let mut msg = RobotStateMsg::default();
        let js = &mut msg.joint_state;

        js.header.frame_id = self.model.root_frame().to_string();
        js.name = self
            .model
            .variable_names()
            .into_iter()
            .map(String::from)
            .collect();
        js.position = self.positions.clone();
        js.velocity = self.velocities.clone().unwrap_or_default();

        msg
    }

    /// Clamp bounded joints into their limits and wrap continuous joints into [-pi, pi).
    pub fn enforce_bounds(&mut self) {
        for joint in self.model.joint_models() {
            let i = joint.index();
            self.positions[i] = joint.enforce_bounds(self.positions[i]);
        }
        self.dirty = true;
    }

    /// Returns true if every joint is within its limits.
    pub fn satisfies_bounds(&self) -> bool {
        self.model
            .joint_models()
            .iter()
            .all(|j| j.satisfies_bounds(self.positions[j.index()]))
    }

    /// Refresh the forward kinematics cache if any position changed.
    pub fn update(&mut self) {
        if !self.dirty {
            return;
        }

        for joint in self.model.joint_models() {
            let local = joint.transform(self.positions[joint.index()]);
            self.joint_transforms[joint.index()] = match joint.parent_index() {
                // Parents always come before their children in the model
                Some(p) => self.joint_transforms[p] * local,
                None => local,
            };
        }

        self.dirty = false;
        trace!("Updated joint transforms of {}", self.model.name());
    }

    /// Transform from the root frame to the named joint's child frame.
    ///
    /// The state must be up to date, see [`RobotState::update`].
    pub fn global_joint_transform(&self, name: &str) -> Option<&Isometry3<f64>> {
        debug_assert!(!self.dirty, "Reading transforms of a dirty state");
        self.model
            .joint_index(name)
            .map(|i| &self.joint_transforms[i])
    }

    /// Interpolate every joint between this state and `to`.
    ///
    /// Velocities and accelerations are interpolated linearly when both states carry them. The
    /// returned state is up to date.
    pub fn interpolate(&self, to: &RobotState, fraction: f64) -> RobotState {
        debug_assert_eq!(self.positions.len(), to.positions.len());

        let positions = self
            .model
            .joint_models()
            .iter()
            .map(|j| {
                let i = j.index();
                j.interpolate(self.positions[i], to.positions[i], fraction)
            })
            .collect();

        let mut state = RobotState {
            model: self.model.clone(),
            positions,
            velocities: lerp_opt(&self.velocities, &to.velocities, fraction),
            accelerations: lerp_opt(&self.accelerations, &to.accelerations, fraction),
            joint_transforms: self.joint_transforms.clone(),
            dirty: true,
        };
        state.update();

        state
    }

    /// Sum of the per joint distances between this state and `other` (L1 norm), over the joints
    /// of `group`, or every joint if `group` is `None`.
    pub fn distance(&self, other: &RobotState, group: Option<&JointModelGroup>) -> f64 {
        self.model
            .active_joint_indices(group)
            .into_iter()
            .map(|i| {
                self.model.joint_models()[i].distance(self.positions[i], other.positions[i])
            })
            .sum()
    }

    /// Signed per joint difference `other - self` over the active joints.
    pub fn difference(&self, other: &RobotState, group: Option<&JointModelGroup>) -> Vec<f64> {
        self.model
            .active_joint_indices(group)
            .into_iter()
            .map(|i| {
                self.model.joint_models()[i].difference(self.positions[i], other.positions[i])
            })
            .collect()
    }

    fn check_len(&self, found: usize) -> Result<(), StateError> {
        if found != self.positions.len() {
            return Err(StateError::LengthMismatch {
                expected: self.positions.len(),
                found,
            });
        }
        Ok(())
    }

    fn index_of(&self, name: &str) -> Result<usize, StateError> {
        self.model
            .joint_index(name)
            .ok_or_else(|| StateError::UnknownJoint(name.to_string()))
    }

    fn indices_of(&self, names: &[String], num_values: usize) -> Result<Vec<usize>, StateError> {
        if names.len() != num_values {
            return Err(StateError::LengthMismatch {
                expected: names.len(),
                found: num_values,
            });
        }

        names.iter().map(|n| self.index_of(n)).collect()
    }
}

impl PartialEq for RobotState {
    /// Two states are equal if they belong to the same model and hold the same values.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.model, &other.model)
            && self.positions == other.positions
            && self.velocities == other.velocities
            && self.accelerations == other.accelerations
    }
}

impl fmt::Debug for RobotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RobotState")
            .field("model", &self.model.name())
            .field("positions", &self.positions)
            .field("velocities", &self.velocities)
            .field("accelerations", &self.accelerations)
            .field("dirty", &self.dirty)
            .finish()
    }
}

fn lerp_opt(from: &Option<Vec<f64>>, to: &Option<Vec<f64>>, fraction: f64) -> Option<Vec<f64>> {
    match (from, to) {
        (Some(a), Some(b)) => Some(
            a.iter()
                .zip(b.iter())
                .map(|(a, b)| lerp(*a, *b, fraction))
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::model::test::arm_model;
    use approx::assert_relative_eq;
    use std::f64::consts::{PI, TAU};

    pub(crate) fn arm() -> Arc<RobotModel> {
        Arc::new(arm_model())
    }

    /// A state of the test arm with the given [base, shoulder, elbow, gripper] positions.
    pub(crate) fn arm_state(model: &Arc<RobotModel>, positions: [f64; 4]) -> RobotState {
        let mut s = RobotState::new(model.clone());
        s.set_variable_positions(&positions).unwrap();
        s.update();
        s
    }

    #[test]
    fn test_new_is_default_and_clean() {
        let model = arm();
        let s = RobotState::new(model.clone());

        assert_eq!(s.positions(), model.default_positions());
        assert!(!s.is_dirty());
        assert!(!s.has_velocities());
        assert!(s.satisfies_bounds());
    }

    #[test]
    fn test_set_marks_dirty() {
        let model = arm();
        let mut s = RobotState::new(model);

        s.set_joint_position("elbow", 0.5).unwrap();
        assert!(s.is_dirty());
        assert_eq!(s.joint_position("elbow"), Some(0.5));

        s.update();
        assert!(!s.is_dirty());

        assert_eq!(
            s.set_joint_position("wrist", 0.5),
            Err(StateError::UnknownJoint("wrist".into()))
        );
        assert_eq!(
            s.set_variable_positions(&[0.0; 3]),
            Err(StateError::LengthMismatch {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn test_forward_kinematics() {
        let model = arm();
        let s = arm_state(&model, [0.0, 0.0, 0.0, 0.05]);

        // Straight arm along +x: 0.3 + 0.25 of links then 0.05 of gripper travel
        let tip = s.global_joint_transform("gripper").unwrap();
        assert_relative_eq!(tip.translation.vector.x, 0.6, epsilon = 1e-12);
        assert_relative_eq!(tip.translation.vector.z, 0.3, epsilon = 1e-12);

        // Rotating the base by 90 degrees swings the arm onto +y
        let s = arm_state(&model, [PI / 2.0, 0.0, 0.0, 0.05]);
        let tip = s.global_joint_transform("gripper").unwrap();
        assert_relative_eq!(tip.translation.vector.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(tip.translation.vector.y, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate() {
        let model = arm();
        let a = arm_state(&model, [0.0, 0.0, -1.0, 0.0]);
        let b = arm_state(&model, [1.0, 1.0, 1.0, 0.04]);

        let mid = a.interpolate(&b, 0.5);
        assert_relative_eq!(mid.positions()[0], 0.5);
        assert_relative_eq!(mid.positions()[2], 0.0);
        assert_relative_eq!(mid.positions()[3], 0.02);
        assert!(!mid.is_dirty());

        assert_eq!(a.interpolate(&b, 0.0), a);
    }

    #[test]
    fn test_interpolate_continuous_shortest_arc() {
        let model = arm();
        let a = arm_state(&model, [PI - 0.1, 0.0, 0.0, 0.0]);
        let b = arm_state(&model, [-PI + 0.1, 0.0, 0.0, 0.0]);

        let mid = a.interpolate(&b, 0.5);
        assert_relative_eq!(mid.positions()[0], PI, epsilon = 1e-12);
    }

    #[test]
    fn test_distance() {
        let model = arm();
        let a = arm_state(&model, [0.0, 0.0, 0.0, 0.0]);
        let b = arm_state(&model, [TAU - 0.5, 0.5, -1.0, 0.02]);

        assert_relative_eq!(a.distance(&b, None), 0.5 + 0.5 + 1.0 + 0.02, epsilon = 1e-12);

        let hand = model.joint_model_group("hand");
        assert_relative_eq!(a.distance(&b, hand), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_velocities_by_name() {
        let model = arm();
        let mut s = RobotState::new(model);

        s.set_variable_velocities_by_name(&["elbow".to_string()], &[0.3])
            .unwrap();
        assert_eq!(s.velocities(), Some(&[0.0, 0.0, 0.3, 0.0][..]));

        s.invert_velocities();
        assert_eq!(s.velocities(), Some(&[0.0, 0.0, -0.3, 0.0][..]));

        s.clear_derivatives();
        assert!(!s.has_velocities());
    }

    #[test]
    fn test_set_from_msg_is_atomic() {
        let model = arm();
        let mut s = RobotState::new(model);

        let mut msg = RobotStateMsg::default();
        msg.joint_state.name = vec!["elbow".into(), "wrist".into()];
        msg.joint_state.position = vec![1.0, 1.0];

        assert!(s.set_from_msg(&msg).is_err());
        assert_eq!(s.joint_position("elbow"), Some(0.0));

        msg.joint_state.name = vec!["elbow".into(), "shoulder".into()];
        s.set_from_msg(&msg).unwrap();
        assert_eq!(s.joint_position("elbow"), Some(1.0));
        assert_eq!(s.joint_position("shoulder"), Some(1.0));
    }

    #[test]
    fn test_to_msg() {
        let model = arm();
        let s = arm_state(&model, [0.1, 0.2, 0.3, 0.04]);

        let msg = s.to_msg();
        assert_eq!(msg.joint_state.header.frame_id, "base_link");
        assert_eq!(msg.joint_state.name, vec!["base", "shoulder", "elbow", "gripper"]);
        assert_eq!(msg.joint_state.position, vec![0.1, 0.2, 0.3, 0.04]);
        assert!(msg.joint_state.velocity.is_empty());

        let mut copy = RobotState::new(model);
        copy.set_from_msg(&msg).unwrap();
        copy.update();
        assert_eq!(copy, s);
    }

    #[test]
    fn test_enforce_bounds() {
        let model = arm();
        let mut s = arm_state(&model, [TAU + 0.25, 3.0, 0.0, 0.1]);

        assert!(!s.satisfies_bounds());
        s.enforce_bounds();
        assert!(s.satisfies_bounds());
        assert_relative_eq!(s.positions()[0], 0.25, epsilon = 1e-12);
        assert_eq!(s.positions()[1], 2.0);
        assert_eq!(s.positions()[3], 0.05);
    }
}
