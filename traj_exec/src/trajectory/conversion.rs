//! Conversion between trajectories and trajectory messages

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use std::collections::VecDeque;
use std::sync::Arc;

use super::{RobotTrajectory, TrajectoryError};
use crate::state::RobotState;
use comms_if::msg::{
    Header, JointTrajectory, JointTrajectoryPoint, RobotStateMsg, RobotTrajectoryMsg,
};
use util::raise_error;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotTrajectory {
    /// Replace the content of the trajectory with the points of a trajectory message.
    ///
    /// Each point becomes a waypoint: a copy of `reference` with the joints named in the
    /// message overwritten. The duration of each waypoint is the difference between its
    /// `time_from_start_s` and the previous point's, the first waypoint's duration is its own
    /// `time_from_start_s`.
    ///
    /// The whole message is checked before anything is changed, on error the trajectory is
    /// left as it was.
    ///
    /// # Panics
    /// - If `reference` is a state of another model.
    pub fn set_robot_trajectory_msg(
        &mut self,
        reference: &RobotState,
        msg: &RobotTrajectoryMsg,
    ) -> Result<&mut Self, TrajectoryError> {
        if !Arc::ptr_eq(reference.robot_model(), &self.robot_model) {
            raise_error!(
                "Cannot import a message using a reference state of model {} into a trajectory of model {}",
                reference.robot_model().name(),
                self.robot_model.name()
            );
        }

        let jt: &JointTrajectory = &msg.joint_trajectory;

        let mut waypoints = VecDeque::with_capacity(jt.points.len());
        let mut durations = VecDeque::with_capacity(jt.points.len());
        let mut last_time = 0.0;

        for (i, point) in jt.points.iter().enumerate() {
            let t = point.time_from_start_s;
            if !t.is_finite() {
                return Err(TrajectoryError::InvalidTime { point: i });
            }
            // The first point can't come before the start of the trajectory
            if t < last_time {
                return Err(TrajectoryError::NonMonotonicTime { point: i });
            }

            let state = point_to_state(reference, &jt.joint_names, point)
                .map_err(|source| TrajectoryError::InvalidPoint { point: i, source })?;

            waypoints.push_back(Arc::new(state));
            durations.push_back(t - last_time);
            last_time = t;
        }

        self.replace_content(waypoints, durations);

        debug!(
            "Imported {} points over {} joints",
            jt.points.len(),
            jt.joint_names.len()
        );

        Ok(self)
    }

    /// As [`RobotTrajectory::set_robot_trajectory_msg`], but the joints given in `start` are
    /// applied to the reference state first.
    pub fn set_robot_trajectory_msg_with_start(
        &mut self,
        reference: &RobotState,
        start: &RobotStateMsg,
        msg: &RobotTrajectoryMsg,
    ) -> Result<&mut Self, TrajectoryError> {
        let mut start_state = reference.clone();
        start_state
            .set_from_msg(start)
            .map_err(TrajectoryError::InvalidStartState)?;

        self.set_robot_trajectory_msg(&start_state, msg)
    }

    /// Build a trajectory message from this trajectory.
    ///
    /// The message holds the active joints in model order, restricted to those named in
    /// `joint_filter` unless it is empty. Velocities and accelerations are included for the
    /// waypoints that have them.
    pub fn robot_trajectory_msg(&self, joint_filter: &[String]) -> RobotTrajectoryMsg {
        let model = &self.robot_model;

        let indices: Vec<usize> = model
            .active_joint_indices(self.group())
            .into_iter()
            .filter(|i| {
                joint_filter.is_empty()
                    || joint_filter
                        .iter()
                        .any(|f| f == model.joint_models()[*i].name())
            })
            .collect();

        let joint_names = indices
            .iter()
            .map(|i| model.joint_models()[*i].name().to_string())
            .collect();

        let select = |values: &[f64]| -> Vec<f64> { indices.iter().map(|i| values[*i]).collect() };

        // Accumulated in index order so it matches waypoint_duration_from_start exactly
        let mut time_from_start = 0.0;
        let points = self
            .iter()
            .map(|(w, dt)| {
                time_from_start += dt;
                JointTrajectoryPoint {
                    positions: select(w.positions()),
                    velocities: w.velocities().map(select).unwrap_or_default(),
                    accelerations: w.accelerations().map(select).unwrap_or_default(),
                    effort: Vec::new(),
                    time_from_start_s: time_from_start,
                }
            })
            .collect();

        RobotTrajectoryMsg {
            joint_trajectory: JointTrajectory {
                header: Header {
                    stamp_s: 0.0,
                    frame_id: model.root_frame().to_string(),
                },
                joint_names,
                points,
            },
        }
    }
}

/// Build the state of a single message point on top of `reference`.
fn point_to_state(
    reference: &RobotState,
    joint_names: &[String],
    point: &JointTrajectoryPoint,
) -> Result<RobotState, crate::state::StateError> {
    let mut state = reference.clone();

    state.set_variable_positions_by_name(joint_names, &point.positions)?;
    if !point.velocities.is_empty() {
        state.set_variable_velocities_by_name(joint_names, &point.velocities)?;
    }
    if !point.accelerations.is_empty() {
        state.set_variable_accelerations_by_name(joint_names, &point.accelerations)?;
    }

    state.update();

    Ok(state)
}
