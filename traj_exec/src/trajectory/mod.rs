//! # Robot trajectory
//!
//! A robot trajectory is a sequence of full robot states (waypoints) together
//! with the time elapsed between each waypoint and its predecessor. Planners
//! build trajectories, execution layers sample them in time.
//!
//! The two sequences are stored side by side and always have the same length:
//!
//! ```text
//!  index:                   0        1        2        3
//!  waypoints:              w0       w1       w2       w3
//!  duration_from_previous: d0       d1       d2       d3
//!                           ^ time from trajectory start to w0, usually 0
//! ```
//!
//! so `w2` is reached at `d0 + d1 + d2` seconds after the start.
//!
//! Waypoints are held behind `Arc`s. A [`RobotTrajectory::shallow_copy`]
//! shares them with the original, a [`RobotTrajectory::deep_copy`] does not.
//! Mutable access to a waypoint is copy-on-write, so a trajectory never sees
//! a pose change made through another trajectory.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod conversion;
mod edit;
mod print;
mod timing;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::collections::VecDeque;
use std::sync::Arc;

// Internal
use crate::model::{JointModelGroup, RobotModel};
use crate::state::{RobotState, StateError};
pub use timing::WaypointBracket;
use util::raise_error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A sequence of waypoints and the durations between them.
pub struct RobotTrajectory {
    robot_model: Arc<RobotModel>,

    /// Name of the group the trajectory is for, `None` for the whole robot
    group: Option<String>,

    waypoints: VecDeque<Arc<RobotState>>,

    /// Units: seconds
    duration_from_previous: VecDeque<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Recoverable errors raised by trajectory operations.
#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    #[error("The robot model {model} has no group named {group}")]
    UnknownGroup { model: String, group: String },

    #[error("Trajectory message point {point} is invalid: {source}")]
    InvalidPoint { point: usize, source: StateError },

    #[error("Trajectory message point {point} has a time from start before that of the previous point or the start")]
    NonMonotonicTime { point: usize },

    #[error("Trajectory message point {point} has a non-finite time from start")]
    InvalidTime { point: usize },

    #[error("The start state message is invalid: {0}")]
    InvalidStartState(StateError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotTrajectory {
    /// Create an empty trajectory for the whole robot.
    pub fn new(robot_model: Arc<RobotModel>) -> Self {
        Self {
            robot_model,
            group: None,
            waypoints: VecDeque::new(),
            duration_from_previous: VecDeque::new(),
        }
    }

    /// Create an empty trajectory for the named group.
    ///
    /// An empty name is the same as [`RobotTrajectory::new`].
    pub fn with_group(robot_model: Arc<RobotModel>, group: &str) -> Result<Self, TrajectoryError> {
        let mut traj = Self::new(robot_model);
        traj.set_group_name(group)?;
        Ok(traj)
    }

    /// Copy the trajectory, sharing the waypoints with `self`.
    pub fn shallow_copy(&self) -> Self {
        Self {
            robot_model: self.robot_model.clone(),
            group: self.group.clone(),
            waypoints: self.waypoints.clone(),
            duration_from_previous: self.duration_from_previous.clone(),
        }
    }

    /// Copy the trajectory, including independent copies of every waypoint.
    pub fn deep_copy(&self) -> Self {
        Self {
            robot_model: self.robot_model.clone(),
            group: self.group.clone(),
            waypoints: self
                .waypoints
                .iter()
                .map(|w| Arc::new(RobotState::clone(w)))
                .collect(),
            duration_from_previous: self.duration_from_previous.clone(),
        }
    }

    pub fn robot_model(&self) -> &Arc<RobotModel> {
        &self.robot_model
    }

    /// The group this trajectory is for, or `None` for the whole robot.
    pub fn group(&self) -> Option<&JointModelGroup> {
        self.group
            .as_deref()
            .and_then(|g| self.robot_model.joint_model_group(g))
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Rebind the trajectory to another group of the same model.
    ///
    /// An empty name binds the trajectory to the whole robot. On error the
    /// previous group is kept.
    pub fn set_group_name(&mut self, group: &str) -> Result<&mut Self, TrajectoryError> {
        if group.is_empty() {
            self.group = None;
        } else if self.robot_model.has_joint_model_group(group) {
            self.group = Some(group.to_string());
        } else {
            return Err(TrajectoryError::UnknownGroup {
                model: self.robot_model.name().to_string(),
                group: group.to_string(),
            });
        }

        Ok(self)
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.waypoints.len(), self.duration_from_previous.len());
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// # Panics
    /// - If `index` is out of range.
    pub fn waypoint(&self, index: usize) -> &RobotState {
        &self.waypoints[index]
    }

    /// # Panics
    /// - If the trajectory is empty.
    pub fn first_waypoint(&self) -> &RobotState {
        match self.waypoints.front() {
            Some(w) => &**w,
            None => raise_error!("Requested the first waypoint of an empty trajectory"),
        }
    }

    /// # Panics
    /// - If the trajectory is empty.
    pub fn last_waypoint(&self) -> &RobotState {
        match self.waypoints.back() {
            Some(w) => &**w,
            None => raise_error!("Requested the last waypoint of an empty trajectory"),
        }
    }

    /// Shared handle to a waypoint, to keep it alive or store it in another trajectory.
    pub fn waypoint_ptr(&self, index: usize) -> &Arc<RobotState> {
        &self.waypoints[index]
    }

    /// Mutable access to a waypoint.
    ///
    /// If the waypoint is shared with another trajectory it is copied first. Call
    /// [`RobotState::update`] after changing positions.
    pub fn waypoint_mut(&mut self, index: usize) -> &mut RobotState {
        Arc::make_mut(&mut self.waypoints[index])
    }

    pub fn waypoint_durations(&self) -> &VecDeque<f64> {
        &self.duration_from_previous
    }

    /// Duration between the waypoint at `index` and its predecessor, or 0 if `index` is out of
    /// range.
    pub fn waypoint_duration_from_previous(&self, index: usize) -> f64 {
        self.duration_from_previous
            .get(index)
            .copied()
            .unwrap_or(0.0)
    }

    /// Set the duration between the waypoint at `index` and its predecessor.
    ///
    /// # Panics
    /// - If there is no waypoint at `index`; durations can only be set for existing waypoints.
    pub fn set_waypoint_duration_from_previous(&mut self, index: usize, value: f64) -> &mut Self {
        if index >= self.duration_from_previous.len() {
            raise_error!(
                "Cannot set the duration of waypoint {} in a trajectory of {} waypoints",
                index,
                self.duration_from_previous.len()
            );
        }
        check_duration(value);

        self.duration_from_previous[index] = value;
        self
    }

    /// Add a waypoint at the end of the trajectory.
    ///
    /// `dt` is the duration from the current last waypoint to the new one.
    pub fn add_suffix_waypoint(&mut self, state: RobotState, dt: f64) -> &mut Self {
        self.add_suffix_waypoint_shared(Arc::new(state), dt)
    }

    /// Add a shared waypoint at the end of the trajectory.
    pub fn add_suffix_waypoint_shared(&mut self, state: Arc<RobotState>, dt: f64) -> &mut Self {
        let state = self.prepare(state, dt);
        self.waypoints.push_back(state);
        self.duration_from_previous.push_back(dt);
        self
    }

    /// Add a waypoint at the start of the trajectory.
    ///
    /// `dt` is the duration from the new waypoint to the current first one. The
    /// current first waypoint's duration is left as it was.
    pub fn add_prefix_waypoint(&mut self, state: RobotState, dt: f64) -> &mut Self {
        self.add_prefix_waypoint_shared(Arc::new(state), dt)
    }

    /// Add a shared waypoint at the start of the trajectory.
    pub fn add_prefix_waypoint_shared(&mut self, state: Arc<RobotState>, dt: f64) -> &mut Self {
        let state = self.prepare(state, dt);
        self.waypoints.push_front(state);
        self.duration_from_previous.push_front(dt);
        self
    }

    /// Insert a waypoint so that it ends up at `index`.
    ///
    /// `dt` is the duration from the waypoint before `index` to the new waypoint.
    ///
    /// # Panics
    /// - If `index` is greater than the length of the trajectory.
    pub fn insert_waypoint(&mut self, index: usize, state: RobotState, dt: f64) -> &mut Self {
        self.insert_waypoint_shared(index, Arc::new(state), dt)
    }

    /// Insert a shared waypoint so that it ends up at `index`.
    pub fn insert_waypoint_shared(
        &mut self,
        index: usize,
        state: Arc<RobotState>,
        dt: f64,
    ) -> &mut Self {
        if index > self.waypoints.len() {
            raise_error!(
                "Cannot insert a waypoint at {} in a trajectory of {} waypoints",
                index,
                self.waypoints.len()
            );
        }

        let state = self.prepare(state, dt);
        self.waypoints.insert(index, state);
        self.duration_from_previous.insert(index, dt);
        self
    }

    /// Remove every waypoint, keeping the model and group.
    pub fn clear(&mut self) -> &mut Self {
        self.waypoints.clear();
        self.duration_from_previous.clear();
        self
    }

    /// Exchange the contents of two trajectories without copying any waypoint.
    pub fn swap(&mut self, other: &mut RobotTrajectory) {
        std::mem::swap(self, other);
    }

    /// Iterate over `(waypoint, duration_from_previous)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&RobotState, f64)> + '_ {
        debug_assert_eq!(self.waypoints.len(), self.duration_from_previous.len());
        self.waypoints
            .iter()
            .map(|w| &**w)
            .zip(self.duration_from_previous.iter().copied())
    }

    /// Make a state ready to be stored: it must belong to this trajectory's model and have
    /// an up to date kinematics cache.
    fn prepare(&self, mut state: Arc<RobotState>, dt: f64) -> Arc<RobotState> {
        if !Arc::ptr_eq(state.robot_model(), &self.robot_model) {
            raise_error!(
                "Cannot add a state of model {} to a trajectory of model {}",
                state.robot_model().name(),
                self.robot_model.name()
            );
        }
        check_duration(dt);

        if state.is_dirty() {
            Arc::make_mut(&mut state).update();
        }

        state
    }

    /// Replace the whole content in one go, used by operations that must not leave a partial
    /// result behind.
    fn replace_content(
        &mut self,
        waypoints: VecDeque<Arc<RobotState>>,
        durations: VecDeque<f64>,
    ) {
        debug_assert_eq!(waypoints.len(), durations.len());
        self.waypoints = waypoints;
        self.duration_from_previous = durations;
        debug!("Trajectory content replaced, {} waypoints", self.waypoints.len());
    }
}

fn check_duration(dt: f64) {
    if dt < 0.0 {
        warn!("Negative waypoint duration {} will break time queries", dt);
    }
    debug_assert!(dt.is_finite(), "Waypoint durations must be finite");
}
