//! Time queries on a trajectory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::RobotTrajectory;
use crate::state::RobotState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pair of waypoints either side of a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointBracket {
    /// Index of the waypoint at or before the time
    pub before: usize,

    /// Index of the waypoint at or after the time, `before <= after`
    pub after: usize,

    /// Progress in [0, 1] from `before` to `after`, measured in time. Always 0 when `before ==
    /// after`.
    pub blend: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotTrajectory {
    /// Total duration of the trajectory.
    ///
    /// Units: seconds
    pub fn duration(&self) -> f64 {
        self.duration_from_previous.iter().sum()
    }

    /// Mean duration of a waypoint, or 0 for an empty trajectory.
    pub fn average_segment_duration(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.duration() / self.len() as f64
        }
    }

    /// Time from the start of the trajectory at which the waypoint at `index` is reached.
    ///
    /// If `index` is past the end the total duration is returned.
    pub fn waypoint_duration_from_start(&self, index: usize) -> f64 {
        let end = index.saturating_add(1).min(self.duration_from_previous.len());
        self.duration_from_previous.iter().take(end).sum()
    }

    /// Find the waypoints either side of `duration` seconds after the start.
    ///
    /// - Before the start (`duration <= 0`) both indices are the first waypoint.
    /// - At or after the end both indices are the last waypoint.
    /// - Exactly at the time of a waypoint both indices are that waypoint.
    ///
    /// Returns `None` if the trajectory is empty.
    pub fn find_waypoint_indices_for_duration_after_start(
        &self,
        duration: f64,
    ) -> Option<WaypointBracket> {
        if self.is_empty() {
            return None;
        }

        let last = self.len() - 1;

        if duration <= 0.0 {
            return Some(WaypointBracket::at(0));
        }

        // The running sum has to be accumulated in index order so it matches
        // waypoint_duration_from_start bit for bit
        let mut running = 0.0;
        for (index, dt) in self.duration_from_previous.iter().enumerate() {
            let previous = running;
            running += dt;

            if running >= duration {
                if running == duration || index == 0 {
                    return Some(WaypointBracket::at(index));
                }

                return Some(WaypointBracket {
                    before: index - 1,
                    after: index,
                    blend: (duration - previous) / dt,
                });
            }
        }

        Some(WaypointBracket::at(last))
    }

    /// Get the state of the robot `duration` seconds after the start of the trajectory, linearly
    /// interpolating between the waypoints either side.
    ///
    /// Times before the start give the first waypoint, times after the end give the last one.
    /// Returns `None` if the trajectory is empty.
    pub fn state_at_duration_from_start(&self, duration: f64) -> Option<RobotState> {
        let bracket = self.find_waypoint_indices_for_duration_after_start(duration)?;

        trace!(
            "State at {} s: waypoints {} -> {}, blend {}",
            duration,
            bracket.before,
            bracket.after,
            bracket.blend
        );

        if bracket.before == bracket.after {
            return Some(self.waypoint(bracket.before).clone());
        }

        Some(
            self.waypoint(bracket.before)
                .interpolate(self.waypoint(bracket.after), bracket.blend),
        )
    }
}

impl WaypointBracket {
    fn at(index: usize) -> Self {
        Self {
            before: index,
            after: index,
            blend: 0.0,
        }
    }
}
