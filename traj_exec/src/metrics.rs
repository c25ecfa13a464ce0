//! # Trajectory quality metrics
//!
//! Scalar measures of a trajectory's shape, computed over the active joints of the trajectory
//! (its group, or every joint). None of them looks at the timing of the waypoints.
//!
//! Metrics which are undefined for a given trajectory (too few waypoints, zero length) return
//! `None` rather than a sentinel value.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::DVector;

// Internal
use crate::trajectory::RobotTrajectory;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Total joint space distance travelled along the trajectory.
///
/// Sum of the distances between consecutive waypoints, see [`crate::state::RobotState::distance`].
/// Zero for trajectories with less than two waypoints.
pub fn path_length(traj: &RobotTrajectory) -> f64 {
    let group = traj.group();

    (1..traj.len())
        .map(|i| traj.waypoint(i - 1).distance(traj.waypoint(i), group))
        .sum()
}

/// Weighted mean squared turning angle of the path through joint space.
///
/// For every inner waypoint the angle `theta` between the incoming and outgoing displacements
/// is found and `(2 * theta)^2` is averaged, weighted by the length of the two displacements.
/// A straight path gives 0, a right angled corner gives `pi^2`.
///
/// Returns `None` for trajectories with less than three waypoints, or if two consecutive
/// waypoints are at the same position.
pub fn smoothness(traj: &RobotTrajectory) -> Option<f64> {
    if traj.len() < 3 {
        return None;
    }

    let group = traj.group();

    let mut displacements = Vec::with_capacity(traj.len() - 1);
    for i in 1..traj.len() {
        let d = DVector::from_vec(traj.waypoint(i - 1).difference(traj.waypoint(i), group));
        if d.norm() <= std::f64::EPSILON {
            trace!("Zero length displacement into waypoint {}, smoothness undefined", i);
            return None;
        }
        displacements.push(d);
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for pair in displacements.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let (norm_a, norm_b) = (a.norm(), b.norm());

        let cos_theta = clamp(&(a.dot(b) / (norm_a * norm_b)), &-1.0, &1.0);
        let theta = cos_theta.acos();
        let weight = norm_a + norm_b;

        weighted_sum += weight * (2.0 * theta).powi(2);
        total_weight += weight;
    }

    Some(weighted_sum / total_weight)
}

/// Number of waypoints per unit of path length.
///
/// Returns `None` for trajectories with less than two waypoints or a zero path length.
pub fn waypoint_density(traj: &RobotTrajectory) -> Option<f64> {
    if traj.len() < 2 {
        return None;
    }

    let length = path_length(traj);
    if length <= 0.0 {
        return None;
    }

    Some(traj.len() as f64 / length)
}
