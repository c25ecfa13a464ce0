//! # Trajectory library.
//!
//! This library allows other crates in the workspace to access the trajectory types used by the
//! trajectory executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Robot model - the joints of the robot, their limits and the named groups of joints
pub mod model;

/// Robot state - a pose of every joint of a model
pub mod state;

/// Robot trajectory - timed sequences of robot states
pub mod trajectory;

/// Metrics - scalar measures of a trajectory's shape
pub mod metrics;

/// Executable parameters
pub mod params;
