//! # Communications interface crate.
//!
//! Provides the message structures exchanged with planners and execution
//! layers. These are plain data, encoding is left to `serde`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Trajectory and robot state message definitions
pub mod msg;
