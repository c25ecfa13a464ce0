//! # Messages
//!
//! Joint trajectory and robot state messages.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod state;
pub mod trajectory;

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use state::*;
pub use trajectory::*;

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// Common header carried by stamped messages.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Header {
    /// Time stamp of the message in seconds.
    #[serde(default)]
    pub stamp_s: f64,

    /// Frame the message data is expressed in.
    #[serde(default)]
    pub frame_id: String,
}
