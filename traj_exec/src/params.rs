//! Trajectory executable parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the trajectory executable, loaded from `traj_exec.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajExecParams {
    /// Robot model parameter file, relative to the params directory
    pub model_file: String,

    /// Group trajectories are bound to when none is given on the command line. Empty for the
    /// whole robot.
    #[serde(default)]
    pub default_group: String,

    /// Period at which the loaded trajectory is sampled.
    ///
    /// Units: seconds
    pub sample_period_s: f64,

    /// Minimum level of messages written to the log, one of "trace", "debug" or "info"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load() {
        let p: TrajExecParams = util::params::from_str(
            r#"
            model_file = "model.toml"
            sample_period_s = 0.05
            "#,
        )
        .unwrap();

        assert_eq!(p.model_file, "model.toml");
        assert_eq!(p.default_group, "");
        assert_eq!(p.sample_period_s, 0.05);
        assert_eq!(p.log_level, "info");
    }
}
