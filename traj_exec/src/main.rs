//! Trajectory executable entry point.
//!
//! # Architecture
//!
//! The executable works through a single trajectory message file:
//!
//!     - Load parameters and the robot model
//!     - Import the trajectory message, on top of the model's default state (optionally
//!       overlaid with a start state message)
//!     - Apply the requested edits (unwind, reverse)
//!     - Report the trajectory and its metrics
//!     - Sample the trajectory at a fixed period and save the samples and the edited trajectory
//!       into the session directory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use structopt::StructOpt;

// Internal
use comms_if::msg::{RobotStateMsg, RobotTrajectoryMsg};
use traj_lib::{
    metrics,
    model::RobotModel,
    params::TrajExecParams,
    state::RobotState,
    trajectory::RobotTrajectory,
};
use util::{
    logger::{level_from_str, logger_init},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Inspect, edit and sample a robot trajectory.
#[derive(Debug, StructOpt)]
#[structopt(name = "traj_exec")]
struct Args {
    /// Trajectory message file (JSON)
    #[structopt(parse(from_os_str))]
    trajectory: PathBuf,

    /// Start state message file (JSON) applied to the default state before import
    #[structopt(long, parse(from_os_str))]
    start: Option<PathBuf>,

    /// Group to bind the trajectory to, overrides the parameter file
    #[structopt(short, long)]
    group: Option<String>,

    /// Remove wrapping jumps of continuous joints
    #[structopt(short, long)]
    unwind: bool,

    /// Reverse the trajectory
    #[structopt(short, long)]
    reverse: bool,

    /// Executable parameter file, relative to the params directory
    #[structopt(long, default_value = "traj_exec.toml")]
    params: String,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    let exec_params: TrajExecParams =
        util::params::load(&args.params).wrap_err("Could not load the exec params")?;

    // Initialise session
    let session = Session::new("traj_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(level_from_str(&exec_params.log_level), &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Robot Trajectory Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- LOAD MODEL ----

    let model = Arc::new(
        RobotModel::load(&exec_params.model_file).wrap_err("Could not load the robot model")?,
    );

    info!(
        "Loaded model {} with {} joints and {} groups",
        model.name(),
        model.variable_count(),
        model.joint_model_groups().len()
    );

    // ---- IMPORT TRAJECTORY ----

    let group = args
        .group
        .clone()
        .unwrap_or_else(|| exec_params.default_group.clone());

    let mut traj = RobotTrajectory::with_group(model.clone(), &group)
        .wrap_err("Could not create the trajectory")?;

    let msg: RobotTrajectoryMsg = load_json(&args.trajectory)?;
    let reference = RobotState::new(model.clone());

    let import = match &args.start {
        Some(path) => {
            let start: RobotStateMsg = load_json(path)?;
            traj.set_robot_trajectory_msg_with_start(&reference, &start, &msg)
        }
        None => traj.set_robot_trajectory_msg(&reference, &msg),
    };
    import.wrap_err("Could not import the trajectory message")?;

    info!(
        "Imported {} waypoints from {:?}",
        traj.len(),
        args.trajectory
    );

    // ---- EDIT ----

    if args.unwind {
        traj.unwind();
        info!("Trajectory unwound");
    }

    if args.reverse {
        traj.reverse();
        info!("Trajectory reversed");
    }

    // ---- REPORT ----

    for line in traj.to_string().lines() {
        info!("{}", line);
    }

    info!("Average segment duration: {:.3} s", traj.average_segment_duration());
    info!("Path length: {:.3}", metrics::path_length(&traj));
    match metrics::smoothness(&traj) {
        Some(s) => info!("Smoothness: {:.3}", s),
        None => info!("Smoothness: undefined"),
    }
    match metrics::waypoint_density(&traj) {
        Some(d) => info!("Waypoint density: {:.3}", d),
        None => info!("Waypoint density: undefined"),
    }

    // ---- SAMPLE ----

    let samples = sample(&traj, exec_params.sample_period_s)?;
    info!(
        "Sampled {} states every {} s",
        samples.len(),
        exec_params.sample_period_s
    );

    save_json(&session.session_root.join("samples.json"), &samples)?;
    save_json(
        &session.session_root.join("trajectory.json"),
        &traj.robot_trajectory_msg(&[]),
    )?;

    info!("End of execution");

    Ok(())
}

/// Sample the trajectory from start to end every `period_s` seconds. The end of the trajectory is
/// always included.
fn sample(traj: &RobotTrajectory, period_s: f64) -> Result<Vec<RobotStateMsg>, Report> {
    if !(period_s > 0.0) {
        return Err(eyre!("The sample period must be positive, found {}", period_s));
    }

    let duration = traj.duration();
    let num_steps = (duration / period_s).ceil() as usize;

    let mut samples = Vec::with_capacity(num_steps + 1);

    for step in 0..=num_steps {
        let t = (step as f64 * period_s).min(duration);

        if let Some(state) = traj.state_at_duration_from_start(t) {
            let mut msg = state.to_msg();
            msg.joint_state.header.stamp_s = t;
            samples.push(msg);
        }
    }

    Ok(samples)
}

fn load_json<T>(path: &Path) -> Result<T, Report>
where
    T: serde::de::DeserializeOwned,
{
    let s = fs::read_to_string(path).wrap_err_with(|| format!("Could not read {:?}", path))?;
    serde_json::from_str(&s).wrap_err_with(|| format!("Could not parse {:?}", path))
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Report> {
    let file = File::create(path).wrap_err_with(|| format!("Could not create {:?}", path))?;
    serde_json::to_writer_pretty(&file, value)
        .wrap_err_with(|| format!("Could not write {:?}", path))?;

    debug!("Saved {:?}", path);

    Ok(())
}
