//! Human readable dump of a trajectory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;
use std::io;

use super::RobotTrajectory;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotTrajectory {
    /// Write the trajectory to `out`, one line per waypoint holding the time from the start
    /// and the positions, velocities and accelerations of the variables at `variable_indexes`.
    ///
    /// An empty `variable_indexes` prints the active joints.
    pub fn print<W: io::Write>(&self, out: &mut W, variable_indexes: &[usize]) -> io::Result<()> {
        let mut s = String::new();
        self.write_table(&mut s, variable_indexes)
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "Could not format the trajectory"))?;

        out.write_all(s.as_bytes())
    }

    fn write_table(&self, f: &mut dyn fmt::Write, variable_indexes: &[usize]) -> fmt::Result {
        let indexes = if variable_indexes.is_empty() {
            self.robot_model.active_joint_indices(self.group())
        } else {
            variable_indexes.to_vec()
        };

        writeln!(
            f,
            "Trajectory has {} points over {:.3} seconds",
            self.len(),
            self.duration()
        )?;

        let mut time_from_start = 0.0;
        for (i, (w, dt)) in self.iter().enumerate() {
            time_from_start += dt;
            write!(f, "  waypoint {:>4} time {:>9.3} pos", i, time_from_start)?;
            for j in indexes.iter() {
                write!(f, " {:>7.3}", w.variable_position(*j))?;
            }

            if let Some(vels) = w.velocities() {
                write!(f, " vel")?;
                for j in indexes.iter() {
                    write!(f, " {:>7.3}", vels[*j])?;
                }
            }

            if let Some(accs) = w.accelerations() {
                write!(f, " acc")?;
                for j in indexes.iter() {
                    write!(f, " {:>7.3}", accs[*j])?;
                }
            }

            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for RobotTrajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        self.write_table(&mut s, &[])?;
        f.write_str(s.trim_end())
    }
}
