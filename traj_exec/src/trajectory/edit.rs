//! Whole trajectory edits: append, reverse and unwind

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use std::ops::{Bound, RangeBounds};
use std::sync::Arc;

use super::RobotTrajectory;
use crate::state::RobotState;
use util::{maths::closest_representative, raise_error};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotTrajectory {
    /// Append the waypoints of `source` within `range` to the end of this trajectory.
    ///
    /// The first appended waypoint gets the duration `dt`, bridging the end of this trajectory
    /// and the start of the appended part. The others keep their durations from `source`.
    /// Waypoints are copied, later changes to `source` don't affect this trajectory.
    ///
    /// Use `..` to append the whole of `source`. An end past the end of `source` is clamped.
    ///
    /// # Panics
    /// - If the range starts after it ends or after the end of `source`.
    pub fn append<R>(&mut self, source: &RobotTrajectory, dt: f64, range: R) -> &mut Self
    where
        R: RangeBounds<usize>,
    {
        let start = match range.start_bound() {
            Bound::Included(s) => *s,
            Bound::Excluded(s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(e) => e.saturating_add(1),
            Bound::Excluded(e) => *e,
            Bound::Unbounded => source.len(),
        }
        .min(source.len());

        if start > end {
            raise_error!(
                "Cannot append waypoints [{}, {}) of a trajectory of {} waypoints",
                start,
                end,
                source.len()
            );
        }

        if !Arc::ptr_eq(&self.robot_model, &source.robot_model) {
            raise_error!(
                "Cannot append a trajectory of model {} to a trajectory of model {}",
                source.robot_model.name(),
                self.robot_model.name()
            );
        }

        for index in start..end {
            let state = RobotState::clone(source.waypoint(index));
            let duration = if index == start {
                dt
            } else {
                source.duration_from_previous[index]
            };
            self.add_suffix_waypoint(state, duration);
        }

        debug!("Appended {} waypoints", end - start);

        self
    }

    /// Reverse the order of the waypoints.
    ///
    /// The duration of the first waypoint (the time from the start of the trajectory) stays
    /// first, the durations between waypoints follow the waypoints they connect. The total
    /// duration is unchanged and reversing twice gives back the original trajectory. Velocities
    /// are negated.
    pub fn reverse(&mut self) -> &mut Self {
        if self.is_empty() {
            return self;
        }

        let mut waypoints = std::mem::take(&mut self.waypoints);
        let mut durations = std::mem::take(&mut self.duration_from_previous);

        waypoints.make_contiguous().reverse();
        for w in waypoints.iter_mut() {
            if w.has_velocities() {
                Arc::make_mut(w).invert_velocities();
            }
        }

        // Keep d0 in place and reverse the rest, so the duration between two waypoints moves
        // with them: [d0, d1, .., dn-1] -> [d0, dn-1, .., d1]
        durations.make_contiguous()[1..].reverse();

        self.replace_content(waypoints, durations);
        self
    }

    /// Remove the jumps of continuous joints caused by their positions wrapping.
    ///
    /// Each waypoint's value is moved by whole turns so it is as close as possible to the
    /// (already unwound) value of the previous waypoint. The first waypoint is left as is.
    pub fn unwind(&mut self) -> &mut Self {
        self.unwind_impl(None)
    }

    /// Unwind the trajectory, starting from the given state.
    ///
    /// The first waypoint is also unwound, relative to `state`.
    pub fn unwind_from(&mut self, state: &RobotState) -> &mut Self {
        self.unwind_impl(Some(state))
    }

    fn unwind_impl(&mut self, reference: Option<&RobotState>) -> &mut Self {
        if self.is_empty() {
            return self;
        }

        let model = self.robot_model.clone();
        let joints = model.continuous_joint_models(self.group());

        for joint in joints {
            // Every joint of the continuous set has a period
            let period = match joint.wrap_period() {
                Some(p) => p,
                None => continue,
            };
            let i = joint.index();

            let mut previous = match reference {
                Some(r) => r.variable_position(i),
                None => self.waypoints[0].variable_position(i),
            };

            for w in self.waypoints.iter_mut() {
                let current = w.variable_position(i);
                let unwound = closest_representative(current, previous, period);

                if unwound != current {
                    Arc::make_mut(w).set_variable_position(i, unwound);
                }

                previous = unwound;
            }

            debug!("Unwound joint {}", joint.name());
        }

        for w in self.waypoints.iter_mut() {
            if w.is_dirty() {
                Arc::make_mut(w).update();
            }
        }

        self
    }
}

#[cfg(test)]
mod test {
    use super::super::test::{arm_traj, arm_traj_for, first_positions};
    use super::*;
    use crate::state::test::{arm, arm_state};
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn durations(traj: &RobotTrajectory) -> Vec<f64> {
        traj.waypoint_durations().iter().copied().collect()
    }

    #[test]
    fn test_append_to_empty() {
        let source = arm_traj(&[0.0, 1.0, 2.0], &[0.3, 1.0, 2.0]);
        let mut traj = RobotTrajectory::new(source.robot_model().clone());

        traj.append(&source, 0.7, ..);

        assert_eq!(traj.len(), 3);
        assert_eq!(durations(&traj), vec![0.7, 1.0, 2.0]);
        for i in 0..3 {
            assert_eq!(traj.waypoint(i), source.waypoint(i));
            assert!(!Arc::ptr_eq(traj.waypoint_ptr(i), source.waypoint_ptr(i)));
        }
    }

    #[test]
    fn test_append_range() {
        let model = arm();
        let source = arm_traj_for(&model, &[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 2.0, 3.0]);
        let mut traj = arm_traj_for(&model, &[10.0], &[0.0]);

        traj.append(&source, 0.5, 1..3);

        assert_eq!(first_positions(&traj), vec![10.0, 1.0, 2.0]);
        assert_eq!(durations(&traj), vec![0.0, 0.5, 2.0]);

        // End past the end of the source is clamped
        traj.append(&source, 0.1, 3..100);
        assert_eq!(first_positions(&traj), vec![10.0, 1.0, 2.0, 3.0]);
        assert_eq!(durations(&traj), vec![0.0, 0.5, 2.0, 0.1]);

        // Empty range is a no-op
        traj.append(&source, 0.1, 2..2);
        assert_eq!(traj.len(), 4);
    }

    #[test]
    #[should_panic]
    fn test_append_other_model() {
        let source = arm_traj(&[0.0, 1.0], &[0.0, 1.0]);
        let mut traj = arm_traj(&[0.0], &[0.0]);
        traj.append(&source, 0.0, ..);
    }

    #[test]
    fn test_append_is_deep() {
        let mut source = arm_traj(&[0.0, 1.0], &[0.0, 1.0]);
        let mut traj = RobotTrajectory::new(source.robot_model().clone());
        traj.append(&source, 0.0, ..);

        source.waypoint_mut(1).set_joint_position("elbow", 2.0).unwrap();
        assert_eq!(traj.waypoint(1).joint_position("elbow"), Some(1.0));
    }

    #[test]
    #[should_panic]
    fn test_append_bad_range() {
        let source = arm_traj(&[0.0, 1.0], &[0.0, 1.0]);
        let mut traj = RobotTrajectory::new(source.robot_model().clone());
        traj.append(&source, 0.0, 5..);
    }

    #[test]
    fn test_reverse() {
        let mut traj = arm_traj(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 2.0, 3.0]);

        traj.reverse();

        assert_eq!(first_positions(&traj), vec![3.0, 2.0, 1.0, 0.0]);
        assert_eq!(durations(&traj), vec![0.0, 3.0, 2.0, 1.0]);
        assert_eq!(traj.duration(), 6.0);
    }

    #[test]
    fn test_reverse_twice_is_identity() {
        let original = arm_traj(&[0.0, 0.5, 2.0], &[0.25, 1.0, 2.0]);
        let mut traj = original.deep_copy();

        traj.reverse();
        assert_eq!(traj.duration(), original.duration());
        traj.reverse();

        assert_eq!(durations(&traj), durations(&original));
        for i in 0..traj.len() {
            assert_eq!(traj.waypoint(i), original.waypoint(i));
        }
    }

    #[test]
    fn test_reverse_inverts_velocities() {
        let mut traj = arm_traj(&[0.0, 1.0], &[0.0, 1.0]);
        traj.waypoint_mut(0)
            .set_variable_velocities(&[1.0, 0.0, -0.5, 0.0])
            .unwrap();

        traj.reverse();

        assert_eq!(
            traj.waypoint(1).velocities(),
            Some(&[-1.0, 0.0, 0.5, 0.0][..])
        );
        assert!(!traj.waypoint(0).has_velocities());
    }

    #[test]
    fn test_reverse_empty_and_single() {
        let mut traj = arm_traj(&[], &[]);
        traj.reverse();
        assert!(traj.is_empty());

        let mut traj = arm_traj(&[1.0], &[0.5]);
        traj.reverse();
        assert_eq!(durations(&traj), vec![0.5]);
    }

    #[test]
    fn test_unwind() {
        let mut traj = arm_traj(&[3.0, 3.0 - TAU + 0.1], &[0.0, 1.0]);

        traj.unwind();

        // Base is continuous, the other joints are bounded and left alone
        assert_relative_eq!(traj.waypoint(1).positions()[0], 3.1, epsilon = 1e-12);
        assert_relative_eq!(traj.waypoint(1).positions()[1], 3.0 - TAU + 0.1);
        assert_relative_eq!(traj.waypoint(1).positions()[2], 3.0 - TAU + 0.1);
        assert_eq!(traj.waypoint(0).positions()[0], 3.0);
        assert!(!traj.waypoint(1).is_dirty());
    }

    #[test]
    fn test_unwind_accumulates() {
        // A base spinning steadily forwards, stored wrapped into [-pi, pi)
        let raw: Vec<f64> = (0..12)
            .map(|i| util::maths::wrap_to_pi(i as f64 * 1.0))
            .collect();
        let mut traj = arm_traj(&raw, &vec![0.1; raw.len()]);

        traj.unwind();

        for i in 0..traj.len() {
            assert_relative_eq!(traj.waypoint(i).positions()[0], i as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_unwind_from_reference() {
        let mut traj = arm_traj(&[0.1, 0.2], &[0.0, 1.0]);
        let model = traj.robot_model().clone();
        let reference = arm_state(&model, [2.0 * TAU, 0.0, 0.0, 0.0]);

        traj.unwind_from(&reference);

        assert_relative_eq!(traj.waypoint(0).positions()[0], 2.0 * TAU + 0.1, epsilon = 1e-9);
        assert_relative_eq!(traj.waypoint(1).positions()[0], 2.0 * TAU + 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_unwind_respects_group() {
        let mut traj = arm_traj(&[3.0, 3.0 - TAU + 0.1], &[0.0, 1.0]);
        traj.set_group_name("hand").unwrap();

        traj.unwind();

        assert_relative_eq!(traj.waypoint(1).positions()[0], 3.0 - TAU + 0.1);
    }

    #[test]
    fn test_unwind_does_not_touch_shared() {
        let mut traj = arm_traj(&[3.0, 3.0 - TAU + 0.1], &[0.0, 1.0]);
        let shallow = traj.shallow_copy();

        traj.unwind();

        assert_relative_eq!(shallow.waypoint(1).positions()[0], 3.0 - TAU + 0.1);
        assert!(Arc::ptr_eq(traj.waypoint_ptr(0), shallow.waypoint_ptr(0)));
    }
}
