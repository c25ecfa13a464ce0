//! Joint model definitions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// Internal
use util::maths::{clamp, get_ang_dist_2pi, wrap_to_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing a single joint, as found in the model parameter file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointParams {
    /// Unique name of the joint
    pub name: String,

    /// The type of the joint
    pub joint_type: JointType,

    /// Name of the parent joint, or `None` if the joint is attached to the root frame.
    ///
    /// Parents must be declared before their children.
    #[serde(default)]
    pub parent: Option<String>,

    /// Lower position limit. Ignored for continuous joints.
    ///
    /// Units: radians or meters
    #[serde(default)]
    pub min_pos: Option<f64>,

    /// Upper position limit. Ignored for continuous joints.
    ///
    /// Units: radians or meters
    #[serde(default)]
    pub max_pos: Option<f64>,

    /// Axis of rotation (revolute, continuous) or translation (prismatic) in the joint frame.
    #[serde(default = "default_axis")]
    pub axis: [f64; 3],

    /// Translation of the joint frame from the parent frame.
    ///
    /// Units: meters
    #[serde(default)]
    pub origin_m: [f64; 3],

    /// Position the joint takes in a default state.
    #[serde(default)]
    pub default_pos: f64,
}

/// A single degree of freedom joint of the robot.
#[derive(Debug, Clone)]
pub struct JointModel {
    name: String,
    joint_type: JointType,
    index: usize,
    parent_index: Option<usize>,
    bounds: Option<(f64, f64)>,
    axis: Unit<Vector3<f64>>,
    origin: Isometry3<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The kind of motion a joint allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointType {
    /// Rotation about an axis within position limits
    Revolute,

    /// Unbounded rotation about an axis, position wraps every full turn
    Continuous,

    /// Translation along an axis within position limits
    Prismatic,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl JointModel {
    /// Build the joint model. Validation of the parameters is the job of the
    /// owning [`super::RobotModel`].
    pub(crate) fn new(
        params: &JointParams,
        index: usize,
        parent_index: Option<usize>,
        axis: Unit<Vector3<f64>>,
    ) -> Self {
        let bounds = match params.joint_type {
            JointType::Continuous => None,
            _ => match (params.min_pos, params.max_pos) {
                (Some(min), Some(max)) => Some((min, max)),
                _ => None,
            },
        };

        Self {
            name: params.name.clone(),
            joint_type: params.joint_type,
            index,
            parent_index,
            bounds,
            axis,
            origin: Isometry3::from_parts(
                Translation3::new(params.origin_m[0], params.origin_m[1], params.origin_m[2]),
                UnitQuaternion::identity(),
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn joint_type(&self) -> JointType {
        self.joint_type
    }

    /// Index of this joint's variable within a state's position vector.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn parent_index(&self) -> Option<usize> {
        self.parent_index
    }

    /// Position limits of the joint, `None` if unbounded.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.bounds
    }

    pub fn is_continuous(&self) -> bool {
        self.joint_type == JointType::Continuous
    }

    /// The period after which the joint's position wraps, or `None` if it doesn't wrap.
    pub fn wrap_period(&self) -> Option<f64> {
        match self.joint_type {
            JointType::Continuous => Some(std::f64::consts::TAU),
            _ => None,
        }
    }

    /// Signed difference `to - from`, taking the shortest way round for continuous joints.
    pub fn difference(&self, from: f64, to: f64) -> f64 {
        match self.joint_type {
            JointType::Continuous => get_ang_dist_2pi(from, to),
            _ => to - from,
        }
    }

    /// Absolute distance between two positions of this joint.
    pub fn distance(&self, a: f64, b: f64) -> f64 {
        self.difference(a, b).abs()
    }

    /// Interpolate between two positions of this joint.
    ///
    /// Continuous joints move along the shortest arc and are not re-wrapped, so interpolating
    /// between unwound values stays continuous.
    pub fn interpolate(&self, from: f64, to: f64, fraction: f64) -> f64 {
        from + self.difference(from, to) * fraction
    }

    /// Bring a position within the joint's limits.
    ///
    /// Bounded joints are clamped, continuous joints are wrapped into [-pi, pi).
    pub fn enforce_bounds(&self, value: f64) -> f64 {
        match (self.joint_type, self.bounds) {
            (JointType::Continuous, _) => wrap_to_pi(value),
            (_, Some((min, max))) => clamp(&value, &min, &max),
            (_, None) => value,
        }
    }

    /// Returns true if the position is within the joint's limits.
    pub fn satisfies_bounds(&self, value: f64) -> bool {
        match self.bounds {
            Some((min, max)) => value >= min && value <= max,
            None => true,
        }
    }

    /// Transform from the parent frame to this joint's child frame at the given position.
    pub fn transform(&self, value: f64) -> Isometry3<f64> {
        let motion = match self.joint_type {
            JointType::Revolute | JointType::Continuous => Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&self.axis, value),
            ),
            JointType::Prismatic => {
                let offset = self.axis.into_inner() * value;
                Isometry3::from_parts(
                    Translation3::new(offset.x, offset.y, offset.z),
                    UnitQuaternion::identity(),
                )
            }
        };

        self.origin * motion
    }
}

fn default_axis() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}
