use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::pointcloud::point::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn coordinate(&self, point: &Point) -> f64 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
            Axis::Z => point.z,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl std::str::FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(format!("unknown axis '{}'", other)),
        }
    }
}

pub fn to_vector(point: &Point) -> Vector3<f64> {
    Vector3::new(point.x, point.y, point.z)
}

/// Inner product of the point's position and `normal`.
///
/// This is not a normalized point-to-plane distance: the plane offset is not
/// subtracted here. Compare it against a threshold that already folds the
/// offset in.
pub fn signed_projection(point: &Point, normal: &Vector3<f64>) -> f64 {
    to_vector(point).dot(normal)
}
