use pcd_core::pointcloud::geometry::Axis;
use serde::{Deserialize, Serialize};

use crate::{dispersion::CenteringMethod, error::GroundError};

/// Elevation below which points are treated as mirror-reflection noise.
pub const DEFAULT_NOISE_FLOOR: f64 = -3.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Number of lowest points averaged into the lowest point representative.
    pub num_lpr: usize,
    /// Number of partitions along `partition_axis`.
    pub num_segments: usize,
    /// Number of plane estimation rounds per segment.
    pub num_iters: usize,
    /// Height above the LPR under which a point becomes an initial seed.
    pub seed_threshold: f64,
    /// Base tolerance of the plane distance test.
    pub distance_threshold: f64,
    pub centering: CenteringMethod,
    pub partition_axis: Axis,
    pub height_axis: Axis,
    /// Points lower than this are set aside before fitting. `None` keeps them.
    pub noise_floor: Option<f64>,
    /// Fit segments on the rayon pool.
    pub parallel: bool,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            num_lpr: 20,
            num_segments: 1,
            num_iters: 3,
            seed_threshold: 1.2,
            distance_threshold: 0.3,
            centering: CenteringMethod::Mean,
            partition_axis: Axis::X,
            height_axis: Axis::Z,
            noise_floor: Some(DEFAULT_NOISE_FLOOR),
            parallel: true,
        }
    }
}

impl GroundConfig {
    pub fn validate(&self) -> Result<(), GroundError> {
        if self.num_segments == 0 {
            return Err(GroundError::InvalidConfig(
                "num_segments must be at least 1".to_string(),
            ));
        }
        if self.num_iters == 0 {
            return Err(GroundError::InvalidConfig(
                "num_iters must be at least 1".to_string(),
            ));
        }
        if self.partition_axis == self.height_axis {
            return Err(GroundError::InvalidConfig(format!(
                "partition axis and height axis are both {:?}",
                self.height_axis
            )));
        }
        for (name, value) in [
            ("seed_threshold", self.seed_threshold),
            ("distance_threshold", self.distance_threshold),
        ] {
            if !value.is_finite() {
                return Err(GroundError::InvalidConfig(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        if let Some(floor) = self.noise_floor {
            if floor.is_nan() {
                return Err(GroundError::InvalidConfig(
                    "noise_floor must not be NaN".to_string(),
                ));
            }
        }
        Ok(())
    }
}
