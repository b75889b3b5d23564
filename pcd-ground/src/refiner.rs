use nalgebra::Vector3;
use pcd_core::pointcloud::{
    geometry::{signed_projection, Axis},
    point::{Label, Point},
};

use crate::{
    config::GroundConfig, dispersion::CenteringMethod, error::GroundError,
    normal::estimate_plane_normal,
};

/// Plane `normal · p + d = 0` fitted to a seed set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneModel {
    pub normal: Vector3<f64>,
    pub d: f64,
}

impl PlaneModel {
    pub fn fit(
        seeds: &[Point],
        centering: CenteringMethod,
        up: Axis,
    ) -> Result<Self, GroundError> {
        let center = centering.center(seeds);
        let normal = estimate_plane_normal(seeds, &center, up)?;
        let d = -normal.dot(&center);
        Ok(Self { normal, d })
    }

    /// Upper bound on `signed_projection` for a point to count as ground.
    ///
    /// The offset is folded into the threshold instead of the projection, so
    /// the comparison is `n · p < base - d`.
    pub fn threshold(&self, base: f64) -> f64 {
        base - self.d
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaneFit {
    pub plane: PlaneModel,
    pub threshold: f64,
    /// Seeds the final plane was fitted on.
    pub seed_count: usize,
    /// Points that were unlabeled and got the ground label.
    pub ground_count: usize,
}

#[derive(Debug, Clone)]
pub struct PlaneRefiner {
    pub num_iters: usize,
    pub distance_threshold: f64,
    pub centering: CenteringMethod,
    pub height_axis: Axis,
}

impl PlaneRefiner {
    pub fn from_config(config: &GroundConfig) -> Self {
        Self {
            num_iters: config.num_iters,
            distance_threshold: config.distance_threshold,
            centering: config.centering,
            height_axis: config.height_axis,
        }
    }

    /// Refines a ground plane for `segment`, starting from `seeds`.
    ///
    /// Each round fits a plane on the current seeds and replaces the seeds with
    /// every segment point under the new threshold. After the last round the
    /// unlabeled points under the threshold are labeled ground. Labels are only
    /// written once the final plane exists, so an error leaves `segment`
    /// untouched.
    pub fn refine(&self, segment: &mut [Point], seeds: Vec<Point>) -> Result<PlaneFit, GroundError> {
        if seeds.is_empty() {
            return Err(GroundError::EmptySeedSet);
        }

        let mut seeds = seeds;
        let mut plane = self.fit(&seeds, 1)?;

        for iteration in 2..=self.num_iters {
            let threshold = plane.threshold(self.distance_threshold);
            seeds = segment
                .iter()
                .filter(|p| signed_projection(p, &plane.normal) < threshold)
                .cloned()
                .collect();
            plane = self.fit(&seeds, iteration)?;
        }

        let threshold = plane.threshold(self.distance_threshold);
        let mut ground_count = 0;
        for point in segment.iter_mut() {
            if signed_projection(point, &plane.normal) < threshold && point.label.is_unlabeled() {
                point.label = Label::GROUND;
                ground_count += 1;
            }
        }

        Ok(PlaneFit {
            plane,
            threshold,
            seed_count: seeds.len(),
            ground_count,
        })
    }

    fn fit(&self, seeds: &[Point], iteration: usize) -> Result<PlaneModel, GroundError> {
        let plane = PlaneModel::fit(seeds, self.centering, self.height_axis)?;
        log::debug!(
            "iteration {}/{}: {} seeds, threshold {:.4}",
            iteration,
            self.num_iters,
            seeds.len(),
            plane.threshold(self.distance_threshold)
        );
        Ok(plane)
    }
}
