use pcd_core::pointcloud::point::PointCloud;

use crate::{
    config::GroundConfig,
    error::GroundError,
    segment::{label_ground_with_report, LabelReport},
};

pub trait Labeler {
    fn label(&self, point_cloud: PointCloud) -> Result<(PointCloud, LabelReport), GroundError>;
}

pub struct GroundLabeler {
    config: GroundConfig,
}

impl GroundLabeler {
    pub fn new(config: GroundConfig) -> Result<Self, GroundError> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Labeler for GroundLabeler {
    fn label(&self, point_cloud: PointCloud) -> Result<(PointCloud, LabelReport), GroundError> {
        let metadata = point_cloud.metadata;
        let (points, report) = label_ground_with_report(point_cloud.points, &self.config)?;

        let mut labeled = PointCloud::new(points);
        labeled.metadata.other = metadata.other;
        labeled
            .metadata
            .other
            .insert("ground_points".to_string(), report.ground_count.to_string());

        Ok((labeled, report))
    }
}
