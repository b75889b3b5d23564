use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

/// Classification written onto a point.
///
/// `0` means the point has not been classified. The ground class keeps the
/// value used by the scans this tool was tuned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub u32);

impl Label {
    pub const UNLABELED: Label = Label(0);
    pub const GROUND: Label = Label(4);

    pub fn is_unlabeled(&self) -> bool {
        *self == Self::UNLABELED
    }

    pub fn is_ground(&self) -> bool {
        *self == Self::GROUND
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub intensity: f64,
    pub range: f64,
    pub label: Label,
    // Originating beam/line or record ordinal. Only used to restore scan order.
    pub sequence_index: u64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Default::default()
        }
    }

    pub fn with_sequence_index(mut self, sequence_index: u64) -> Self {
        self.sequence_index = sequence_index;
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = label;
        self
    }
}

#[derive(Debug, Clone)]
pub struct PointCloud {
    pub points: Vec<Point>,
    pub metadata: Metadata,
}

impl PointCloud {
    pub fn new(points: Vec<Point>) -> Self {
        let mut bounding_volume = BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        };

        for point in &points {
            bounding_volume.max[0] = bounding_volume.max[0].max(point.x);
            bounding_volume.max[1] = bounding_volume.max[1].max(point.y);
            bounding_volume.max[2] = bounding_volume.max[2].max(point.z);
            bounding_volume.min[0] = bounding_volume.min[0].min(point.x);
            bounding_volume.min[1] = bounding_volume.min[1].min(point.y);
            bounding_volume.min[2] = bounding_volume.min[2].min(point.z);
        }

        if points.is_empty() {
            bounding_volume = BoundingVolume::default();
        }

        let metadata = Metadata {
            point_count: points.len(),
            bounding_volume,
            other: HashMap::new(),
        };

        PointCloud { points, metadata }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn ground_count(&self) -> usize {
        self.points.iter().filter(|p| p.label.is_ground()).count()
    }

    /// Splits the cloud into (ground, non-ground) point lists, keeping order.
    pub fn partition_by_ground(&self) -> (Vec<Point>, Vec<Point>) {
        self.points.iter().cloned().partition(|p| p.label.is_ground())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub point_count: usize,
    pub bounding_volume: BoundingVolume,
    pub other: HashMap<String, String>,
}
