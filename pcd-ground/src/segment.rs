use pcd_core::pointcloud::{geometry::Axis, point::Point};
use rayon::prelude::*;

use crate::{
    config::GroundConfig,
    error::GroundError,
    refiner::{PlaneFit, PlaneRefiner},
    seed::extract_initial_seeds,
};

#[derive(Debug, Clone)]
pub struct SegmentReport {
    pub index: usize,
    /// Points in the segment, noise included.
    pub point_count: usize,
    /// Points set aside under the noise floor.
    pub noise_count: usize,
    pub fit: Option<PlaneFit>,
    /// Why no plane was fitted, if none was.
    pub skipped: Option<GroundError>,
}

impl SegmentReport {
    pub fn ground_count(&self) -> usize {
        self.fit.as_ref().map_or(0, |fit| fit.ground_count)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LabelReport {
    pub point_count: usize,
    pub ground_count: usize,
    pub segments: Vec<SegmentReport>,
}

impl LabelReport {
    pub fn skipped_segments(&self) -> usize {
        self.segments.iter().filter(|s| s.skipped.is_some()).count()
    }
}

/// Stable ascending sort along `axis`.
pub fn sort_by_axis(points: &mut [Point], axis: Axis) {
    points.sort_by(|a, b| axis.coordinate(a).total_cmp(&axis.coordinate(b)));
}

/// Splits `points` into at most `num_segments` contiguous chunks.
///
/// Every chunk gets `len / count` points and the last one also takes the
/// remainder. A scan shorter than `num_segments` gets one point per chunk.
pub fn partition(points: Vec<Point>, num_segments: usize) -> Vec<Vec<Point>> {
    let count = num_segments.min(points.len()).max(1);
    let base = points.len() / count;

    let mut segments = Vec::with_capacity(count);
    let mut rest = points;
    for _ in 1..count {
        let tail = rest.split_off(base);
        segments.push(rest);
        rest = tail;
    }
    segments.push(rest);
    segments
}

/// Splits a height-sorted segment into (noise, remaining) at `floor`.
pub fn split_noise(
    mut sorted: Vec<Point>,
    floor: Option<f64>,
    height_axis: Axis,
) -> (Vec<Point>, Vec<Point>) {
    let Some(floor) = floor else {
        return (Vec::new(), sorted);
    };
    let cut = sorted.partition_point(|p| height_axis.coordinate(p) < floor);
    let remaining = sorted.split_off(cut);
    (sorted, remaining)
}

/// Labels the ground of a single segment.
///
/// The returned points are the segment sorted by height, followed by the noise
/// points that were set aside. A segment without a usable plane comes back
/// unlabeled.
pub fn label_segment(
    index: usize,
    mut segment: Vec<Point>,
    config: &GroundConfig,
) -> (Vec<Point>, SegmentReport) {
    let point_count = segment.len();
    sort_by_axis(&mut segment, config.height_axis);
    let (noise, mut points) = split_noise(segment, config.noise_floor, config.height_axis);

    let seeds = extract_initial_seeds(
        &points,
        config.num_lpr,
        config.seed_threshold,
        config.height_axis,
    );
    let refiner = PlaneRefiner::from_config(config);

    let (fit, skipped) = match refiner.refine(&mut points, seeds) {
        Ok(fit) => {
            log::debug!(
                "segment {}: {} of {} points labeled ground",
                index,
                fit.ground_count,
                point_count
            );
            (Some(fit), None)
        }
        Err(e) => {
            log::warn!("segment {}: no ground plane ({}), left unlabeled", index, e);
            (None, Some(e))
        }
    };

    let report = SegmentReport {
        index,
        point_count,
        noise_count: noise.len(),
        fit,
        skipped,
    };

    points.extend(noise);
    (points, report)
}

/// Labels the ground points of a scan.
///
/// The output holds every input point, in input order as given by
/// `sequence_index`. Only configuration errors are returned; a segment where no
/// plane can be fitted is passed through unlabeled.
pub fn label_ground(points: Vec<Point>, config: &GroundConfig) -> Result<Vec<Point>, GroundError> {
    label_ground_with_report(points, config).map(|(points, _)| points)
}

pub fn label_ground_with_report(
    mut points: Vec<Point>,
    config: &GroundConfig,
) -> Result<(Vec<Point>, LabelReport), GroundError> {
    config.validate()?;

    let point_count = points.len();
    sort_by_axis(&mut points, config.partition_axis);
    let segments = partition(points, config.num_segments);

    let results: Vec<(Vec<Point>, SegmentReport)> = if config.parallel {
        segments
            .into_par_iter()
            .enumerate()
            .map(|(index, segment)| label_segment(index, segment, config))
            .collect()
    } else {
        segments
            .into_iter()
            .enumerate()
            .map(|(index, segment)| label_segment(index, segment, config))
            .collect()
    };

    let mut labeled = Vec::with_capacity(point_count);
    let mut reports = Vec::with_capacity(results.len());
    for (points, report) in results {
        labeled.extend(points);
        reports.push(report);
    }
    labeled.sort_by_key(|p| p.sequence_index);

    let report = LabelReport {
        point_count,
        ground_count: reports.iter().map(SegmentReport::ground_count).sum(),
        segments: reports,
    };
    Ok((labeled, report))
}
