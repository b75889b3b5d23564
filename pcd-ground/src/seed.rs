use pcd_core::pointcloud::{geometry::Axis, point::Point};

/// Average height of the first `num_lpr` points.
///
/// `points` must already be sorted ascending along `height_axis`. Shorter
/// inputs are averaged over what is available; an empty input gives 0.
pub fn lowest_point_representative(points: &[Point], num_lpr: usize, height_axis: Axis) -> f64 {
    let lowest = &points[..num_lpr.min(points.len())];
    if lowest.is_empty() {
        return 0.0;
    }
    let sum: f64 = lowest.iter().map(|p| height_axis.coordinate(p)).sum();
    sum / lowest.len() as f64
}

/// Initial seeds: every point strictly lower than `LPR + seed_threshold`.
///
/// The result keeps the input order and may be empty.
pub fn extract_initial_seeds(
    points: &[Point],
    num_lpr: usize,
    seed_threshold: f64,
    height_axis: Axis,
) -> Vec<Point> {
    let lpr = lowest_point_representative(points, num_lpr, height_axis);
    log::trace!("lowest point representative: {}", lpr);

    points
        .iter()
        .filter(|p| height_axis.coordinate(p) < lpr + seed_threshold)
        .cloned()
        .collect()
}
