use nalgebra::{Matrix3, Vector3, SVD};
use pcd_core::pointcloud::{geometry::Axis, point::Point};

use crate::error::GroundError;

/// Minimum number of points that can span a plane.
pub const MIN_PLANE_POINTS: usize = 3;

/// Sample covariance of `points` around `center`, normalized by the point count.
pub fn covariance(points: &[Point], center: &Vector3<f64>) -> Matrix3<f64> {
    let (mut xx, mut yy, mut zz, mut xy, mut xz, mut yz) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    for p in points {
        let dx = p.x - center.x;
        let dy = p.y - center.y;
        let dz = p.z - center.z;
        xx += dx * dx;
        yy += dy * dy;
        zz += dz * dz;
        xy += dx * dy;
        xz += dx * dz;
        yz += dy * dz;
    }

    #[rustfmt::skip]
    let cov = Matrix3::new(
        xx, xy, xz,
        xy, yy, yz,
        xz, yz, zz,
    );

    if points.is_empty() {
        cov
    } else {
        cov / points.len() as f64
    }
}

/// Estimates the plane normal as the direction of least spread of `points`.
///
/// The covariance matrix is decomposed with an SVD and the left singular vector
/// of the smallest singular value is returned. Singular vectors have no
/// intrinsic sign, so the result is flipped to point along `up`.
pub fn estimate_plane_normal(
    points: &[Point],
    center: &Vector3<f64>,
    up: Axis,
) -> Result<Vector3<f64>, GroundError> {
    if points.len() < MIN_PLANE_POINTS {
        return Err(GroundError::DegenerateCovariance {
            points: points.len(),
        });
    }

    let cov = covariance(points, center);
    let SVD {
        u,
        singular_values: s,
        ..
    } = SVD::new(cov, true, false);
    let u = u.ok_or(GroundError::Decomposition)?;

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| s[b].total_cmp(&s[a]));
    let (largest, middle, smallest) = (order[0], order[1], order[2]);

    // collinear or coincident points do not define a plane
    if s[middle] <= f64::EPSILON * s[largest] || s[largest] == 0.0 {
        return Err(GroundError::DegenerateCovariance {
            points: points.len(),
        });
    }

    let mut normal: Vector3<f64> = u.column(smallest).into_owned();
    if normal[up.index()] < 0.0 {
        normal = -normal;
    }
    Ok(normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispersion::center_by_mean;

    fn tilted_plane() -> Vec<Point> {
        // z = 0.5 * x
        let mut points = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                let x = i as f64;
                let y = j as f64;
                points.push(Point::new(x, y, 0.5 * x));
            }
        }
        points
    }

    #[test]
    fn covariance_is_symmetric_and_normalized() {
        let points = vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(-1.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
            Point::new(0.0, -2.0, 0.0),
        ];
        let cov = covariance(&points, &Vector3::zeros());
        assert_eq!(cov[(0, 0)], 0.5);
        assert_eq!(cov[(1, 1)], 2.0);
        assert_eq!(cov[(2, 2)], 0.0);
        assert_eq!(cov, cov.transpose());
    }

    #[test]
    fn horizontal_floor_has_vertical_normal() {
        let mut points = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                points.push(Point::new(i as f64, j as f64, 1.0));
            }
        }
        let center = center_by_mean(&points);
        let normal = estimate_plane_normal(&points, &center, Axis::Z).unwrap();
        assert!((normal - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn tilted_plane_normal_is_orthogonal_to_the_plane() {
        let points = tilted_plane();
        let center = center_by_mean(&points);
        let normal = estimate_plane_normal(&points, &center, Axis::Z).unwrap();

        let expected = Vector3::new(-0.5, 0.0, 1.0).normalize();
        assert!((normal - expected).norm() < 1e-9);
        assert!((normal.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normal_points_along_the_up_axis() {
        let points = tilted_plane();
        let center = center_by_mean(&points);
        let normal = estimate_plane_normal(&points, &center, Axis::X).unwrap();
        assert!(normal.x >= 0.0);
    }

    #[test]
    fn fewer_than_three_points_is_degenerate() {
        let points = vec![Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 0.0)];
        let center = center_by_mean(&points);
        assert_eq!(
            estimate_plane_normal(&points, &center, Axis::Z),
            Err(GroundError::DegenerateCovariance { points: 2 })
        );
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let points: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 0.0, 0.0)).collect();
        let center = center_by_mean(&points);
        assert!(matches!(
            estimate_plane_normal(&points, &center, Axis::Z),
            Err(GroundError::DegenerateCovariance { points: 10 })
        ));
    }
}
