use nalgebra::Vector3;
use pcd_core::pointcloud::point::Point;
use serde::{Deserialize, Serialize};

/// How the representative center of a seed set is computed.
///
/// The median ignores outliers but sorts every axis, so it is slower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CenteringMethod {
    #[default]
    Mean,
    Median,
}

impl CenteringMethod {
    pub fn center(&self, points: &[Point]) -> Vector3<f64> {
        match self {
            CenteringMethod::Mean => center_by_mean(points),
            CenteringMethod::Median => center_by_median(points),
        }
    }
}

impl std::str::FromStr for CenteringMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" | "means" => Ok(CenteringMethod::Mean),
            "median" | "medians" => Ok(CenteringMethod::Median),
            other => Err(format!("unknown centering method '{}'", other)),
        }
    }
}

/// Per-axis arithmetic mean. An empty slice yields the zero vector.
pub fn center_by_mean(points: &[Point]) -> Vector3<f64> {
    if points.is_empty() {
        return Vector3::zeros();
    }
    let sum = points.iter().fold(Vector3::<f64>::zeros(), |acc, p| {
        acc + Vector3::new(p.x, p.y, p.z)
    });
    sum / points.len() as f64
}

/// Per-axis median, each axis sorted independently.
pub fn center_by_median(points: &[Point]) -> Vector3<f64> {
    if points.is_empty() {
        return Vector3::zeros();
    }
    let xs = points.iter().map(|p| p.x).collect();
    let ys = points.iter().map(|p| p.y).collect();
    let zs = points.iter().map(|p| p.z).collect();
    Vector3::new(median(xs), median(ys), median(zs))
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_points() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 4.0, -1.0),
            Point::new(4.0, 2.0, 1.0),
        ];
        assert_eq!(center_by_mean(&points), Vector3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn empty_input_yields_zero_vector() {
        assert_eq!(center_by_mean(&[]), Vector3::zeros());
        assert_eq!(center_by_median(&[]), Vector3::zeros());
    }

    #[test]
    fn median_sorts_each_axis_independently() {
        let points = vec![
            Point::new(3.0, 10.0, 0.5),
            Point::new(1.0, 30.0, 0.1),
            Point::new(2.0, 20.0, 9.0),
        ];
        assert_eq!(center_by_median(&points), Vector3::new(2.0, 20.0, 0.5));
    }

    #[test]
    fn median_of_even_count_averages_middle_pair() {
        let points = vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(4.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(3.0, 0.0, 0.0),
        ];
        assert_eq!(center_by_median(&points).x, 2.5);
    }

    #[test]
    fn median_resists_outliers() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(0.0, 0.0, 0.1),
            Point::new(0.0, 0.0, 100.0),
        ];
        assert_eq!(center_by_median(&points).z, 0.1);
        assert!(center_by_mean(&points).z > 30.0);
    }

    #[test]
    fn mean_and_median_agree_on_symmetric_sets() {
        let points = vec![
            Point::new(-1.0, -2.0, -0.5),
            Point::new(1.0, 2.0, 0.5),
            Point::new(-3.0, 0.0, 0.25),
            Point::new(3.0, 0.0, -0.25),
            Point::new(0.0, 0.0, 0.0),
        ];
        let mean = CenteringMethod::Mean.center(&points);
        let median = CenteringMethod::Median.center(&points);
        assert!((mean - median).norm() < 1e-12);
    }

    #[test]
    fn parse_method_names() {
        assert_eq!("mean".parse::<CenteringMethod>(), Ok(CenteringMethod::Mean));
        assert_eq!("Medians".parse::<CenteringMethod>(), Ok(CenteringMethod::Median));
        assert!("mode".parse::<CenteringMethod>().is_err());
    }
}
