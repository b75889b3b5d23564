//! Ground labeling for range-sensor point clouds.
//!
//! A scan is cut into segments along one horizontal axis. In every segment the
//! lowest points seed a plane fit (PCA on the seed covariance), the fit is
//! refined a fixed number of times, and the points under the final plane are
//! labeled as ground.

pub mod config;
pub mod dispersion;
pub mod error;
pub mod normal;
pub mod refiner;
pub mod runner;
pub mod seed;
pub mod segment;

pub use config::GroundConfig;
pub use dispersion::CenteringMethod;
pub use error::GroundError;
pub use refiner::{PlaneFit, PlaneModel, PlaneRefiner};
pub use runner::{GroundLabeler, Labeler};
pub use segment::{label_ground, label_ground_with_report, LabelReport, SegmentReport};
