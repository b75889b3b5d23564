use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GroundError {
    #[error("no seed points below the lowest point representative threshold")]
    EmptySeedSet,
    #[error("cannot estimate a plane normal from {points} point(s)")]
    DegenerateCovariance { points: usize },
    #[error("singular value decomposition did not produce left singular vectors")]
    Decomposition,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
