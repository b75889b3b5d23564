use std::path::PathBuf;

use pcd_exporter::ExportError;
use pcd_ground::GroundError;
use pcd_parser::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no input files found")]
    NoInputs,
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration file: {0}")]
    Config(#[from] serde_json::Error),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Ground(#[from] GroundError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
