use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimatorError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("model artifact not found at {0:?}")]
    ArtifactMissing(PathBuf),
    #[error("model artifact error: {0}")]
    Artifact(String),
    #[error("dataset error: {0}")]
    Dataset(String),
    #[error("training error: {0}")]
    Training(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("empty training set")]
    EmptyTrainingSet,
    #[error("feature/target length mismatch: {features} rows vs {targets} targets")]
    LengthMismatch { features: usize, targets: usize },
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
