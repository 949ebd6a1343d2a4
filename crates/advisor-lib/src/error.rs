//! Error types shared across the advisory library

use std::path::PathBuf;
use thiserror::Error;

/// Per-request prediction failure. Reported to the caller, never fatal.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("feature vector has {actual} values, model expects {expected}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("model returned {probabilities} probabilities for {classes} classes")]
    ClassCountMismatch { classes: usize, probabilities: usize },

    #[error("model returned non-finite probability {value} for class {label}")]
    NonFiniteProbability { label: String, value: f64 },

    #[error("model returned {actual} outputs, expected at least {expected}")]
    OutputShape { expected: usize, actual: usize },

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Failure while loading the model artifact bundle. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path:?}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("checksum mismatch for {path:?}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("invalid model {path:?}: {reason}")]
    InvalidModel { path: PathBuf, reason: String },

    #[error("invalid artifact bundle: {0}")]
    Invalid(String),
}
