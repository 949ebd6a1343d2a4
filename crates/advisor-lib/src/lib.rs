//! Agricultural advisory library
//!
//! This crate provides the core functionality for:
//! - Crop recommendation from soil and climate inputs (feature assembly, top-K ranking)
//! - Water-use advisory with out-of-vocabulary tolerant label encoding
//! - Loading trained ONNX artifacts
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod store;

pub use error::{ArtifactError, PredictionError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use store::{ArtifactManifest, ModelStore};
