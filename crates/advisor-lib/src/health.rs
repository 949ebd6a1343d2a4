//! Model health for the liveness and readiness probes
//!
//! The artifact store reports once, when the bundle has been loaded. Each
//! prediction pipeline then reports after every request. Failures degrade
//! it until a success resets the count.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Consecutive failed predictions after which a pipeline is unhealthy
pub const UNHEALTHY_AFTER_FAILURES: u32 = 5;

/// Health status of a component, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Recent predictions failed but the pipeline still answers
    Degraded,
    /// Every one of the last [`UNHEALTHY_AFTER_FAILURES`] predictions failed
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub consecutive_failures: u32,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn new(status: ComponentStatus, message: Option<String>, consecutive_failures: u32) -> Self {
        Self {
            status,
            message,
            consecutive_failures,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    fn healthy() -> Self {
        Self::new(ComponentStatus::Healthy, None, 0)
    }

    /// State after one more failed prediction
    fn failed(previous: Option<&ComponentHealth>, reason: &str) -> Self {
        let failures = previous.map_or(0, |h| h.consecutive_failures) + 1;
        let status = if failures >= UNHEALTHY_AFTER_FAILURES {
            ComponentStatus::Unhealthy
        } else {
            ComponentStatus::Degraded
        };
        Self::new(
            status,
            Some(format!("{} consecutive failed predictions, last: {}", failures, reason)),
            failures,
        )
    }
}

/// `GET /healthz` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// The worst status of any component; healthy when none are registered
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|h| h.status)
            .max()
            .unwrap_or(ComponentStatus::Healthy)
    }
}

/// `GET /readyz` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const MODEL_STORE: &str = "model_store";
    pub const CROP_RECOMMENDER: &str = "crop_recommender";
    pub const WATER_USE_ADVISOR: &str = "water_use_advisor";
}

#[derive(Debug, Default)]
struct RegistryState {
    components: HashMap<String, ComponentHealth>,
    loaded: bool,
}

/// Shared view of model health, cloned into the API state
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully loaded artifact bundle and start serving
    pub async fn mark_loaded(&self, version: &str) {
        let mut state = self.state.write().await;
        state.components.insert(
            components::MODEL_STORE.to_string(),
            ComponentHealth::new(
                ComponentStatus::Healthy,
                Some(format!("Artifacts {} loaded", version)),
                0,
            ),
        );
        for pipeline in [components::CROP_RECOMMENDER, components::WATER_USE_ADVISOR] {
            state
                .components
                .insert(pipeline.to_string(), ComponentHealth::healthy());
        }
        state.loaded = true;
    }

    /// Record the outcome of a prediction for a pipeline component
    pub async fn report_prediction(&self, name: &str, error: Option<&str>) {
        let mut state = self.state.write().await;
        let previous = state.components.get(name);
        let next = match error {
            Some(reason) => ComponentHealth::failed(previous, reason),
            None if previous.map(|h| h.status) == Some(ComponentStatus::Healthy) => return,
            None => ComponentHealth::healthy(),
        };
        state.components.insert(name.to_string(), next);
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.state.read().await.components.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    /// Ready once artifacts are loaded, unless a pipeline keeps failing
    pub async fn readiness(&self) -> ReadinessResponse {
        let state = self.state.read().await;
        if !state.loaded {
            return ReadinessResponse {
                ready: false,
                reason: Some("Model artifacts not yet loaded".to_string()),
            };
        }

        let failing = state
            .components
            .iter()
            .find(|(_, h)| h.status == ComponentStatus::Unhealthy);
        match failing {
            Some((name, health)) => ReadinessResponse {
                ready: false,
                reason: Some(format!(
                    "{} unhealthy: {}",
                    name,
                    health.message.as_deref().unwrap_or("no detail")
                )),
            },
            None => ReadinessResponse {
                ready: true,
                reason: None,
            },
        }
    }
}
