//! Observability infrastructure for the advisory service
//!
//! Provides:
//! - Prometheus metrics (request latency, prediction outcomes, unseen categories, model version)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter_vec, GaugeVec, HistogramVec,
    IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Endpoint labels used across metrics
pub mod endpoints {
    pub const CROP: &str = "crop";
    pub const WATER_USE: &str = "water_use";
}

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct ServiceMetricsInner {
    request_latency_seconds: HistogramVec,
    predictions: IntCounterVec,
    validation_errors: IntCounterVec,
    prediction_errors: IntCounterVec,
    unseen_categories: IntCounterVec,
    model_info: GaugeVec,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            request_latency_seconds: register_histogram_vec!(
                "agri_advisor_request_latency_seconds",
                "Time spent serving a prediction request",
                &["endpoint"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register request_latency_seconds"),

            predictions: register_int_counter_vec!(
                "agri_advisor_predictions_total",
                "Successful predictions served",
                &["endpoint"]
            )
            .expect("Failed to register predictions_total"),

            validation_errors: register_int_counter_vec!(
                "agri_advisor_validation_errors_total",
                "Requests rejected before feature assembly",
                &["endpoint"]
            )
            .expect("Failed to register validation_errors_total"),

            prediction_errors: register_int_counter_vec!(
                "agri_advisor_prediction_errors_total",
                "Requests that failed inside the model pipeline",
                &["endpoint"]
            )
            .expect("Failed to register prediction_errors_total"),

            unseen_categories: register_int_counter_vec!(
                "agri_advisor_unseen_categories_total",
                "Categorical inputs encoded with the out-of-vocabulary sentinel",
                &["field"]
            )
            .expect("Failed to register unseen_categories_total"),

            model_info: register_gauge_vec!(
                "agri_advisor_model_info",
                "Information about the loaded model artifacts",
                &["version", "feature_schema"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new)
    }

    pub fn observe_request_latency(&self, endpoint: &str, duration_secs: f64) {
        self.inner()
            .request_latency_seconds
            .with_label_values(&[endpoint])
            .observe(duration_secs);
    }

    pub fn inc_predictions(&self, endpoint: &str) {
        self.inner().predictions.with_label_values(&[endpoint]).inc();
    }

    pub fn inc_validation_errors(&self, endpoint: &str) {
        self.inner().validation_errors.with_label_values(&[endpoint]).inc();
    }

    pub fn inc_prediction_errors(&self, endpoint: &str) {
        self.inner().prediction_errors.with_label_values(&[endpoint]).inc();
    }

    pub fn inc_unseen_category(&self, field: &str) {
        self.inner().unseen_categories.with_label_values(&[field]).inc();
    }

    /// Update model version info
    pub fn set_model_info(&self, version: &str, feature_schema: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[version, feature_schema])
            .set(1.0);
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for predictions, degraded
/// inputs and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn log_crop_recommendation(
        &self,
        predicted_crop: &str,
        confidence: f64,
        soil_quality: f64,
        model_version: &str,
    ) {
        info!(
            event = "crop_recommended",
            service = %self.service_name,
            predicted_crop = %predicted_crop,
            confidence = confidence,
            soil_quality = soil_quality,
            model_version = %model_version,
            "Generated crop recommendation"
        );
    }

    pub fn log_water_use(&self, crop_name: &str, water_use: f64, degraded: bool, model_version: &str) {
        info!(
            event = "water_use_predicted",
            service = %self.service_name,
            crop_name = %crop_name,
            water_use_m3_per_kg = water_use,
            degraded = degraded,
            model_version = %model_version,
            "Generated water-use advice"
        );
    }

    /// Log inputs that were encoded with the sentinel code
    pub fn log_degraded_prediction(&self, endpoint: &str, unseen_fields: &[String]) {
        warn!(
            event = "degraded_prediction",
            service = %self.service_name,
            endpoint = %endpoint,
            unseen_fields = ?unseen_fields,
            "Prediction used out-of-vocabulary sentinel codes"
        );
    }

    pub fn log_prediction_failure(&self, endpoint: &str, reason: &str) {
        warn!(
            event = "prediction_failed",
            service = %self.service_name,
            endpoint = %endpoint,
            reason = %reason,
            "Prediction request failed"
        );
    }

    pub fn log_startup(&self, version: &str, model_version: &str) {
        info!(
            event = "service_started",
            service = %self.service_name,
            service_version = %version,
            model_version = %model_version,
            "Advisory service started"
        );
    }

    pub fn log_startup_failure(&self, reason: &str) {
        error!(
            event = "startup_failed",
            service = %self.service_name,
            reason = %reason,
            "Failed to load model artifacts, aborting"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "Advisory service shutting down"
        );
    }
}
