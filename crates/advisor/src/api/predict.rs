//! Prediction endpoints

use super::{ApiError, AppState};
use advisor_lib::{
    health::components,
    observability::endpoints,
    predictor::{CropRecommendation, WaterUseAdvice},
    RawCropQuery, WaterUseQuery,
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;
use std::time::Instant;

impl AppState {
    /// Count and convert a body that failed schema validation
    fn reject(&self, endpoint: &str, rejection: JsonRejection) -> ApiError {
        self.metrics.inc_validation_errors(endpoint);
        ApiError::from(rejection)
    }

    async fn record_failure(&self, endpoint: &str, component: &str, error: &ApiError) {
        let reason = error.to_string();
        self.metrics.inc_prediction_errors(endpoint);
        self.logger.log_prediction_failure(endpoint, &reason);
        self.health_registry.report_prediction(component, Some(&reason)).await;
    }
}

/// `POST /api/crop`
pub async fn crop(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawCropQuery>, JsonRejection>,
) -> Result<Json<CropRecommendation>, ApiError> {
    let Json(query) = payload.map_err(|rejection| state.reject(endpoints::CROP, rejection))?;

    let start = Instant::now();
    let result = state.store.crop().recommend(&query);
    state
        .metrics
        .observe_request_latency(endpoints::CROP, start.elapsed().as_secs_f64());

    match result {
        Ok(recommendation) => {
            state.metrics.inc_predictions(endpoints::CROP);
            state.logger.log_crop_recommendation(
                &recommendation.predicted_crop,
                recommendation.confidence,
                recommendation.soil_quality,
                state.store.version(),
            );
            state
                .health_registry
                .report_prediction(components::CROP_RECOMMENDER, None)
                .await;
            Ok(Json(recommendation))
        }
        Err(e) => {
            let error = ApiError::from(e);
            state
                .record_failure(endpoints::CROP, components::CROP_RECOMMENDER, &error)
                .await;
            Err(error)
        }
    }
}

/// `POST /api/water_use`
pub async fn water_use(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WaterUseQuery>, JsonRejection>,
) -> Result<Json<WaterUseAdvice>, ApiError> {
    let Json(query) = payload.map_err(|rejection| state.reject(endpoints::WATER_USE, rejection))?;

    let start = Instant::now();
    let result = state.store.water_use().advise(&query);
    state
        .metrics
        .observe_request_latency(endpoints::WATER_USE, start.elapsed().as_secs_f64());

    match result {
        Ok(advice) => {
            state.metrics.inc_predictions(endpoints::WATER_USE);
            if advice.degraded {
                for field in &advice.unseen_categories {
                    state.metrics.inc_unseen_category(field);
                }
                state
                    .logger
                    .log_degraded_prediction(endpoints::WATER_USE, &advice.unseen_categories);
            }
            state.logger.log_water_use(
                &query.crop_name,
                advice.estimate.water_use,
                advice.degraded,
                state.store.version(),
            );
            state
                .health_registry
                .report_prediction(components::WATER_USE_ADVISOR, None)
                .await;
            Ok(Json(advice))
        }
        Err(e) => {
            let error = ApiError::from(e);
            state
                .record_failure(endpoints::WATER_USE, components::WATER_USE_ADVISOR, &error)
                .await;
            Err(error)
        }
    }
}
