//! API client for communicating with the advisory service

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// API client for the advisory service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// The base URL may carry a path prefix; endpoints are resolved below it.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let mut base_url = Url::parse(base_url).context("Invalid API URL")?;
        // `Url::join` replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    /// Make a GET request, returning the status alongside the body
    ///
    /// Health probes answer 503 with a meaningful body, so the status is not
    /// treated as an error here.
    pub async fn get_with_status<T: DeserializeOwned>(&self, path: &str) -> Result<(u16, T)> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status().as_u16();
        let body = response.json().await.context("Failed to parse response")?;
        Ok((status, body))
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        parse_response(response).await
    }
}

/// Decode a successful body, or surface the service's in-band `error` field
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        anyhow::bail!("API error ({}): {}", status, message);
    }

    response.json().await.context("Failed to parse response")
}

// API request and response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropRequest {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
    pub temperature: f64,
    pub ph: f64,
    pub rainfall: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irrigation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredLabel {
    pub label: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropRecommendation {
    pub predicted_crop: String,
    pub top_predictions: Vec<ScoredLabel>,
    pub confidence: f64,
    #[serde(default)]
    pub low_confidence: bool,
    pub soil_quality: f64,
    #[serde(default)]
    pub feature_schema: Option<String>,
    #[serde(default)]
    pub additional_info: HashMap<String, Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterUseRequest {
    #[serde(rename = "Rainfall_Requirement")]
    pub rainfall_requirement: f64,
    #[serde(rename = "Temperature_Requirement")]
    pub temperature_requirement: f64,
    #[serde(rename = "Soil_Type")]
    pub soil_type: String,
    #[serde(rename = "Irrigation_Type")]
    pub irrigation_type: String,
    #[serde(rename = "Water_Scarcity")]
    pub water_scarcity: String,
    #[serde(rename = "Yield")]
    pub yield_tons_per_ha: f64,
    #[serde(rename = "Crop_Cycle_Duration")]
    pub crop_cycle_duration: f64,
    #[serde(rename = "Crop_Name")]
    pub crop_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterUseAdvice {
    pub predicted_water_use: String,
    pub predicted_temperature_requirement: String,
    pub predicted_rainfall_requirement: String,
    #[serde(default)]
    pub degraded: bool,
    #[serde(default)]
    pub unseen_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
