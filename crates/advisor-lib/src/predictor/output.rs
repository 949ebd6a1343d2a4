//! Prediction output formatting
//!
//! Turns ranked crops and raw regression values into the strings the API
//! returns to callers.

use crate::error::PredictionError;
use crate::models::{RankedPrediction, WaterUseEstimate};
use serde::{Deserialize, Serialize};

/// Separator placed between recommended crop labels
pub const LABEL_SEPARATOR: &str = " | ";

/// Number of regression outputs of the water-use model
pub const WATER_USE_OUTPUTS: usize = 3;

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Text between labels in the combined crop string
    pub label_separator: String,
    /// Decimal places of the water-use strings
    pub precision: usize,
    /// Confidence below which a recommendation is flagged
    pub low_confidence_threshold: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            label_separator: LABEL_SEPARATOR.to_string(),
            precision: 2,
            low_confidence_threshold: 0.5,
        }
    }
}

/// Water-use estimate rendered with units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedWaterUse {
    pub predicted_water_use: String,
    pub predicted_temperature_requirement: String,
    pub predicted_rainfall_requirement: String,
}

/// Formats model outputs for presentation
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    config: OutputConfig,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Top-K labels joined into one string
    pub fn join_labels(&self, ranked: &RankedPrediction) -> String {
        ranked
            .labels()
            .collect::<Vec<_>>()
            .join(&self.config.label_separator)
    }

    /// Interpret raw regressor output as [water_use, temperature, rainfall]
    pub fn water_use_estimate(&self, raw: &[f64]) -> Result<WaterUseEstimate, PredictionError> {
        match raw {
            [water_use, temperature_requirement, rainfall_requirement, ..] => Ok(WaterUseEstimate {
                water_use: *water_use,
                temperature_requirement: *temperature_requirement,
                rainfall_requirement: *rainfall_requirement,
            }),
            _ => Err(PredictionError::OutputShape {
                expected: WATER_USE_OUTPUTS,
                actual: raw.len(),
            }),
        }
    }

    pub fn format_water_use(&self, estimate: &WaterUseEstimate) -> FormattedWaterUse {
        let p = self.config.precision;
        FormattedWaterUse {
            predicted_water_use: format!("{:.*} m³ per kg", p, estimate.water_use),
            predicted_temperature_requirement: format!(
                "{:.*} °C",
                p, estimate.temperature_requirement
            ),
            predicted_rainfall_requirement: format!(
                "{:.*} mm/year",
                p, estimate.rainfall_requirement
            ),
        }
    }

    /// Check if a ranking has low confidence
    pub fn is_low_confidence(&self, ranked: &RankedPrediction) -> bool {
        ranked.confidence < self.config.low_confidence_threshold
    }
}
