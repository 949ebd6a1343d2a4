//! Water-use advisory: categorical encoding, scaling and regression

use super::encoding::{CategoryEncoding, LabelEncoder};
use super::features::WaterUseFeatures;
use super::output::{FormattedWaterUse, OutputFormatter};
use super::scaler::StandardScaler;
use super::Regressor;
use crate::error::PredictionError;
use crate::models::{WaterUseEstimate, WaterUseQuery};
use serde::{Deserialize, Serialize};

/// Result of one water-use prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterUseAdvice {
    #[serde(flatten)]
    pub formatted: FormattedWaterUse,
    pub estimate: WaterUseEstimate,
    /// True when at least one categorical input was out of vocabulary
    pub degraded: bool,
    /// Request fields that were encoded with the sentinel code
    pub unseen_categories: Vec<String>,
    pub input_data: WaterUseQuery,
}

/// Owns the regressor together with its fitted encoder and scaler
pub struct WaterUseAdvisor {
    regressor: Box<dyn Regressor>,
    encoder: LabelEncoder,
    scaler: StandardScaler,
    formatter: OutputFormatter,
}

impl WaterUseAdvisor {
    pub fn new(regressor: Box<dyn Regressor>, encoder: LabelEncoder, scaler: StandardScaler) -> Self {
        Self {
            regressor,
            encoder,
            scaler,
            formatter: OutputFormatter::new(),
        }
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    /// Encode categoricals, falling back to the sentinel for unseen values
    pub fn encode(&self, query: &WaterUseQuery) -> (WaterUseFeatures, CategoryEncoding) {
        let mut encoding = CategoryEncoding::new();
        let features = WaterUseFeatures {
            rainfall_requirement: query.rainfall_requirement,
            temperature_requirement: query.temperature_requirement,
            soil_type: encoding.encode(&self.encoder, "Soil_Type", &query.soil_type),
            irrigation_type: encoding.encode(&self.encoder, "Irrigation_Type", &query.irrigation_type),
            water_scarcity: encoding.encode(&self.encoder, "Water_Scarcity", &query.water_scarcity),
            yield_tons_per_ha: query.yield_tons_per_ha,
            crop_cycle_duration: query.crop_cycle_duration,
            crop_name: encoding.encode(&self.encoder, "Crop_Name", &query.crop_name),
        };
        (features, encoding)
    }

    pub fn advise(&self, query: &WaterUseQuery) -> Result<WaterUseAdvice, PredictionError> {
        let (features, encoding) = self.encode(query);
        let scaled = self.scaler.transform(&features.to_vec())?;

        let expected = self.regressor.n_features();
        if scaled.len() != expected {
            return Err(PredictionError::FeatureMismatch {
                expected,
                actual: scaled.len(),
            });
        }

        let raw = self.regressor.predict(&scaled)?;
        let estimate = self.formatter.water_use_estimate(&raw)?;

        Ok(WaterUseAdvice {
            formatted: self.formatter.format_water_use(&estimate),
            estimate,
            degraded: encoding.is_degraded(),
            unseen_categories: encoding.into_unseen(),
            input_data: query.clone(),
        })
    }
}
