//! Core data models for the advisory service

use serde::{Deserialize, Serialize};

/// Integer code produced by a fitted label encoder
pub type CategoryCode = i64;

/// Raw agronomic inputs for a crop recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCropQuery {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
    pub temperature: f64,
    pub ph: f64,
    pub rainfall: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irrigation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
}

impl RawCropQuery {
    /// Query with only the numeric fields set
    pub fn numeric(n: f64, p: f64, k: f64, temperature: f64, ph: f64, rainfall: f64) -> Self {
        Self {
            n,
            p,
            k,
            temperature,
            ph,
            rainfall,
            soil_type: None,
            irrigation_type: None,
            season: None,
            crop_type: None,
        }
    }

    /// Informational fields, echoed back but never fed to the classifier
    pub fn additional_info(&self) -> AdditionalInfo {
        AdditionalInfo {
            soil_type: self.soil_type.clone(),
            irrigation_type: self.irrigation_type.clone(),
            season: self.season.clone(),
            crop_type: self.crop_type.clone(),
        }
    }
}

/// Optional categorical metadata attached to a crop query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    pub soil_type: Option<String>,
    pub irrigation_type: Option<String>,
    pub season: Option<String>,
    pub crop_type: Option<String>,
}

/// Feature layout the crop classifier was trained on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSchema {
    /// (N, P, K, temperature, pH, rainfall)
    Basic,
    /// (N, P, K, temperature, pH, rainfall, soil_quality)
    #[default]
    SoilQualityAugmented,
}

impl FeatureSchema {
    const BASIC: &'static [&'static str] = &["N", "P", "K", "temperature", "ph", "rainfall"];
    const AUGMENTED: &'static [&'static str] =
        &["N", "P", "K", "temperature", "ph", "rainfall", "soil_quality"];

    /// Column names in model input order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            FeatureSchema::Basic => Self::BASIC,
            FeatureSchema::SoilQualityAugmented => Self::AUGMENTED,
        }
    }

    pub fn len(&self) -> usize {
        self.columns().len()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureSchema::Basic => "basic",
            FeatureSchema::SoilQualityAugmented => "soil_quality_augmented",
        }
    }
}

/// How rainfall is treated before it reaches the classifier.
///
/// Training divided the rainfall column by 100 while the serving path passed
/// the raw millimetre value through. `Raw` keeps the serving behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainfallScaling {
    #[default]
    Raw,
    Hundredths,
}

impl RainfallScaling {
    pub fn apply(&self, rainfall: f64) -> f64 {
        match self {
            RainfallScaling::Raw => rainfall,
            RainfallScaling::Hundredths => rainfall / 100.0,
        }
    }
}

/// Fixed-order numeric input for the crop classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub schema: FeatureSchema,
    pub values: Vec<f64>,
    pub soil_quality: f64,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A label with its predicted probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLabel {
    pub label: String,
    pub probability: f64,
}

/// Top-K labels, descending by probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    pub entries: Vec<ScoredLabel>,
    /// Maximum probability over every class, not only the top K
    pub confidence: f64,
}

impl RankedPrediction {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Inputs to the water-use advisory model, named as the public API names them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterUseQuery {
    /// mm/year
    #[serde(rename = "Rainfall_Requirement")]
    pub rainfall_requirement: f64,
    /// °C
    #[serde(rename = "Temperature_Requirement")]
    pub temperature_requirement: f64,
    #[serde(rename = "Soil_Type")]
    pub soil_type: String,
    #[serde(rename = "Irrigation_Type")]
    pub irrigation_type: String,
    #[serde(rename = "Water_Scarcity")]
    pub water_scarcity: String,
    /// tons/ha
    #[serde(rename = "Yield")]
    pub yield_tons_per_ha: f64,
    /// days
    #[serde(rename = "Crop_Cycle_Duration")]
    pub crop_cycle_duration: f64,
    #[serde(rename = "Crop_Name")]
    pub crop_name: String,
}

/// Raw regression output of the water-use model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterUseEstimate {
    /// m³ per kg
    pub water_use: f64,
    /// °C
    pub temperature_requirement: f64,
    /// mm/year
    pub rainfall_requirement: f64,
}
