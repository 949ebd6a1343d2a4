//! Crop recommendation: feature assembly, classification and ranking

use super::features::{is_outside_training_range, FeatureAssembler};
use super::output::OutputFormatter;
use super::ranking::{rank_with, DEFAULT_TOP_K};
use super::Classifier;
use crate::error::PredictionError;
use crate::models::{AdditionalInfo, FeatureSchema, RawCropQuery, ScoredLabel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of one crop recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecommendation {
    /// Top-K labels joined with the label separator
    pub predicted_crop: String,
    pub top_predictions: Vec<ScoredLabel>,
    /// Highest class probability
    pub confidence: f64,
    pub low_confidence: bool,
    pub soil_quality: f64,
    pub feature_schema: FeatureSchema,
    pub additional_info: AdditionalInfo,
}

/// Owns the crop classifier and the settings it was trained with
pub struct CropRecommender {
    classifier: Box<dyn Classifier>,
    assembler: FeatureAssembler,
    formatter: OutputFormatter,
    top_k: usize,
}

impl CropRecommender {
    pub fn new(classifier: Box<dyn Classifier>, assembler: FeatureAssembler) -> Self {
        Self {
            classifier,
            assembler,
            formatter: OutputFormatter::new(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_formatter(mut self, formatter: OutputFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn schema(&self) -> FeatureSchema {
        self.assembler.schema()
    }

    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    pub fn recommend(&self, query: &RawCropQuery) -> Result<CropRecommendation, PredictionError> {
        if [query.n, query.p, query.k]
            .into_iter()
            .any(is_outside_training_range)
        {
            debug!(n = query.n, p = query.p, k = query.k, "Nutrients outside training range");
        }

        let features = self.assembler.assemble(query);
        let ranked = rank_with(self.classifier.as_ref(), &features, self.top_k)?;

        Ok(CropRecommendation {
            predicted_crop: self.formatter.join_labels(&ranked),
            low_confidence: self.formatter.is_low_confidence(&ranked),
            confidence: ranked.confidence,
            top_predictions: ranked.entries,
            soil_quality: features.soil_quality,
            feature_schema: features.schema,
            additional_info: query.additional_info(),
        })
    }
}
