//! ML prediction pipeline

mod advisor;
mod encoding;
mod features;
mod inference;
mod output;
mod ranking;
mod recommender;
mod scaler;

pub use advisor::{WaterUseAdvice, WaterUseAdvisor};
pub use encoding::{safe_encode, CategoryEncoding, LabelEncoder, UNSEEN_CATEGORY};
pub use features::{
    is_outside_training_range, soil_quality, FeatureAssembler, WaterUseFeatures,
    WATER_USE_FEATURES,
};
pub use inference::{OnnxClassifier, OnnxRegressor};
pub use output::{FormattedWaterUse, OutputConfig, OutputFormatter, LABEL_SEPARATOR, WATER_USE_OUTPUTS};
pub use ranking::{rank, rank_with, ClassProbabilityDistribution, DEFAULT_TOP_K};
pub use recommender::{CropRecommendation, CropRecommender};
pub use scaler::StandardScaler;

use crate::error::PredictionError;

/// A trained classifier exposing class probabilities
pub trait Classifier: Send + Sync {
    /// Class labels in the order probabilities are reported
    fn classes(&self) -> &[String];

    /// Width of the input row
    fn n_features(&self) -> usize;

    /// One probability per class for a single input row
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, PredictionError>;
}

/// A trained multi-output regressor
pub trait Regressor: Send + Sync {
    fn n_features(&self) -> usize;

    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, PredictionError>;
}
