//! Standard scaling of model inputs

use crate::error::{ArtifactError, PredictionError};

/// Per-column `(x - mean) / scale` as fitted at training time
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        if mean.len() != scale.len() {
            return Err(ArtifactError::Invalid(format!(
                "scaler has {} means but {} scales",
                mean.len(),
                scale.len()
            )));
        }
        // zero-variance columns are left unscaled
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if values.len() != self.mean.len() {
            return Err(PredictionError::FeatureMismatch {
                expected: self.mean.len(),
                actual: values.len(),
            });
        }
        Ok(values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}
