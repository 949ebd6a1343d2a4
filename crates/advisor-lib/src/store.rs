//! Trained artifact bundle
//!
//! Loads the crop classifier, the water-use regressor and their fitted
//! preprocessing parameters from a directory described by `manifest.json`.
//! Loading happens once at startup; any failure is fatal to the caller.

use crate::error::ArtifactError;
use crate::models::{FeatureSchema, RainfallScaling};
use crate::predictor::{
    CropRecommender, FeatureAssembler, LabelEncoder, OnnxClassifier, OnnxRegressor,
    StandardScaler, WaterUseAdvisor, WATER_USE_FEATURES,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Manifest file name inside the artifact directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Description of the artifact bundle
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactManifest {
    #[serde(default = "default_version")]
    pub version: String,
    pub crop: CropArtifact,
    pub water_use: WaterUseArtifact,
}

fn default_version() -> String {
    "unversioned".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CropArtifact {
    /// ONNX file, relative to the artifact directory
    pub model: PathBuf,
    #[serde(default)]
    pub sha256: Option<String>,
    /// Labels in the classifier's probability order
    pub classes: Vec<String>,
    #[serde(default)]
    pub feature_schema: FeatureSchema,
    #[serde(default)]
    pub rainfall_scaling: RainfallScaling,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaterUseArtifact {
    pub model: PathBuf,
    #[serde(default)]
    pub sha256: Option<String>,
    /// Vocabulary of the fitted label encoder
    pub encoder_classes: Vec<String>,
    pub scaler: ScalerParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl ArtifactManifest {
    pub fn read(dir: &Path) -> Result<Self, ArtifactError> {
        let path = dir.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ArtifactError::Manifest { path, source })
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.crop.classes.is_empty() {
            return Err(ArtifactError::Invalid("crop classifier has no classes".to_string()));
        }
        if self.water_use.scaler.mean.len() != WATER_USE_FEATURES {
            return Err(ArtifactError::Invalid(format!(
                "water-use scaler has {} columns, expected {}",
                self.water_use.scaler.mean.len(),
                WATER_USE_FEATURES
            )));
        }
        Ok(())
    }
}

/// Loaded models, read-only for the lifetime of the process
pub struct ModelStore {
    version: String,
    crop: CropRecommender,
    water_use: WaterUseAdvisor,
}

impl ModelStore {
    pub fn new(version: impl Into<String>, crop: CropRecommender, water_use: WaterUseAdvisor) -> Self {
        Self {
            version: version.into(),
            crop,
            water_use,
        }
    }

    /// Load every artifact listed in the manifest under `dir`
    pub fn load(dir: &Path, top_k: usize) -> Result<Self, ArtifactError> {
        if top_k == 0 {
            return Err(ArtifactError::Invalid("top_k must be at least 1".to_string()));
        }

        let manifest = ArtifactManifest::read(dir)?;
        manifest.validate()?;
        debug!(version = %manifest.version, dir = ?dir, "Artifact manifest parsed");

        let crop = &manifest.crop;
        let crop_path = dir.join(&crop.model);
        let crop_bytes = read_model(&crop_path, crop.sha256.as_deref())?;
        let classifier = OnnxClassifier::new(
            &crop_bytes,
            crop.classes.clone(),
            crop.feature_schema.len(),
        )
        .map_err(|e| ArtifactError::InvalidModel {
            path: crop_path.clone(),
            reason: format!("{:#}", e),
        })?;
        let recommender = CropRecommender::new(
            Box::new(classifier),
            FeatureAssembler::new(crop.feature_schema, crop.rainfall_scaling),
        )
        .with_top_k(top_k);

        let water = &manifest.water_use;
        let water_path = dir.join(&water.model);
        let water_bytes = read_model(&water_path, water.sha256.as_deref())?;
        let regressor = OnnxRegressor::new(&water_bytes, WATER_USE_FEATURES).map_err(|e| {
            ArtifactError::InvalidModel {
                path: water_path.clone(),
                reason: format!("{:#}", e),
            }
        })?;
        let scaler = StandardScaler::new(water.scaler.mean.clone(), water.scaler.scale.clone())?;
        let advisor = WaterUseAdvisor::new(
            Box::new(regressor),
            LabelEncoder::new(water.encoder_classes.iter().cloned()),
            scaler,
        );

        info!(
            version = %manifest.version,
            crop_classes = crop.classes.len(),
            feature_schema = crop.feature_schema.as_str(),
            encoder_vocabulary = water.encoder_classes.len(),
            "Model artifacts loaded"
        );

        Ok(Self::new(manifest.version, recommender, advisor))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn crop(&self) -> &CropRecommender {
        &self.crop
    }

    pub fn water_use(&self) -> &WaterUseAdvisor {
        &self.water_use
    }
}

impl std::fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStore")
            .field("version", &self.version)
            .field("feature_schema", &self.crop.schema())
            .field("top_k", &self.crop.top_k())
            .finish_non_exhaustive()
    }
}

/// Read a model file and validate its checksum when one is given
fn read_model(path: &Path, expected_sha256: Option<&str>) -> Result<Vec<u8>, ArtifactError> {
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(expected) = expected_sha256 {
        let actual = compute_checksum(&bytes);
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ArtifactError::ChecksumMismatch {
                path: path.to_path_buf(),
                expected: expected.to_string(),
                actual,
            });
        }
        debug!(path = ?path, checksum = %actual, "Model checksum validated");
    }

    Ok(bytes)
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
