//! Feature assembly for ML inference
//!
//! Turns raw agronomic inputs into the fixed-order vectors the trained
//! models were fitted on. Column order is part of the model contract: a
//! reordered vector still runs but silently produces wrong predictions.

use crate::models::{CategoryCode, FeatureSchema, FeatureVector, RainfallScaling, RawCropQuery};
use serde::Serialize;

/// Weights of N, P and K in the soil-quality score
const SOIL_WEIGHTS: [f64; 3] = [0.4, 0.3, 0.3];

/// Nutrient level (ppm) that maps to a full contribution
const NUTRIENT_REFERENCE: f64 = 100.0;

/// Number of columns in the water-use model input
pub const WATER_USE_FEATURES: usize = 8;

/// Derived soil-quality score.
///
/// Nutrients at the 100 ppm reference score 100. The score is not clamped,
/// so the 0-140 ppm training range maps onto 0-140.
pub fn soil_quality(n: f64, p: f64, k: f64) -> f64 {
    let [wn, wp, wk] = SOIL_WEIGHTS;
    (n / NUTRIENT_REFERENCE * wn + p / NUTRIENT_REFERENCE * wp + k / NUTRIENT_REFERENCE * wk)
        * 100.0
}

/// Assembles crop classifier inputs for one feature schema
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAssembler {
    schema: FeatureSchema,
    rainfall_scaling: RainfallScaling,
}

impl FeatureAssembler {
    pub fn new(schema: FeatureSchema, rainfall_scaling: RainfallScaling) -> Self {
        Self {
            schema,
            rainfall_scaling,
        }
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn rainfall_scaling(&self) -> RainfallScaling {
        self.rainfall_scaling
    }

    /// Build the feature vector. Values are not range-checked.
    pub fn assemble(&self, raw: &RawCropQuery) -> FeatureVector {
        let quality = soil_quality(raw.n, raw.p, raw.k);
        let mut values = vec![
            raw.n,
            raw.p,
            raw.k,
            raw.temperature,
            raw.ph,
            self.rainfall_scaling.apply(raw.rainfall),
        ];
        if self.schema == FeatureSchema::SoilQualityAugmented {
            values.push(quality);
        }

        FeatureVector {
            schema: self.schema,
            values,
            soil_quality: quality,
        }
    }
}

/// Water-use model input before scaling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterUseFeatures {
    pub rainfall_requirement: f64,
    pub temperature_requirement: f64,
    pub soil_type: CategoryCode,
    pub irrigation_type: CategoryCode,
    pub water_scarcity: CategoryCode,
    pub yield_tons_per_ha: f64,
    pub crop_cycle_duration: f64,
    pub crop_name: CategoryCode,
}

impl WaterUseFeatures {
    /// Values in model input order
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.rainfall_requirement,
            self.temperature_requirement,
            self.soil_type as f64,
            self.irrigation_type as f64,
            self.water_scarcity as f64,
            self.yield_tons_per_ha,
            self.crop_cycle_duration,
            self.crop_name as f64,
        ]
    }
}

/// Whether a nutrient reading falls outside the range the classifier saw in training
pub fn is_outside_training_range(value: f64) -> bool {
    !(0.0..=140.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_query() -> RawCropQuery {
        RawCropQuery::numeric(85.0, 55.0, 40.0, 25.0, 6.8, 250.0)
    }

    #[test]
    fn test_soil_quality_bounds() {
        assert_eq!(soil_quality(0.0, 0.0, 0.0), 0.0);
        assert!((soil_quality(100.0, 100.0, 100.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_soil_quality_reference_query() {
        assert!((soil_quality(85.0, 55.0, 40.0) - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_soil_quality_monotonic_per_nutrient() {
        let steps: Vec<f64> = (0..=14).map(|i| i as f64 * 10.0).collect();
        for &fixed in &[0.0, 70.0, 140.0] {
            for pair in steps.windows(2) {
                let (lo, hi) = (pair[0], pair[1]);
                assert!(soil_quality(lo, fixed, fixed) <= soil_quality(hi, fixed, fixed));
                assert!(soil_quality(fixed, lo, fixed) <= soil_quality(fixed, hi, fixed));
                assert!(soil_quality(fixed, fixed, lo) <= soil_quality(fixed, fixed, hi));
            }
        }
    }

    #[test]
    fn test_soil_quality_unclamped_over_training_range() {
        for n in (0..=140).step_by(20) {
            for p in (0..=140).step_by(20) {
                for k in (0..=140).step_by(20) {
                    let q = soil_quality(n as f64, p as f64, k as f64);
                    assert!((0.0..=140.0 + 1e-9).contains(&q), "q was {}", q);
                }
            }
        }
        assert!((soil_quality(140.0, 140.0, 140.0) - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_augmented_order() {
        let assembler = FeatureAssembler::default();
        let f = assembler.assemble(&sample_query());
        assert_eq!(f.len(), 7);
        assert_eq!(&f.values[..6], &[85.0, 55.0, 40.0, 25.0, 6.8, 250.0]);
        assert!((f.values[6] - 62.5).abs() < 1e-9);
        assert_eq!(f.len(), FeatureSchema::SoilQualityAugmented.len());
    }

    #[test]
    fn test_basic_schema_omits_soil_quality() {
        let assembler = FeatureAssembler::new(FeatureSchema::Basic, RainfallScaling::Raw);
        let f = assembler.assemble(&sample_query());
        assert_eq!(f.values, vec![85.0, 55.0, 40.0, 25.0, 6.8, 250.0]);
        // still reported alongside the vector
        assert!((f.soil_quality - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_rainfall_passes_through_by_default() {
        let f = FeatureAssembler::default().assemble(&sample_query());
        assert_eq!(f.values[5], 250.0);
    }

    #[test]
    fn test_rainfall_hundredths() {
        let assembler =
            FeatureAssembler::new(FeatureSchema::SoilQualityAugmented, RainfallScaling::Hundredths);
        let f = assembler.assemble(&sample_query());
        assert!((f.values[5] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_categorical_metadata_ignored() {
        let mut with_meta = sample_query();
        with_meta.soil_type = Some("Loamy".to_string());
        with_meta.season = Some("Kharif".to_string());
        let assembler = FeatureAssembler::default();
        assert_eq!(assembler.assemble(&with_meta), assembler.assemble(&sample_query()));
    }

    #[test]
    fn test_water_use_feature_order() {
        let features = WaterUseFeatures {
            rainfall_requirement: 1200.0,
            temperature_requirement: 27.0,
            soil_type: 3,
            irrigation_type: 1,
            water_scarcity: -1,
            yield_tons_per_ha: 4.5,
            crop_cycle_duration: 120.0,
            crop_name: 7,
        };
        let v = features.to_vec();
        assert_eq!(v.len(), WATER_USE_FEATURES);
        assert_eq!(v, vec![1200.0, 27.0, 3.0, 1.0, -1.0, 4.5, 120.0, 7.0]);
    }

    #[test]
    fn test_training_range_check() {
        assert!(!is_outside_training_range(0.0));
        assert!(!is_outside_training_range(140.0));
        assert!(is_outside_training_range(-1.0));
        assert!(is_outside_training_range(500.0));
    }
}
