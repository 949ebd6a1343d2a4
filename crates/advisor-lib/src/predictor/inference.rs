//! ONNX inference using tract
//!
//! The trained crop classifier and water-use regressor are exported to ONNX
//! and executed with tract-onnx. Both take a single `[1, n_features]` f32
//! input row.

use super::{Classifier, Regressor};
use crate::error::PredictionError;
use anyhow::{Context, Result};
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Inference latency above which a warning is logged
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Parse and optimize an ONNX model for a fixed-width input row
fn load_model(model_bytes: &[u8], n_features: usize) -> Result<TractModel> {
    let model = tract_onnx::onnx()
        .model_for_read(&mut std::io::Cursor::new(model_bytes))
        .context("Failed to parse ONNX model")?
        .with_input_fact(0, f32::fact([1, n_features]).into())
        .context("Failed to set input shape")?
        .into_optimized()
        .context("Failed to optimize model")?
        .into_runnable()
        .context("Failed to create runnable model")?;
    Ok(model)
}

/// Runnable plan plus the input width it was optimized for
struct OnnxRunner {
    model: TractModel,
    n_features: usize,
}

impl OnnxRunner {
    fn new(model_bytes: &[u8], n_features: usize) -> Result<Self> {
        Ok(Self {
            model: load_model(model_bytes, n_features)?,
            n_features,
        })
    }

    fn features_to_tensor(&self, features: &[f64]) -> Result<Tensor, PredictionError> {
        if features.len() != self.n_features {
            return Err(PredictionError::FeatureMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        let data: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let array = tract_ndarray::Array2::from_shape_vec((1, self.n_features), data)
            .map_err(|e| PredictionError::Inference(e.to_string()))?;
        Ok(array.into())
    }

    /// Run the model and return every f32 output, flattened
    fn run(&self, features: &[f64]) -> Result<Vec<Vec<f64>>, PredictionError> {
        let start = Instant::now();
        let input = self.features_to_tensor(features)?;

        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| PredictionError::Inference(format!("{:#}", e)))?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        // label outputs (int64 or string) are skipped
        Ok(outputs
            .iter()
            .filter(|t| t.datum_type() == f32::datum_type())
            .filter_map(|t| t.to_array_view::<f32>().ok())
            .map(|view| view.iter().map(|&v| v as f64).collect())
            .collect())
    }
}

/// Crop classifier backed by an ONNX graph with a probability output
pub struct OnnxClassifier {
    runner: OnnxRunner,
    classes: Vec<String>,
}

impl OnnxClassifier {
    pub fn new(model_bytes: &[u8], classes: Vec<String>, n_features: usize) -> Result<Self> {
        Ok(Self {
            runner: OnnxRunner::new(model_bytes, n_features)?,
            classes,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.runner.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, PredictionError> {
        let outputs = self.runner.run(features)?;
        let n_classes = self.classes.len();

        // the probability tensor is the f32 output with one value per class
        let widest = outputs.iter().map(Vec::len).max().unwrap_or(0);
        outputs
            .into_iter()
            .find(|values| values.len() == n_classes)
            .ok_or(PredictionError::ClassCountMismatch {
                classes: n_classes,
                probabilities: widest,
            })
    }
}

/// Multi-output regressor backed by an ONNX graph
pub struct OnnxRegressor {
    runner: OnnxRunner,
}

impl OnnxRegressor {
    pub fn new(model_bytes: &[u8], n_features: usize) -> Result<Self> {
        Ok(Self {
            runner: OnnxRunner::new(model_bytes, n_features)?,
        })
    }
}

impl Regressor for OnnxRegressor {
    fn n_features(&self) -> usize {
        self.runner.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, PredictionError> {
        self.runner
            .run(features)?
            .into_iter()
            .next()
            .ok_or_else(|| PredictionError::Inference("model produced no f32 output".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureSchema, FeatureVector};
    use crate::predictor::rank_with;
    use prost::Message;
    use tract_onnx::pb::{
        attribute_proto::AttributeType,
        tensor_proto::DataType,
        tensor_shape_proto::{dimension, Dimension},
        type_proto, AttributeProto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto,
        TensorShapeProto, TypeProto, ValueInfoProto,
    };

    const CROPS: [&str; 7] = [
        "rice",
        "maize",
        "chickpea",
        "kidneybeans",
        "pigeonpeas",
        "mothbeans",
        "mungbean",
    ];

    fn tensor_info(name: &str, elem_type: DataType, dims: &[i64]) -> ValueInfoProto {
        let dim = dims
            .iter()
            .map(|&d| Dimension {
                value: Some(dimension::Value::DimValue(d)),
                ..Default::default()
            })
            .collect();
        ValueInfoProto {
            name: name.to_string(),
            r#type: Some(TypeProto {
                value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                    elem_type: elem_type as i32,
                    shape: Some(TensorShapeProto { dim }),
                })),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn int_attr(name: &str, value: i64) -> AttributeProto {
        AttributeProto {
            name: name.to_string(),
            r#type: AttributeType::Int as i32,
            i: value,
            ..Default::default()
        }
    }

    fn node(op_type: &str, output: &str, attribute: Vec<AttributeProto>) -> NodeProto {
        NodeProto {
            op_type: op_type.to_string(),
            name: output.to_string(),
            input: vec!["features".to_string()],
            output: vec![output.to_string()],
            attribute,
            ..Default::default()
        }
    }

    /// A `[1, width]` graph whose first output is an int64 argmax label and
    /// whose second is `op_type` applied to the input row
    fn onnx_model(width: i64, op_type: &str, attribute: Vec<AttributeProto>) -> Vec<u8> {
        let graph = GraphProto {
            name: "fixture".to_string(),
            node: vec![
                node("ArgMax", "label", vec![int_attr("axis", 1), int_attr("keepdims", 0)]),
                node(op_type, "scores", attribute),
            ],
            input: vec![tensor_info("features", DataType::Float, &[1, width])],
            output: vec![
                tensor_info("label", DataType::Int64, &[1]),
                tensor_info("scores", DataType::Float, &[1, width]),
            ],
            ..Default::default()
        };
        ModelProto {
            ir_version: 7,
            opset_import: vec![OperatorSetIdProto {
                domain: String::new(),
                version: 13,
            }],
            graph: Some(graph),
            ..Default::default()
        }
        .encode_to_vec()
    }

    fn softmax_classifier(classes: &[&str], width: i64) -> OnnxClassifier {
        let bytes = onnx_model(width, "Softmax", vec![int_attr("axis", 1)]);
        let classes = classes.iter().map(|c| c.to_string()).collect();
        OnnxClassifier::new(&bytes, classes, width as usize).unwrap()
    }

    #[test]
    fn test_classifier_returns_one_probability_per_class() {
        let classifier = softmax_classifier(&CROPS, 7);
        let probabilities = classifier
            .predict_proba(&[0.1, 0.2, 0.3, 0.4, 1.0, 2.0, 3.0])
            .unwrap();

        assert_eq!(probabilities.len(), CROPS.len());
        assert!((probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-5);
        assert!(probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_classifier_output_ranks_in_probability_order() {
        let classifier = softmax_classifier(&CROPS, 7);
        let features = FeatureVector {
            schema: FeatureSchema::SoilQualityAugmented,
            values: vec![0.1, 0.2, 0.3, 0.4, 1.0, 2.0, 3.0],
            soil_quality: 0.4,
        };

        let ranked = rank_with(&classifier, &features, 3).unwrap();
        let labels: Vec<&str> = ranked.labels().collect();
        assert_eq!(labels, vec!["mungbean", "mothbeans", "pigeonpeas"]);
        assert!((ranked.confidence - 0.568).abs() < 1e-3);
    }

    #[test]
    fn test_classifier_output_width_differs_from_classes() {
        let classifier = softmax_classifier(&CROPS[..3], 7);
        let err = classifier.predict_proba(&[0.0; 7]).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::ClassCountMismatch { classes: 3, probabilities: 7 }
        ));
    }

    #[test]
    fn test_classifier_rejects_wrong_row_width() {
        let classifier = softmax_classifier(&CROPS, 7);
        assert_eq!(classifier.n_features(), 7);
        let err = classifier.predict_proba(&[0.0; 6]).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::FeatureMismatch { expected: 7, actual: 6 }
        ));
    }

    #[test]
    fn test_regressor_uses_first_f32_output() {
        let regressor = OnnxRegressor::new(&onnx_model(3, "Neg", vec![]), 3).unwrap();
        let outputs = regressor.predict(&[1.5, -2.0, 0.25]).unwrap();
        assert_eq!(outputs, vec![-1.5, 2.0, -0.25]);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = OnnxClassifier::new(b"not an onnx model", vec!["rice".into()], 7)
            .err()
            .expect("parsing garbage should fail");
        assert!(format!("{:#}", err).contains("Failed to parse ONNX model"));
    }

    #[test]
    fn test_regressor_garbage_bytes_rejected() {
        assert!(OnnxRegressor::new(&[0u8; 16], 8).is_err());
    }
}
