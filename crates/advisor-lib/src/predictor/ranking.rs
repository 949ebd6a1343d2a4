//! Top-K ranking of class probabilities

use super::Classifier;
use crate::error::PredictionError;
use crate::models::{FeatureVector, RankedPrediction, ScoredLabel};

/// Number of crops returned per recommendation
pub const DEFAULT_TOP_K: usize = 3;

/// Class probabilities in the order the classifier reports its classes
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilityDistribution {
    entries: Vec<ScoredLabel>,
}

impl ClassProbabilityDistribution {
    /// Pair labels with probabilities. Lengths must match and every
    /// probability must be finite.
    pub fn from_parts(classes: &[String], probabilities: &[f64]) -> Result<Self, PredictionError> {
        if classes.len() != probabilities.len() {
            return Err(PredictionError::ClassCountMismatch {
                classes: classes.len(),
                probabilities: probabilities.len(),
            });
        }
        let non_finite = classes
            .iter()
            .zip(probabilities)
            .find(|(_, p)| !p.is_finite());
        if let Some((label, &value)) = non_finite {
            return Err(PredictionError::NonFiniteProbability {
                label: label.clone(),
                value,
            });
        }
        let entries = classes
            .iter()
            .zip(probabilities)
            .map(|(label, &probability)| ScoredLabel {
                label: label.clone(),
                probability,
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ScoredLabel] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest probability over all classes, 0 when empty
    pub fn max_probability(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.probability)
            .fold(0.0, f64::max)
    }
}

impl FromIterator<(String, f64)> for ClassProbabilityDistribution {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(label, probability)| ScoredLabel { label, probability })
                .collect(),
        }
    }
}

/// Keep the `k` most probable labels.
///
/// The sort is stable, so equal probabilities keep classifier order.
pub fn rank(distribution: &ClassProbabilityDistribution, k: usize) -> RankedPrediction {
    let mut entries = distribution.entries.clone();
    entries.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    entries.truncate(k);

    RankedPrediction {
        entries,
        confidence: distribution.max_probability(),
    }
}

/// Run the classifier and rank its output
pub fn rank_with(
    classifier: &dyn Classifier,
    features: &FeatureVector,
    k: usize,
) -> Result<RankedPrediction, PredictionError> {
    let expected = classifier.n_features();
    if features.len() != expected {
        return Err(PredictionError::FeatureMismatch {
            expected,
            actual: features.len(),
        });
    }

    let probabilities = classifier.predict_proba(features.as_slice())?;
    let distribution = ClassProbabilityDistribution::from_parts(classifier.classes(), &probabilities)?;
    Ok(rank(&distribution, k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureSchema;

    fn dist(pairs: &[(&str, f64)]) -> ClassProbabilityDistribution {
        pairs.iter().map(|(l, p)| (l.to_string(), *p)).collect()
    }

    struct FixedClassifier {
        classes: Vec<String>,
        probabilities: Vec<f64>,
        n_features: usize,
    }

    impl Classifier for FixedClassifier {
        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn n_features(&self) -> usize {
            self.n_features
        }

        fn predict_proba(&self, _features: &[f64]) -> Result<Vec<f64>, PredictionError> {
            Ok(self.probabilities.clone())
        }
    }

    fn features(len: usize) -> FeatureVector {
        FeatureVector {
            schema: FeatureSchema::SoilQualityAugmented,
            values: vec![1.0; len],
            soil_quality: 1.0,
        }
    }

    #[test]
    fn test_rank_descending_top_three() {
        let d = dist(&[("rice", 0.1), ("maize", 0.5), ("jute", 0.05), ("coffee", 0.35)]);
        let ranked = rank(&d, DEFAULT_TOP_K);
        let labels: Vec<&str> = ranked.labels().collect();
        assert_eq!(labels, vec!["maize", "coffee", "rice"]);
        assert_eq!(ranked.confidence, 0.5);
    }

    #[test]
    fn test_rank_fewer_classes_than_k() {
        let d = dist(&[("rice", 0.3), ("maize", 0.7)]);
        let ranked = rank(&d, 3);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked.entries[0].label, "maize");
    }

    #[test]
    fn test_rank_length_is_min_of_k_and_classes() {
        for c in 0..6 {
            let pairs: Vec<(String, f64)> =
                (0..c).map(|i| (format!("c{}", i), 1.0 / (i + 1) as f64)).collect();
            let d: ClassProbabilityDistribution = pairs.into_iter().collect();
            let ranked = rank(&d, 3);
            assert_eq!(ranked.len(), c.min(3));
            for pair in ranked.entries.windows(2) {
                assert!(pair[0].probability >= pair[1].probability);
            }
        }
    }

    #[test]
    fn test_ties_keep_classifier_order() {
        let d = dist(&[("banana", 0.25), ("apple", 0.25), ("mango", 0.25), ("grapes", 0.25)]);
        let labels: Vec<String> = rank(&d, 3).labels().map(String::from).collect();
        assert_eq!(labels, vec!["banana", "apple", "mango"]);
    }

    #[test]
    fn test_confidence_is_max_not_sum() {
        let d = dist(&[("a", 0.4), ("b", 0.3), ("c", 0.2), ("d", 0.1)]);
        let ranked = rank(&d, 3);
        assert_eq!(ranked.confidence, 0.4);
    }

    #[test]
    fn test_empty_distribution() {
        let ranked = rank(&dist(&[]), 3);
        assert!(ranked.is_empty());
        assert_eq!(ranked.confidence, 0.0);
    }

    #[test]
    fn test_from_parts_length_mismatch() {
        let classes = vec!["a".to_string(), "b".to_string()];
        let err = ClassProbabilityDistribution::from_parts(&classes, &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::ClassCountMismatch { classes: 2, probabilities: 1 }
        ));
    }

    #[test]
    fn test_from_parts_rejects_nan() {
        let classes = vec!["rice".to_string(), "maize".to_string()];
        let err = ClassProbabilityDistribution::from_parts(&classes, &[0.4, f64::NAN]).unwrap_err();
        match err {
            PredictionError::NonFiniteProbability { label, value } => {
                assert_eq!(label, "maize");
                assert!(value.is_nan());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rank_with_rejects_infinite_probability() {
        let classifier = FixedClassifier {
            classes: vec!["rice".into(), "maize".into()],
            probabilities: vec![f64::INFINITY, 0.1],
            n_features: 7,
        };
        let err = rank_with(&classifier, &features(7), 3).unwrap_err();
        assert!(err.to_string().contains("non-finite probability inf for class rice"));
    }

    #[test]
    fn test_rank_with_feature_mismatch() {
        let classifier = FixedClassifier {
            classes: vec!["rice".into()],
            probabilities: vec![1.0],
            n_features: 6,
        };
        let err = rank_with(&classifier, &features(7), 3).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::FeatureMismatch { expected: 6, actual: 7 }
        ));
    }

    #[test]
    fn test_rank_with_runs_classifier() {
        let classifier = FixedClassifier {
            classes: vec!["rice".into(), "maize".into(), "chickpea".into(), "lentil".into()],
            probabilities: vec![0.2, 0.1, 0.6, 0.1],
            n_features: 7,
        };
        let ranked = rank_with(&classifier, &features(7), 3).unwrap();
        let labels: Vec<&str> = ranked.labels().collect();
        assert_eq!(labels, vec!["chickpea", "rice", "maize"]);
        assert_eq!(ranked.confidence, 0.6);
    }

    #[test]
    fn test_rank_with_probability_count_mismatch() {
        let classifier = FixedClassifier {
            classes: vec!["rice".into(), "maize".into()],
            probabilities: vec![1.0],
            n_features: 7,
        };
        assert!(matches!(
            rank_with(&classifier, &features(7), 3),
            Err(PredictionError::ClassCountMismatch { .. })
        ));
    }
}
