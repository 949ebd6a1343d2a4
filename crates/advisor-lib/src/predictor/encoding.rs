//! Label encoding for categorical model inputs
//!
//! Codes follow a fitted label encoder: the position of the value in the
//! sorted training vocabulary. Values never seen in training are mapped to
//! [`UNSEEN_CATEGORY`] instead of failing the request.

use crate::models::CategoryCode;
use serde::Serialize;
use tracing::warn;

/// Out-of-vocabulary marker
pub const UNSEEN_CATEGORY: CategoryCode = -1;

/// Fitted label encoder vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Build from training classes. Duplicates are dropped and the rest sorted.
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn vocab_size(&self) -> usize {
        self.classes.len()
    }

    /// Strict lookup, `None` when the value was never seen
    pub fn transform(&self, value: &str) -> Option<CategoryCode> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
            .map(|idx| idx as CategoryCode)
    }
}

/// Encode a value, falling back to the sentinel for unseen categories
pub fn safe_encode(encoder: &LabelEncoder, value: &str) -> CategoryCode {
    encoder.transform(value).unwrap_or(UNSEEN_CATEGORY)
}

/// Collects codes for several fields and remembers which ones degraded
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CategoryEncoding {
    unseen: Vec<String>,
}

impl CategoryEncoding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one field, recording it when the sentinel is substituted
    pub fn encode(&mut self, encoder: &LabelEncoder, field: &str, value: &str) -> CategoryCode {
        let code = safe_encode(encoder, value);
        if code == UNSEEN_CATEGORY {
            warn!(field = %field, value = %value, "Unseen category, using sentinel code");
            self.unseen.push(field.to_string());
        }
        code
    }

    /// Field names whose value was not in the training vocabulary
    pub fn unseen(&self) -> &[String] {
        &self.unseen
    }

    pub fn is_degraded(&self) -> bool {
        !self.unseen.is_empty()
    }

    pub fn into_unseen(self) -> Vec<String> {
        self.unseen
    }
}
