use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

const SCORE_KEY: &str = "_score";

/// A piece of retrieved content, shared by every retriever in the framework.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub meta_data: HashMap<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            meta_data: HashMap::new(),
        }
    }

    /// Stores the relevance score under the `_score` metadata key.
    pub fn with_score(&mut self, score: f64) -> &mut Self {
        self.meta_data.insert(SCORE_KEY.to_string(), Value::from(score));
        self
    }

    /// Returns the stored score, or 0.0 when none was set.
    pub fn score(&self) -> f64 {
        self.meta_data
            .get(SCORE_KEY)
            .and_then(Value::as_f64)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_defaults_to_zero() {
        let doc = Document::new("doc-1", "text");
        assert_eq!(doc.score(), 0.0);
    }

    #[test]
    fn test_with_score_writes_metadata() {
        let mut doc = Document::new("doc-1", "text");
        doc.with_score(0.8);
        assert_eq!(doc.score(), 0.8);
        assert_eq!(doc.meta_data.get("_score"), Some(&Value::from(0.8)));
    }
}
