// Retriever components: a query goes in, scored documents come out.

use crate::schema::Document;
use serde::{Deserialize, Serialize};

pub mod ragflow;

pub const COMPONENT_OF_RETRIEVER: &str = "Retriever";

/// Registration contract every framework component exposes.
pub trait Component {
    /// Fixed identifier of the implementation, e.g. `"RAGFlow"`.
    fn get_type(&self) -> &'static str;

    /// Whether the component fires its own lifecycle callbacks.
    fn is_callbacks_enabled(&self) -> bool;
}

/// Per-call overrides accepted by `retrieve`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetrieveOption {
    TopK(usize),
    ScoreThreshold(f64),
}

pub fn with_top_k(top_k: usize) -> RetrieveOption {
    RetrieveOption::TopK(top_k)
}

pub fn with_score_threshold(threshold: f64) -> RetrieveOption {
    RetrieveOption::ScoreThreshold(threshold)
}

/// Effective options of one retrieval after merging.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RetrieveOptions {
    pub top_k: Option<usize>,
    pub score_threshold: Option<f64>,
}

/// Applies `opts` on top of `base`; the last option for a field wins.
pub fn get_common_options(base: RetrieveOptions, opts: &[RetrieveOption]) -> RetrieveOptions {
    opts.iter().fold(base, |mut merged, opt| {
        match *opt {
            RetrieveOption::TopK(k) => merged.top_k = Some(k),
            RetrieveOption::ScoreThreshold(t) => merged.score_threshold = Some(t),
        }
        merged
    })
}

/// Payload of the retriever start hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieverCallbackInput {
    pub query: String,
    pub top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
}

/// Payload of the retriever end hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieverCallbackOutput {
    pub docs: Vec<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_base() {
        let base = RetrieveOptions {
            top_k: Some(5),
            score_threshold: Some(0.2),
        };
        let merged = get_common_options(base, &[with_score_threshold(0.7)]);
        assert_eq!(merged.top_k, Some(5));
        assert_eq!(merged.score_threshold, Some(0.7));
    }

    #[test]
    fn test_last_override_wins() {
        let merged = get_common_options(
            RetrieveOptions::default(),
            &[with_top_k(3), with_top_k(8)],
        );
        assert_eq!(merged.top_k, Some(8));
        assert_eq!(merged.score_threshold, None);
    }
}
