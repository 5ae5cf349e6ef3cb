use crate::retriever::ragflow::{RetrievalRequestOption, RetrieverConfig, DEFAULT_ENDPOINT};
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ragflow_api_key: String,
    pub ragflow_endpoint: String,
    pub dataset_ids: Vec<String>,
    pub document_ids: Vec<String>,
    pub timeout_secs: u64,
    pub top_k: Option<usize>,
    pub similarity_threshold: Option<f64>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            ragflow_api_key: std::env::var("RAGFLOW_API_KEY")
                .context("RAGFLOW_API_KEY is not set")?,
            ragflow_endpoint: std::env::var("RAGFLOW_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            dataset_ids: split_ids(std::env::var("RAGFLOW_DATASET_IDS").ok()),
            document_ids: split_ids(std::env::var("RAGFLOW_DOCUMENT_IDS").ok()),
            timeout_secs: std::env::var("RAGFLOW_TIMEOUT_SECS")
                .unwrap_or_else(|_| "0".to_string())
                .parse::<u64>()
                .context("RAGFLOW_TIMEOUT_SECS must be a number of seconds")?,
            top_k: std::env::var("RAGFLOW_TOP_K")
                .ok()
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("RAGFLOW_TOP_K must be an integer")?,
            similarity_threshold: std::env::var("RAGFLOW_SIMILARITY_THRESHOLD")
                .ok()
                .map(|v| v.parse::<f64>())
                .transpose()
                .context("RAGFLOW_SIMILARITY_THRESHOLD must be a number")?,
            log_level: std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn retriever_config(&self) -> RetrieverConfig {
        let retrieval_request_option = if self.top_k.is_some() || self.similarity_threshold.is_some() {
            Some(RetrievalRequestOption {
                top_k: self.top_k,
                similarity_threshold: self.similarity_threshold,
                ..Default::default()
            })
        } else {
            None
        };

        RetrieverConfig {
            api_key: self.ragflow_api_key.clone(),
            endpoint: self.ragflow_endpoint.clone(),
            dataset_ids: self.dataset_ids.clone(),
            document_ids: self.document_ids.clone(),
            retrieval_request_option,
            timeout: self.timeout_secs,
        }
    }
}

fn split_ids(raw: Option<String>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ids() {
        assert_eq!(
            split_ids(Some(" a, b,,c ".to_string())),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(split_ids(None).is_empty());
        assert!(split_ids(Some(String::new())).is_empty());
    }

    #[test]
    fn test_retriever_config_without_overrides() {
        let config = Config {
            ragflow_api_key: "key".to_string(),
            ragflow_endpoint: "http://localhost:9380".to_string(),
            dataset_ids: vec!["ds".to_string()],
            document_ids: vec![],
            timeout_secs: 5,
            top_k: None,
            similarity_threshold: None,
            log_level: "info".to_string(),
        };

        let retriever = config.retriever_config();
        assert_eq!(retriever.api_key, "key");
        assert_eq!(retriever.timeout, 5);
        assert!(retriever.retrieval_request_option.is_none());
    }

    #[test]
    fn test_retriever_config_with_threshold() {
        let config = Config {
            ragflow_api_key: "key".to_string(),
            ragflow_endpoint: DEFAULT_ENDPOINT.to_string(),
            dataset_ids: vec![],
            document_ids: vec!["doc".to_string()],
            timeout_secs: 0,
            top_k: Some(16),
            similarity_threshold: Some(0.4),
            log_level: "debug".to_string(),
        };

        let option = config.retriever_config().retrieval_request_option.unwrap();
        assert_eq!(option.top_k, Some(16));
        assert_eq!(option.similarity_threshold, Some(0.4));
        assert_eq!(option.page, None);
    }
}
