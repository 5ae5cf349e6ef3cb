//! Retriever backed by the RAGFlow `/api/v1/retrieval` HTTP endpoint.

mod request;
mod response;

pub use request::RetrievalRequestOption;
pub use response::{
    get_keywords, get_org_doc_id, get_org_doc_name, Chunk, Data, DocAgg, SuccessResponse,
    KEYWORDS_KEY, ORIG_DOC_ID_KEY, ORIG_DOC_NAME_KEY,
};

use crate::callbacks::{self, Context};
use crate::error::{ConfigError, Result, RetrieverError};
use crate::retriever::{
    get_common_options, Component, RetrieveOption, RetrieveOptions, RetrieverCallbackInput,
    RetrieverCallbackOutput, COMPONENT_OF_RETRIEVER,
};
use crate::schema::Document;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_ENDPOINT: &str = "https://ragflow.io";
pub const RETRIEVAL_PATH: &str = "/api/v1/retrieval";
const TYPE: &str = "RAGFlow";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// RAGFlow API key, sent as a bearer token.
    pub api_key: String,
    /// RAGFlow address; `https://ragflow.io` when empty.
    pub endpoint: String,
    pub dataset_ids: Vec<String>,
    /// All selected documents must use the same embedding model.
    pub document_ids: Vec<String>,
    pub retrieval_request_option: Option<RetrievalRequestOption>,
    /// HTTP timeout in seconds; 0 leaves the client without a timeout.
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Retriever {
    config: RetrieverConfig,
    client: reqwest::Client,
    retriever_url: String,
    authorization: String,
}

fn get_url(endpoint: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), RETRIEVAL_PATH)
}

fn get_auth(api_key: &str) -> String {
    format!("Bearer {}", api_key)
}

/// Validates `config` and builds a retriever. Checks run in order and the first
/// violation is returned.
pub fn new_retriever(config: Option<RetrieverConfig>) -> Result<Retriever> {
    let mut config = config.ok_or(ConfigError::ConfigRequired)?;
    if config.api_key.is_empty() {
        return Err(ConfigError::MissingApiKey.into());
    }
    if config.dataset_ids.is_empty() && config.document_ids.is_empty() {
        return Err(ConfigError::MissingScope.into());
    }

    if config.endpoint.is_empty() {
        config.endpoint = DEFAULT_ENDPOINT.to_string();
    }

    let mut builder = reqwest::Client::builder();
    if config.timeout != 0 {
        builder = builder.timeout(Duration::from_secs(config.timeout));
    }
    let client = builder.build().map_err(ConfigError::HttpClient)?;

    Ok(Retriever {
        retriever_url: get_url(&config.endpoint),
        authorization: get_auth(&config.api_key),
        client,
        config,
    })
}

impl Retriever {
    pub fn new(config: RetrieverConfig) -> Result<Self> {
        new_retriever(Some(config))
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    pub fn url(&self) -> &str {
        &self.retriever_url
    }

    /// Retrieves the chunks matching `query`, mapped to documents in the order
    /// RAGFlow ranked them. Chunks scoring below the effective threshold are dropped.
    pub async fn retrieve(
        &self,
        ctx: &Context,
        query: &str,
        opts: &[RetrieveOption],
    ) -> Result<Vec<Document>> {
        let base = match &self.config.retrieval_request_option {
            Some(option) => RetrieveOptions {
                top_k: option.top_k,
                score_threshold: option.similarity_threshold,
            },
            None => RetrieveOptions::default(),
        };
        let options = get_common_options(base, opts);

        let ctx = callbacks::ensure_run_info(ctx.clone(), self.get_type(), COMPONENT_OF_RETRIEVER);
        let input = RetrieverCallbackInput {
            query: query.to_string(),
            top_k: options.top_k.unwrap_or_default(),
            score_threshold: options.score_threshold,
        };
        let ctx = callbacks::on_start(ctx, &serde_json::to_value(&input).unwrap_or_default());

        info!("RAGFlow: Searching for: {}", query);
        let result = match self.do_post(query, &options).await {
            Ok(result) => result,
            Err(e) => {
                let err = RetrieverError::from(e);
                callbacks::on_error(ctx, &err);
                return Err(err);
            }
        };

        let total = result.data.chunks.len();
        let docs: Vec<Document> = result
            .data
            .chunks
            .iter()
            .filter(|chunk| match options.score_threshold {
                Some(threshold) => chunk.similarity >= threshold,
                None => true,
            })
            .map(Chunk::to_doc)
            .collect();
        info!("RAGFlow: kept {} of {} chunks", docs.len(), total);

        let output = RetrieverCallbackOutput { docs };
        callbacks::on_end(ctx, &serde_json::to_value(&output).unwrap_or_default());

        Ok(output.docs)
    }
}

impl Component for Retriever {
    fn get_type(&self) -> &'static str {
        TYPE
    }

    fn is_callbacks_enabled(&self) -> bool {
        true
    }
}
