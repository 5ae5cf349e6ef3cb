use super::response::{ErrorResponse, SuccessResponse};
use super::Retriever;
use crate::error::RequestError;
use crate::retriever::RetrieveOptions;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Extra knobs of the RAGFlow retrieval API. Unset fields are left to the server defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalRequestOption {
    /// Starting index of the documents to retrieve. Server default: 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    /// Maximum number of chunks to retrieve. Server default: 30.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    /// Minimum similarity score. Server default: 0.2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f64>,
    /// Weight of vector cosine similarity; term similarity gets `1 - weight`. Server default: 0.3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_similarity_weight: Option<f64>,
    /// Number of chunks engaged in vector cosine computation. Server default: 1024.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_id: Option<String>,
    /// Enable keyword-based matching.
    #[serde(default, skip_serializing_if = "is_false")]
    pub keyword: bool,
    /// Highlight matched terms in the results.
    #[serde(default, skip_serializing_if = "is_false")]
    pub highlight: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn no_ids(ids: &&[String]) -> bool {
    ids.is_empty()
}

/// Owned copy of the stored option, so a single call never touches the config.
pub(crate) fn copy_option(option: Option<&RetrievalRequestOption>) -> RetrievalRequestOption {
    option.cloned().unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub(crate) struct Request<'a> {
    pub question: &'a str,
    #[serde(skip_serializing_if = "no_ids")]
    pub dataset_ids: &'a [String],
    #[serde(skip_serializing_if = "no_ids")]
    pub document_ids: &'a [String],
    #[serde(flatten)]
    pub option: RetrievalRequestOption,
}

impl Retriever {
    pub(crate) fn get_request<'a>(&'a self, query: &'a str, options: &RetrieveOptions) -> Request<'a> {
        let mut option = copy_option(self.config.retrieval_request_option.as_ref());

        // merged call options take precedence over the stored ones
        option.top_k = options.top_k;
        option.similarity_threshold = options.score_threshold;

        Request {
            question: query,
            dataset_ids: &self.config.dataset_ids,
            document_ids: &self.config.document_ids,
            option,
        }
    }

    pub(crate) async fn do_post(
        &self,
        query: &str,
        options: &RetrieveOptions,
    ) -> Result<SuccessResponse, RequestError> {
        let body = serde_json::to_string(&self.get_request(query, options))
            .map_err(RequestError::Marshal)?;

        let request = self
            .client
            .post(&self.retriever_url)
            .header(AUTHORIZATION, &self.authorization)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .build()
            .map_err(RequestError::CreateRequest)?;

        debug!("RAGFlow: POST {}", self.retriever_url);
        let resp = self
            .client
            .execute(request)
            .await
            .map_err(RequestError::Send)?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(RequestError::ReadBody)?;
        debug!("RAGFlow: response status {}, {} bytes", status, body.len());

        if !status.is_success() {
            return match serde_json::from_slice::<ErrorResponse>(&body) {
                Ok(err) if !err.message.is_empty() => Err(RequestError::Api(err.message)),
                _ => Err(RequestError::Status(status.as_u16())),
            };
        }

        serde_json::from_slice(&body).map_err(RequestError::Decode)
    }
}
