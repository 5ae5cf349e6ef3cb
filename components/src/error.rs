use thiserror::Error;

/// Validation failures raised while building a retriever, before any network activity.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config is required")]
    ConfigRequired,

    #[error("api_key is required")]
    MissingApiKey,

    #[error("dataset_ids or document_ids, one of its is required")]
    MissingScope,

    #[error("build http client failed: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Failures of a single retrieval round trip, one variant per stage.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("error marshaling data: {0}")]
    Marshal(#[source] serde_json::Error),

    #[error("create request failed: {0}")]
    CreateRequest(#[source] reqwest::Error),

    #[error("do request failed: {0}")]
    Send(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    ReadBody(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Api(String),

    #[error("request failed with status code: {0}")]
    Status(u16),

    #[error("decode response failed: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RetrieverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to retrieve documents: {0}")]
    Retrieve(#[from] RequestError),
}

#[derive(Error, Debug)]
pub enum LogCallbackError {
    #[error("create log directory {path} failed: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("open log file {path} failed: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = RetrieverError> = std::result::Result<T, E>;
