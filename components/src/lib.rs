//! RAGFlow retriever and logging callback components for LLM orchestration.

pub mod callbacks;
pub mod config;
pub mod error;
pub mod retriever;
pub mod schema;

pub use error::{ConfigError, RequestError, RetrieverError};
pub use schema::Document;
