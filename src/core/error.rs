

use thiserror::Error;

use crate::llm::embeddings::EmbeddingError;
use crate::search::store::StoreError;


#[derive(Error, Debug)]
pub enum CourseFinderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Embedding provider error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector store error: {0}")]
    Store(#[from] StoreError),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CourseFinderError {
    /// True for failures of the embedding provider or vector store.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Embedding(_) | Self::Store(_))
    }
}

impl From<config::ConfigError> for CourseFinderError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}


pub type Result<T> = std::result::Result<T, CourseFinderError>;
