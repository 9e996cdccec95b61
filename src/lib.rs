pub mod aliases;
pub mod catalog;
pub mod client;
pub mod core;
pub mod extraction;
pub mod llm;
pub mod mcp;
pub mod search;
pub mod toolkit;
pub mod utils;

#[cfg(test)]
mod testing;

pub use utils::safe_truncate;


pub use client::CourseFinder;
pub use core::config::CourseFinderConfig;
pub use core::error::{CourseFinderError, Result};
pub use extraction::{EntityExtractor, ExtractedFilters, FilterField};
pub use llm::embeddings::{EmbeddingProvider, HttpEmbeddingProvider};
pub use search::{CourseDocument, FilterBuilder, FilterQuery, StagedRetriever, VectorStore};


pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";


pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";


pub const DEFAULT_CACHE_SIZE: usize = 1000;


pub const DEFAULT_CACHE_TTL: u64 = 300;

/// Embedding requests kept in flight at once during batch embedding.
pub const DEFAULT_EMBEDDING_CONCURRENCY: usize = 8;
