pub mod cache;
pub mod embeddings;
pub mod factory;
pub mod similarity;

pub use cache::{CacheStats, EmbeddingCache};
pub use embeddings::{EmbeddingError, EmbeddingProvider, HttpEmbeddingProvider, ProviderKind};
pub use factory::EmbeddingProviderFactory;
pub use similarity::{cosine_similarity, rank_by_similarity};
