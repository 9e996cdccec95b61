use super::embeddings::{EmbeddingError, HttpEmbeddingProvider, ProviderKind};
use crate::core::config::CourseFinderConfig;


pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    pub fn from_config(config: &CourseFinderConfig) -> Result<HttpEmbeddingProvider, EmbeddingError> {
        HttpEmbeddingProvider::new(
            ProviderKind::parse(&config.embedding_provider)?,
            Some(config.embedding_url.clone()),
            config.embedding_model.clone(),
            config.embedding_api_key.clone(),
            config.timeout,
            config.embedding_cache_size,
            config.embedding_cache_ttl,
        )
        .map(|provider| provider.with_max_concurrency(config.embedding_max_concurrency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let provider = EmbeddingProviderFactory::from_config(&CourseFinderConfig::default()).unwrap();
        assert_eq!(provider.kind(), ProviderKind::Ollama);
        assert_eq!(provider.model(), crate::DEFAULT_EMBEDDING_MODEL);
        assert_eq!(provider.max_concurrency(), crate::DEFAULT_EMBEDDING_CONCURRENCY);
    }

    #[test]
    fn test_concurrency_limit_from_config() {
        let config = CourseFinderConfig {
            embedding_max_concurrency: 2,
            ..Default::default()
        };
        assert_eq!(EmbeddingProviderFactory::from_config(&config).unwrap().max_concurrency(), 2);
    }

    #[test]
    fn test_unknown_provider_is_error() {
        let config = CourseFinderConfig {
            embedding_provider: "cohere".to_string(),
            ..Default::default()
        };
        assert!(EmbeddingProviderFactory::from_config(&config).is_err());
    }
}
