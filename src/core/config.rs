use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{CourseFinderError, Result};
use crate::toolkit::listing::HybridWeights;
use crate::{
    DEFAULT_CACHE_SIZE, DEFAULT_CACHE_TTL, DEFAULT_EMBEDDING_CONCURRENCY, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_OLLAMA_URL,
};


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseFinderConfig {

    pub university_aliases_path: String,
    pub department_categories_path: String,
    pub catalog_path: String,


    pub embedding_provider: String,
    pub embedding_model: String,
    pub embedding_url: String,
    pub embedding_api_key: Option<String>,
    pub timeout: u64,
    pub embedding_cache_size: usize,
    pub embedding_cache_ttl: u64,
    pub embedding_max_concurrency: usize,


    pub default_top_k: usize,
    pub curriculum_candidates: usize,
    pub hybrid: HybridWeights,
}

impl CourseFinderConfig {

    pub fn new(data_dir: &str) -> Self {
        let data_dir = data_dir.trim_end_matches('/');
        Self {
            university_aliases_path: format!("{}/univ_mapping.json", data_dir),
            department_categories_path: format!("{}/department_mapping.json", data_dir),
            catalog_path: format!("{}/catalog.json", data_dir),

            embedding_provider: "ollama".to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_url: DEFAULT_OLLAMA_URL.to_string(),
            embedding_api_key: None,
            timeout: 30,
            embedding_cache_size: DEFAULT_CACHE_SIZE,
            embedding_cache_ttl: DEFAULT_CACHE_TTL,
            embedding_max_concurrency: DEFAULT_EMBEDDING_CONCURRENCY,

            default_top_k: 5,
            curriculum_candidates: 20,
            hybrid: HybridWeights::default(),
        }
    }


    /// Defaults under `COURSEFINDER_DATA_DIR`, overridden by
    /// `COURSEFINDER_<FIELD>` variables named after the struct fields.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            &std::env::var("COURSEFINDER_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        );

        if let Ok(path) = std::env::var("COURSEFINDER_UNIVERSITY_ALIASES_PATH") {
            config.university_aliases_path = path;
        }
        if let Ok(path) = std::env::var("COURSEFINDER_DEPARTMENT_CATEGORIES_PATH") {
            config.department_categories_path = path;
        }
        if let Ok(path) = std::env::var("COURSEFINDER_CATALOG_PATH") {
            config.catalog_path = path;
        }
        if let Ok(provider) = std::env::var("COURSEFINDER_EMBEDDING_PROVIDER") {
            config.embedding_provider = provider;
        }
        if let Ok(model) = std::env::var("COURSEFINDER_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Ok(url) = std::env::var("COURSEFINDER_EMBEDDING_URL") {
            config.embedding_url = url;
        }
        if let Ok(key) = std::env::var("COURSEFINDER_EMBEDDING_API_KEY") {
            config.embedding_api_key = Some(key);
        }
        if let Some(timeout) = env_number("COURSEFINDER_TIMEOUT") {
            config.timeout = timeout;
        }
        if let Some(limit) = env_number("COURSEFINDER_EMBEDDING_MAX_CONCURRENCY") {
            config.embedding_max_concurrency = limit;
        }

        config
    }

    /// Layers an optional settings file (any format the `config` crate
    /// understands) over [`from_env`](Self::from_env), then applies the same
    /// `COURSEFINDER_*` variables again so they win over the file.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::from_env())?)
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("COURSEFINDER").try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;

        info!(
            "Configuration loaded from {}: provider={}, model={}",
            path, config.embedding_provider, config.embedding_model
        );
        Ok(config)
    }


    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.embedding_url).map_err(|e| {
            CourseFinderError::Configuration(format!(
                "invalid embedding_url '{}': {}",
                self.embedding_url, e
            ))
        })?;

        match self.embedding_provider.as_str() {
            "ollama" | "openai" => {}
            other => {
                return Err(CourseFinderError::Configuration(format!(
                    "unknown embedding provider '{}'. Supported: ollama, openai",
                    other
                )));
            }
        }

        if self.hybrid.candidate_multiplier == 0 {
            return Err(CourseFinderError::Configuration(
                "hybrid.candidate_multiplier must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|value| value.parse().ok())
}

impl Default for CourseFinderConfig {
    fn default() -> Self {
        Self::new("data")
    }
}
