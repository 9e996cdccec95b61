use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::cache::EmbeddingCache;

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";


#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty text")]
    EmptyText,

    #[error("Provider not implemented: {0}")]
    NotImplemented(String),
}


/// Text to vector. `embed_batch` returns vectors in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}


#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    OpenAi,
}

impl ProviderKind {
    pub fn parse(name: &str) -> Result<Self, EmbeddingError> {
        match name.to_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(EmbeddingError::NotImplemented(other.to_string())),
        }
    }
}


pub struct HttpEmbeddingProvider {
    kind: ProviderKind,
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
    cache: EmbeddingCache,
    max_concurrency: usize,
}

impl HttpEmbeddingProvider {
    pub fn new(
        kind: ProviderKind,
        base_url: Option<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: u64,
        cache_size: usize,
        cache_ttl: u64,
    ) -> Result<Self, EmbeddingError> {
        let model = model.into();
        let base_url = match (kind, base_url) {
            (_, Some(url)) => url.trim_end_matches('/').to_string(),
            (ProviderKind::Ollama, None) => crate::DEFAULT_OLLAMA_URL.to_string(),
            (ProviderKind::OpenAi, None) => DEFAULT_OPENAI_URL.to_string(),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        info!(
            "HttpEmbeddingProvider initialized: provider={:?}, model={}, cache={}",
            kind, model, cache_size
        );

        Ok(Self {
            kind,
            base_url,
            model,
            api_key,
            client,
            cache: EmbeddingCache::new(cache_size, cache_ttl),
            max_concurrency: crate::DEFAULT_EMBEDDING_CONCURRENCY,
        })
    }

    /// Caps the requests `embed_batch` keeps in flight. Zero is treated as one.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    async fn request_ollama(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<OllamaEmbeddingResponse>()
            .await?;

        Ok(response.embedding)
    }

    async fn request_openai(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| EmbeddingError::InvalidResponse("API key required".to_string()))?;

        let request = OpenAIEmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<OpenAIEmbeddingResponse>()
            .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("No embedding in response".to_string()))
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }

        let key = EmbeddingCache::make_key(&self.model, text);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache HIT for: {}...", crate::safe_truncate(text, 50));
            return Ok(cached);
        }

        let embedding = match self.kind {
            ProviderKind::Ollama => self.request_ollama(text).await?,
            ProviderKind::OpenAi => self.request_openai(text).await?,
        };

        self.cache.set(&key, embedding.clone());
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        debug!(
            "Embedding batch of {} texts (max {} in flight)",
            texts.len(),
            self.max_concurrency
        );

        let requests: Vec<_> = texts.iter().map(|text| self.embed(text)).collect();
        stream::iter(requests)
            .buffered(self.max_concurrency)
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!(ProviderKind::parse("Ollama").unwrap(), ProviderKind::Ollama);
        assert_eq!(ProviderKind::parse("openai").unwrap(), ProviderKind::OpenAi);
        assert!(matches!(
            ProviderKind::parse("cohere"),
            Err(EmbeddingError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_default_base_urls() {
        let ollama = HttpEmbeddingProvider::new(ProviderKind::Ollama, None, "m", None, 5, 8, 60).unwrap();
        assert_eq!(ollama.base_url, crate::DEFAULT_OLLAMA_URL);

        let openai = HttpEmbeddingProvider::new(
            ProviderKind::OpenAi,
            Some("http://proxy.local/v1/".to_string()),
            "m",
            Some("key".to_string()),
            5,
            8,
            60,
        )
        .unwrap();
        assert_eq!(openai.base_url, "http://proxy.local/v1");
    }

    #[tokio::test]
    async fn test_empty_text_rejected_before_request() {
        let provider = HttpEmbeddingProvider::new(ProviderKind::Ollama, None, "m", None, 5, 8, 60).unwrap();
        assert!(matches!(provider.embed("   ").await, Err(EmbeddingError::EmptyText)));
    }

    #[tokio::test]
    async fn test_cached_vector_served_without_request() {
        let provider = HttpEmbeddingProvider::new(
            ProviderKind::Ollama,
            Some("http://127.0.0.1:9".to_string()),
            "m",
            None,
            1,
            8,
            60,
        )
        .unwrap();
        provider
            .cache()
            .set(&EmbeddingCache::make_key("m", "컴퓨터공학"), vec![0.5, 0.5]);

        assert_eq!(provider.embed("컴퓨터공학").await.unwrap(), vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn test_openai_requires_key() {
        let provider = HttpEmbeddingProvider::new(ProviderKind::OpenAi, None, "m", None, 1, 8, 60).unwrap();
        assert!(matches!(
            provider.embed("text").await,
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }

    /// Serves Ollama-style embeddings, replying `[i]` for prompt `t{i}`
    /// after a short delay, and records the peak number of open requests.
    async fn spawn_counting_server() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let server_peak = peak.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { break };
                let active = active.clone();
                let peak = server_peak.clone();
                tokio::spawn(async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);

                    let body = read_request_body(&mut socket).await;
                    let prompt = serde_json::from_slice::<serde_json::Value>(&body).unwrap()["prompt"]
                        .as_str()
                        .unwrap()
                        .to_string();
                    let index: f32 = prompt.trim_start_matches('t').parse().unwrap();

                    tokio::time::sleep(Duration::from_millis(30)).await;
                    let reply = format!("{{\"embedding\":[{}]}}", index);
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        reply.len(),
                        reply
                    );
                    active.fetch_sub(1, Ordering::SeqCst);
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}", addr), peak)
    }

    async fn read_request_body(socket: &mut TcpStream) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                return Vec::new();
            }
            buffer.extend_from_slice(&chunk[..read]);

            let Some(header_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
            let length: usize = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(0);

            let body_start = header_end + 4;
            if buffer.len() >= body_start + length {
                return buffer[body_start..body_start + length].to_vec();
            }
        }
    }

    #[tokio::test]
    async fn test_batch_respects_concurrency_limit_and_order() {
        let (url, peak) = spawn_counting_server().await;
        let provider = HttpEmbeddingProvider::new(ProviderKind::Ollama, Some(url), "m", None, 5, 64, 60)
            .unwrap()
            .with_max_concurrency(3);

        let texts: Vec<String> = (0..20).map(|i| format!("t{}", i)).collect();
        let embeddings = provider.embed_batch(&texts).await.unwrap();

        let expected: Vec<Vec<f32>> = (0..20).map(|i| vec![i as f32]).collect();
        assert_eq!(embeddings, expected);
        assert!(peak.load(Ordering::SeqCst) <= 3, "peak {}", peak.load(Ordering::SeqCst));
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        let provider = HttpEmbeddingProvider::new(ProviderKind::Ollama, None, "m", None, 5, 8, 60)
            .unwrap()
            .with_max_concurrency(0);
        assert_eq!(provider.max_concurrency(), 1);
    }
}
