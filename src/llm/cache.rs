use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};


pub struct EmbeddingCache {
    cache: Mutex<LruCache<String, (Vec<f32>, Instant)>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub hit_rate: f64,
}

impl EmbeddingCache {
    /// A zero capacity is treated as one entry.
    pub fn new(capacity: usize, ttl_secs: u64) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(ttl_secs),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        let mut cache = self.cache.lock();
        let expired = match cache.get(key) {
            Some((embedding, created_at)) if created_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(embedding.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            cache.pop(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn set(&self, key: &str, embedding: Vec<f32>) {
        self.cache.lock().put(key.to_string(), (embedding, Instant::now()));
    }

    /// Keys include the model so switching models never serves stale vectors.
    pub fn make_key(model: &str, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(model.as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 { hits as f64 / total as f64 } else { 0.0 };

        CacheStats {
            hits,
            misses,
            size: self.cache.lock().len(),
            hit_rate,
        }
    }
}
