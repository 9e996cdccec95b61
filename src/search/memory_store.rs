use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::filter::FilterQuery;
use super::store::{CourseDocument, CourseMetadata, StoreError, VectorStore};
use crate::llm::embeddings::EmbeddingProvider;
use crate::llm::similarity::rank_by_similarity;


/// Brute-force vector store over an in-process document set. Documents are
/// embedded once when the store is built.
pub struct InMemoryCourseStore {
    embedder: Arc<dyn EmbeddingProvider>,
    documents: Vec<CourseDocument>,
    embeddings: Vec<Vec<f32>>,
}

impl InMemoryCourseStore {
    pub async fn index(
        embedder: Arc<dyn EmbeddingProvider>,
        documents: Vec<CourseDocument>,
    ) -> Result<Self, StoreError> {
        let texts: Vec<String> = documents.iter().map(|doc| doc.content.clone()).collect();
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            embedder.embed_batch(&texts).await?
        };

        if embeddings.len() != documents.len() {
            return Err(StoreError::Backend(format!(
                "embedded {} of {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        info!("Indexed {} course documents", documents.len());
        Ok(Self {
            embedder,
            documents,
            embeddings,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl VectorStore for InMemoryCourseStore {
    async fn nearest_neighbors(
        &self,
        query: &str,
        k: usize,
        filter: Option<&FilterQuery>,
    ) -> Result<Vec<CourseDocument>, StoreError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let candidates: Vec<usize> = (0..self.documents.len())
            .filter(|&i| filter.is_none_or(|f| f.matches(&self.documents[i].metadata)))
            .collect();

        if candidates.is_empty() {
            debug!("Filter excluded every document");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let candidate_embeddings: Vec<Vec<f32>> =
            candidates.iter().map(|&i| self.embeddings[i].clone()).collect();

        Ok(rank_by_similarity(&query_embedding, &candidate_embeddings)
            .into_iter()
            .take(k)
            .map(|(position, _)| self.documents[candidates[position]].clone())
            .collect())
    }

    async fn scan_metadata(&self) -> Result<Vec<CourseMetadata>, StoreError> {
        Ok(self.documents.iter().map(|doc| doc.metadata.clone()).collect())
    }
}
