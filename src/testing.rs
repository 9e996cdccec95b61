//! Deterministic doubles shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::aliases::AliasTables;
use crate::llm::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::search::filter::FilterQuery;
use crate::search::store::{CourseDocument, CourseMetadata, StoreError, VectorStore};

const DIMENSIONS: usize = 64;

pub fn bundled_tables() -> Arc<AliasTables> {
    Arc::new(
        AliasTables::from_json(
            include_str!("../data/univ_mapping.json"),
            include_str!("../data/department_mapping.json"),
        )
        .unwrap(),
    )
}

/// Bag-of-characters embedding: texts sharing syllables are close.
#[derive(Default)]
pub struct CharEmbedder {
    pub single_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
}

impl CharEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; DIMENSIONS];
        for c in text.chars().filter(|c| !c.is_whitespace()) {
            v[c as usize % DIMENSIONS] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for CharEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}


pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::InvalidResponse("embedding service down".to_string()))
    }
}


pub fn course(
    university: &str,
    department: &str,
    name: &str,
    grade: &str,
    semester: &str,
) -> CourseDocument {
    CourseDocument {
        content: format!("과목명: {}", name),
        metadata: CourseMetadata {
            university: university.to_string(),
            college: "공과대학".to_string(),
            department: department.to_string(),
            name: name.to_string(),
            grade: grade.to_string(),
            semester: semester.to_string(),
            grade_semester: format!("{} {}", grade, semester),
            ..Default::default()
        },
    }
}

/// Filters locally, returns matches in insertion order, and records every
/// filter it was queried with.
#[derive(Default)]
pub struct RecordingStore {
    pub documents: Vec<CourseDocument>,
    pub queries: Mutex<Vec<Option<FilterQuery>>>,
    pub fail_on: Option<(String, String)>,
}

impl RecordingStore {
    pub fn new(documents: Vec<CourseDocument>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    /// Errors whenever the filter pins `grade` and `semester` to these values.
    pub fn failing_on(mut self, grade: &str, semester: &str) -> Self {
        self.fail_on = Some((grade.to_string(), semester.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().len()
    }
}

#[async_trait]
impl VectorStore for RecordingStore {
    async fn nearest_neighbors(
        &self,
        _query: &str,
        k: usize,
        filter: Option<&FilterQuery>,
    ) -> Result<Vec<CourseDocument>, StoreError> {
        self.queries.lock().push(filter.cloned());

        if let (Some((grade, semester)), Some(filter)) = (&self.fail_on, filter) {
            let pinned = |field, value: &str| {
                filter
                    .find(field)
                    .and_then(|leaf| leaf.equals_value())
                    .is_some_and(|v| v == value)
            };
            if pinned(crate::extraction::FilterField::Grade, grade)
                && pinned(crate::extraction::FilterField::Semester, semester)
            {
                return Err(StoreError::Backend("connection reset".to_string()));
            }
        }

        Ok(self
            .documents
            .iter()
            .filter(|doc| filter.is_none_or(|f| f.matches(&doc.metadata)))
            .take(k)
            .cloned()
            .collect())
    }

    async fn scan_metadata(&self) -> Result<Vec<CourseMetadata>, StoreError> {
        Ok(self.documents.iter().map(|doc| doc.metadata.clone()).collect())
    }
}
