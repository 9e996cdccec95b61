use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::filter::FilterQuery;
use crate::extraction::FilterField;
use crate::llm::embeddings::EmbeddingError;


#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
}


#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMetadata {
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub grade_semester: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default, alias = "course_classification")]
    pub classification: String,
}

impl CourseMetadata {

    pub fn field(&self, field: FilterField) -> &str {
        match field {
            FilterField::University => &self.university,
            FilterField::College => &self.college,
            FilterField::Department => &self.department,
            FilterField::Grade => &self.grade,
            FilterField::Semester => &self.semester,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDocument {
    pub content: String,
    pub metadata: CourseMetadata,
}


/// Nearest-neighbor search over course documents.
///
/// Implementations return an empty list, not an error, when the filter
/// excludes everything.
#[async_trait]
pub trait VectorStore: Send + Sync {

    async fn nearest_neighbors(
        &self,
        query: &str,
        k: usize,
        filter: Option<&FilterQuery>,
    ) -> Result<Vec<CourseDocument>, StoreError>;

    /// Bulk metadata scan used to enumerate departments.
    async fn scan_metadata(&self) -> Result<Vec<CourseMetadata>, StoreError>;
}

