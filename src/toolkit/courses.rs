use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::MISSING;
use crate::core::Result;
use crate::extraction::{EntityExtractor, ExtractedFilters, FilterField};
use crate::search::filter::FilterBuilder;
use crate::search::retriever::{Retrieval, StagedRetriever};
use crate::search::store::CourseDocument;
use crate::toolkit::curriculum::models::{DEFAULT_QUERY, UNNAMED_COURSE};

pub const RESTRICTED_DESCRIPTION: &str =
    "[대학 정책상 열람이 제한됩니다. 자세한 사항은 학과 홈페이지를 참고해주세요.]";


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseQuery {
    pub query: Option<String>,
    pub university: Option<String>,
    pub college: Option<String>,
    pub department: Option<String>,
    pub grade: Option<String>,
    pub semester: Option<String>,
    pub top_k: usize,
}

impl Default for CourseQuery {
    fn default() -> Self {
        Self {
            query: None,
            university: None,
            college: None,
            department: None,
            grade: None,
            semester: None,
            top_k: 5,
        }
    }
}

impl CourseQuery {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    /// Explicit filters in field order.
    pub fn explicit_filters(&self) -> ExtractedFilters {
        let explicit = [
            (FilterField::University, &self.university),
            (FilterField::College, &self.college),
            (FilterField::Department, &self.department),
            (FilterField::Grade, &self.grade),
            (FilterField::Semester, &self.semester),
        ];

        explicit
            .into_iter()
            .filter_map(|(field, value)| value.as_deref().map(|v| (field, v.to_string())))
            .collect()
    }

    /// The free-text query, else the explicit values joined by spaces, else
    /// the generic recommendation query.
    pub fn effective_query(&self) -> String {
        if let Some(query) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            return query.to_string();
        }

        let explicit = self.explicit_filters();
        if explicit.is_empty() {
            return DEFAULT_QUERY.to_string();
        }
        explicit.iter().map(|(_, value)| value).collect::<Vec<_>>().join(" ")
    }
}


/// Flat rendering of a retrieved course with placeholders for gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseView {
    pub id: String,
    pub name: String,
    pub university: String,
    pub college: String,
    pub department: String,
    pub grade_semester: String,
    pub classification: String,
    pub description: String,
}

impl CourseView {
    pub fn new(index: usize, document: &CourseDocument) -> Self {
        let meta = &document.metadata;
        let or_missing = |value: &str, placeholder: &str| match value {
            "" => placeholder.to_string(),
            _ => value.to_string(),
        };

        Self {
            id: format!("course_{}", index),
            name: or_missing(&meta.name, UNNAMED_COURSE),
            university: or_missing(&meta.university, MISSING),
            college: or_missing(&meta.college, MISSING),
            department: or_missing(&meta.department, MISSING),
            grade_semester: or_missing(&meta.grade_semester, MISSING),
            classification: or_missing(&meta.classification, MISSING),
            description: or_missing(&document.content, RESTRICTED_DESCRIPTION),
        }
    }

    pub fn from_documents(documents: &[CourseDocument]) -> Vec<Self> {
        documents
            .iter()
            .enumerate()
            .map(|(i, doc)| Self::new(i, doc))
            .collect()
    }
}


/// Free-text course search: extraction, explicit overrides, filter build,
/// staged retrieval.
pub struct CourseSearcher {
    extractor: Arc<EntityExtractor>,
    retriever: Arc<StagedRetriever>,
}

impl CourseSearcher {
    pub fn new(extractor: Arc<EntityExtractor>, retriever: Arc<StagedRetriever>) -> Self {
        Self {
            extractor,
            retriever,
        }
    }

    /// Extracted filters overridden field by field by explicit parameters.
    pub fn resolve_filters(&self, query: &CourseQuery) -> ExtractedFilters {
        let text = query.effective_query();
        self.extractor.extract(&text).merged_with(&query.explicit_filters())
    }

    pub async fn search_detailed(&self, query: &CourseQuery) -> Result<Retrieval> {
        let text = query.effective_query();
        let filters = self.resolve_filters(query);
        debug!("Course search '{}' with filters {:?}", text, filters);

        let filter = FilterBuilder::build(&filters);
        let retrieval = self
            .retriever
            .retrieve_detailed(&text, filter.as_ref(), query.top_k)
            .await?;

        info!(
            "Found {} courses for '{}' ({:?})",
            retrieval.documents.len(),
            crate::safe_truncate(&text, 50),
            retrieval.stage
        );
        Ok(retrieval)
    }

    pub async fn search_courses(&self, query: &CourseQuery) -> Result<Vec<CourseDocument>> {
        Ok(self.search_detailed(query).await?.documents)
    }
}
