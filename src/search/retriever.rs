use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::filter::{FilterLeaf, FilterQuery};
use super::store::{CourseDocument, VectorStore};
use crate::aliases::DepartmentResolver;
use crate::core::Result;
use crate::extraction::FilterField;


/// Which round of the search produced the documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStage {
    /// No filter was given.
    Unfiltered,
    Exact,
    /// The department leaf was widened to its variant set.
    Relaxed,
    /// Every allowed round came back empty.
    Exhausted,
}


#[derive(Debug, Clone, Serialize)]
pub struct Retrieval {
    pub documents: Vec<CourseDocument>,
    pub stage: RetrievalStage,
}

impl Retrieval {
    fn new(documents: Vec<CourseDocument>, stage: RetrievalStage) -> Self {
        Self { documents, stage }
    }
}


/// Filtered nearest-neighbor search that widens the department constraint
/// once when the exact filter finds nothing. There is no unfiltered fallback.
pub struct StagedRetriever {
    store: Arc<dyn VectorStore>,
    departments: Arc<DepartmentResolver>,
}

impl StagedRetriever {
    pub fn new(store: Arc<dyn VectorStore>, departments: Arc<DepartmentResolver>) -> Self {
        Self { store, departments }
    }

    pub async fn retrieve(
        &self,
        query: &str,
        filter: Option<&FilterQuery>,
        k: usize,
    ) -> Result<Vec<CourseDocument>> {
        Ok(self.retrieve_detailed(query, filter, k).await?.documents)
    }

    pub async fn retrieve_detailed(
        &self,
        query: &str,
        filter: Option<&FilterQuery>,
        k: usize,
    ) -> Result<Retrieval> {
        let Some(filter) = filter else {
            let documents = self.store.nearest_neighbors(query, k, None).await?;
            debug!("Unfiltered search returned {} documents", documents.len());
            return Ok(Retrieval::new(documents, RetrievalStage::Unfiltered));
        };

        let documents = self.store.nearest_neighbors(query, k, Some(filter)).await?;
        if !documents.is_empty() {
            debug!("Exact filter returned {} documents", documents.len());
            return Ok(Retrieval::new(documents, RetrievalStage::Exact));
        }

        let Some(relaxed) = self.relax(filter) else {
            debug!("Exact filter empty and no department to relax");
            return Ok(Retrieval::new(Vec::new(), RetrievalStage::Exhausted));
        };

        info!("Exact filter empty, retrying with relaxed department filter");
        let documents = self.store.nearest_neighbors(query, k, Some(&relaxed)).await?;
        let stage = if documents.is_empty() {
            RetrievalStage::Exhausted
        } else {
            RetrievalStage::Relaxed
        };

        debug!("Relaxed filter returned {} documents", documents.len());
        Ok(Retrieval::new(documents, stage))
    }

    /// Replaces the department EQUALS leaf with MEMBER_OF its variants.
    fn relax(&self, filter: &FilterQuery) -> Option<FilterQuery> {
        let (leaf, rest) = filter.split_off(FilterField::Department)?;
        let department = leaf.equals_value()?;

        let variants = self.departments.variants(department);
        if variants.is_empty() {
            return None;
        }

        debug!("Relaxing department '{}' to {:?}", department, variants);
        Some(FilterQuery::combine(
            rest,
            FilterLeaf::member_of(FilterField::Department, variants),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::filter::Condition;
    use crate::testing::{bundled_tables, course, RecordingStore};

    fn retriever(store: Arc<RecordingStore>) -> StagedRetriever {
        StagedRetriever::new(store, Arc::new(DepartmentResolver::new(bundled_tables())))
    }

    fn uni_and_dept(university: &str, department: &str) -> FilterQuery {
        FilterQuery::And(vec![
            FilterLeaf::equals(FilterField::University, university),
            FilterLeaf::equals(FilterField::Department, department),
        ])
    }

    #[tokio::test]
    async fn test_unfiltered() {
        let store = Arc::new(RecordingStore::new(vec![
            course("홍익대학교", "컴퓨터공학", "자료구조", "2학년", "1학기"),
        ]));
        let result = retriever(store.clone()).retrieve_detailed("q", None, 5).await.unwrap();

        assert_eq!(result.stage, RetrievalStage::Unfiltered);
        assert_eq!(result.documents.len(), 1);
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_exact_hit_skips_relaxation() {
        let store = Arc::new(RecordingStore::new(vec![
            course("홍익대학교", "컴퓨터공학", "자료구조", "2학년", "1학기"),
        ]));
        let filter = uni_and_dept("홍익대학교", "컴퓨터공학");
        let result = retriever(store.clone())
            .retrieve_detailed("q", Some(&filter), 5)
            .await
            .unwrap();

        assert_eq!(result.stage, RetrievalStage::Exact);
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_relaxation_recovers_within_variants() {
        let store = Arc::new(RecordingStore::new(vec![
            course("홍익대학교", "컴퓨터공학과", "자료구조", "2학년", "1학기"),
            course("홍익대학교", "경영학과", "회계원리", "1학년", "1학기"),
            course("한양대학교", "컴퓨터공학과", "운영체제", "3학년", "1학기"),
        ]));
        let filter = uni_and_dept("홍익대학교", "컴퓨터공학");
        let result = retriever(store.clone())
            .retrieve_detailed("q", Some(&filter), 5)
            .await
            .unwrap();

        assert_eq!(result.stage, RetrievalStage::Relaxed);
        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.documents[0].metadata.name, "자료구조");
        assert_eq!(store.calls(), 2);

        let queries = store.queries.lock();
        let relaxed = queries[1].as_ref().unwrap();
        assert_eq!(
            relaxed.find(FilterField::University).and_then(|l| l.equals_value()),
            Some("홍익대학교")
        );
        match &relaxed.find(FilterField::Department).unwrap().condition {
            Condition::MemberOf(values) => assert!(values.contains(&"컴퓨터공학과".to_string())),
            other => panic!("expected MEMBER_OF, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_department_leaf_relaxes_to_bare_leaf() {
        let store = Arc::new(RecordingStore::new(vec![
            course("건국대학교", "경영학부", "경영학원론", "1학년", "1학기"),
        ]));
        let filter = FilterQuery::Leaf(FilterLeaf::equals(FilterField::Department, "경영학"));
        let result = retriever(store.clone())
            .retrieve_detailed("q", Some(&filter), 5)
            .await
            .unwrap();

        assert_eq!(result.stage, RetrievalStage::Relaxed);
        assert!(matches!(store.queries.lock()[1], Some(FilterQuery::Leaf(_))));
    }

    #[tokio::test]
    async fn test_no_department_leaf_returns_empty() {
        let store = Arc::new(RecordingStore::new(vec![
            course("홍익대학교", "컴퓨터공학", "자료구조", "2학년", "1학기"),
        ]));
        let filter = FilterQuery::Leaf(FilterLeaf::equals(FilterField::University, "서울대학교"));
        let result = retriever(store.clone())
            .retrieve_detailed("q", Some(&filter), 5)
            .await
            .unwrap();

        assert_eq!(result.stage, RetrievalStage::Exhausted);
        assert!(result.documents.is_empty());
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_relaxed_miss_is_empty_without_third_round() {
        let store = Arc::new(RecordingStore::new(vec![
            course("홍익대학교", "경영학과", "회계원리", "1학년", "1학기"),
        ]));
        let filter = uni_and_dept("홍익대학교", "철학");
        let documents = retriever(store.clone()).retrieve("q", Some(&filter), 5).await.unwrap();

        assert!(documents.is_empty());
        assert_eq!(store.calls(), 2);
    }
}
