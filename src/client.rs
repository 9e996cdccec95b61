use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::aliases::{AliasTables, DepartmentResolver, UniversityNormalizer};
use crate::catalog::load_catalog;
use crate::core::config::CourseFinderConfig;
use crate::core::Result;
use crate::extraction::{EntityExtractor, ExtractedFilters};
use crate::llm::embeddings::EmbeddingProvider;
use crate::llm::factory::EmbeddingProviderFactory;
use crate::search::filter::{FilterBuilder, FilterQuery};
use crate::search::memory_store::InMemoryCourseStore;
use crate::search::retriever::{Retrieval, StagedRetriever};
use crate::search::store::{CourseDocument, VectorStore};
use crate::toolkit::courses::{CourseQuery, CourseSearcher};
use crate::toolkit::curriculum::{CurriculumAssembler, CurriculumPlan, CurriculumRequest};
use crate::toolkit::listing::{DepartmentLister, DepartmentMatch, DepartmentOffering};


/// Entry point wiring alias tables, extraction, retrieval, listing and
/// curriculum planning over one store and embedding provider.
pub struct CourseFinder {
    config: CourseFinderConfig,
    tables: Arc<AliasTables>,
    universities: Arc<UniversityNormalizer>,
    departments: Arc<DepartmentResolver>,
    extractor: Arc<EntityExtractor>,
    retriever: Arc<StagedRetriever>,
    searcher: CourseSearcher,
    lister: DepartmentLister,
    assembler: CurriculumAssembler,
}

impl CourseFinder {
    pub fn new(
        config: CourseFinderConfig,
        tables: Arc<AliasTables>,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let universities = Arc::new(UniversityNormalizer::new(tables.clone()));
        let departments = Arc::new(DepartmentResolver::new(tables.clone()));
        let extractor = Arc::new(EntityExtractor::new(universities.clone(), departments.clone()));
        let retriever = Arc::new(StagedRetriever::new(store.clone(), departments.clone()));

        Self {
            searcher: CourseSearcher::new(extractor.clone(), retriever.clone()),
            lister: DepartmentLister::new(store, embedder, universities.clone(), config.hybrid.clone()),
            assembler: CurriculumAssembler::new(retriever.clone()),
            config,
            tables,
            universities,
            departments,
            extractor,
            retriever,
        }
    }

    /// Loads the alias tables and the catalog named by `config` and indexes
    /// the catalog in memory with `embedder`.
    pub async fn open(config: CourseFinderConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        config.validate()?;

        let tables = Arc::new(AliasTables::load(&config));
        if tables.is_degraded() {
            warn!("Running with incomplete alias tables; names pass through unnormalized");
        }

        let documents = load_catalog(&config.catalog_path)?;
        let store = InMemoryCourseStore::index(embedder.clone(), documents).await?;
        info!("CourseFinder ready: {} courses indexed", store.len());

        Ok(Self::new(config, tables, Arc::new(store), embedder))
    }

    /// [`open`](Self::open) with the HTTP embedding provider the config names.
    pub async fn from_config(config: CourseFinderConfig) -> Result<Self> {
        let embedder = Arc::new(EmbeddingProviderFactory::from_config(&config)?);
        let finder = Self::open(config, embedder.clone()).await?;

        let stats = embedder.cache().stats();
        debug!(
            "Embedding cache after indexing: {} entries, {} hits, {} misses ({:.2} hit rate)",
            stats.size, stats.hits, stats.misses, stats.hit_rate
        );
        Ok(finder)
    }


    pub fn config(&self) -> &CourseFinderConfig {
        &self.config
    }


    pub fn alias_tables(&self) -> &AliasTables {
        &self.tables
    }

    pub fn extract(&self, text: &str) -> ExtractedFilters {
        self.extractor.extract(text)
    }

    pub fn build_filter(&self, filters: &ExtractedFilters) -> Option<FilterQuery> {
        FilterBuilder::build(filters)
    }

    pub fn normalize_university(&self, raw: &str) -> String {
        self.universities.normalize(raw)
    }

    pub fn normalize_department(&self, raw: &str) -> String {
        self.departments.normalize(raw)
    }

    pub fn department_variants(&self, raw: &str) -> Vec<String> {
        self.departments.variants(raw)
    }

    pub async fn retrieve(
        &self,
        query: &str,
        filter: Option<&FilterQuery>,
        k: usize,
    ) -> Result<Vec<CourseDocument>> {
        self.retriever.retrieve(query, filter, k).await
    }

    pub async fn search_courses(&self, query: &CourseQuery) -> Result<Vec<CourseDocument>> {
        self.searcher.search_courses(query).await
    }

    pub async fn search_detailed(&self, query: &CourseQuery) -> Result<Retrieval> {
        self.searcher.search_detailed(query).await
    }

    pub async fn list_departments(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        self.lister.list_departments(query, top_k).await
    }

    pub async fn universities_for_department(&self, department: &str) -> Result<Vec<DepartmentOffering>> {
        self.lister.universities_for_department(department).await
    }

    pub async fn match_department(&self, text: &str) -> Result<Option<DepartmentMatch>> {
        self.lister.match_department(text).await
    }

    pub async fn recommend(&self, request: &CurriculumRequest) -> CurriculumPlan {
        self.assembler.recommend(request).await
    }
}
