use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::categories::{expand_query, is_list_all};
use super::scoring::{lexical_score, normalize_lexical, HybridWeights};
use crate::aliases::{UniversityNormalizer, OFFICIAL_SUFFIX};
use crate::core::{CourseFinderError, Result};
use crate::extraction::patterns::UNIVERSITY_PREFIX_PATTERN;
use crate::llm::embeddings::EmbeddingProvider;
use crate::llm::similarity::rank_by_similarity;
use crate::search::store::VectorStore;

pub const NO_RESULTS_PLACEHOLDER: &str = "검색 결과가 없습니다. 다른 키워드로 검색해보세요.";


/// One (university, college, department) row of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DepartmentOffering {
    pub university: String,
    pub college: String,
    pub department: String,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentMatch {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    pub matched_department: String,
    pub similarity: f32,
}


struct DepartmentIndex {
    names: Vec<String>,
    embeddings: Vec<Vec<f32>>,
}


/// Department enumeration, hybrid category listing and fuzzy department
/// matching over the store's metadata.
///
/// The metadata scan and the department embedding matrix are each computed
/// once per lister; concurrent first callers wait on the same initialization.
pub struct DepartmentLister {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    universities: Arc<UniversityNormalizer>,
    weights: HybridWeights,
    offerings: OnceCell<Vec<DepartmentOffering>>,
    index: OnceCell<DepartmentIndex>,
}

impl DepartmentLister {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        universities: Arc<UniversityNormalizer>,
        weights: HybridWeights,
    ) -> Self {
        Self {
            store,
            embedder,
            universities,
            weights,
            offerings: OnceCell::new(),
            index: OnceCell::new(),
        }
    }

    async fn offerings(&self) -> Result<&[DepartmentOffering]> {
        let offerings = self
            .offerings
            .get_or_try_init(|| async {
                let rows: Vec<DepartmentOffering> = self
                    .store
                    .scan_metadata()
                    .await?
                    .into_iter()
                    .filter(|meta| !meta.department.is_empty())
                    .map(|meta| DepartmentOffering {
                        university: meta.university,
                        college: meta.college,
                        department: meta.department,
                    })
                    .collect();

                info!("Scanned {} department rows", rows.len());
                Ok::<_, CourseFinderError>(rows)
            })
            .await?;

        Ok(offerings.as_slice())
    }

    /// Sorted distinct department names.
    pub async fn department_names(&self) -> Result<Vec<String>> {
        let names: BTreeSet<&str> = self
            .offerings()
            .await?
            .iter()
            .map(|row| row.department.as_str())
            .collect();

        Ok(names.into_iter().map(str::to_string).collect())
    }

    async fn index(&self) -> Result<&DepartmentIndex> {
        self.index
            .get_or_try_init(|| async {
                let names = self.department_names().await?;
                let embeddings = if names.is_empty() {
                    Vec::new()
                } else {
                    self.embedder.embed_batch(&names).await?
                };

                info!("Embedded {} department names", names.len());
                Ok::<_, CourseFinderError>(DepartmentIndex { names, embeddings })
            })
            .await
    }

    /// Hybrid-ranked department names for a category or keyword query.
    /// Blank input and "전체" list every department.
    pub async fn list_departments(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        if is_list_all(query) {
            let names = self.department_names().await?;
            info!("Listing all {} departments", names.len());
            return Ok(names);
        }

        let ranked = self.rank_departments(query, top_k).await?;
        if ranked.is_empty() {
            info!("No departments matched '{}'", query);
            return Ok(vec![NO_RESULTS_PLACEHOLDER.to_string()]);
        }

        Ok(ranked.into_iter().map(|(name, _)| name).collect())
    }

    /// Up to `top_k` departments with positive combined score, best first;
    /// equal scores are ordered by name.
    pub async fn rank_departments(&self, query: &str, top_k: usize) -> Result<Vec<(String, f64)>> {
        let expanded = expand_query(query);
        let tokens: Vec<String> = expanded.tokens.iter().map(|t| t.to_lowercase()).collect();
        debug!("Expanded '{}' into tokens {:?}", query, tokens);

        let mut lexical: HashMap<&str, f64> = HashMap::new();
        for row in self.offerings().await? {
            let score = lexical_score(&tokens, &row.university, &row.college, &row.department);
            if score > 0.0 {
                let best = lexical.entry(row.department.as_str()).or_insert(0.0);
                *best = best.max(score);
            }
        }
        debug!("Lexical matches: {}", lexical.len());

        let mut vector: HashMap<&str, f64> = HashMap::new();
        let index = self.index().await?;
        if !index.names.is_empty() && !expanded.embedding_text.is_empty() {
            let query_embedding = self.embedder.embed(&expanded.embedding_text).await?;
            for (i, similarity) in rank_by_similarity(&query_embedding, &index.embeddings)
                .into_iter()
                .take(self.weights.vector_candidates(top_k))
            {
                vector.insert(index.names[i].as_str(), f64::from(similarity));
            }
        }
        debug!("Vector candidates: {}", vector.len());

        let names: BTreeSet<&str> = lexical.keys().chain(vector.keys()).copied().collect();
        let mut scored: Vec<(String, f64)> = names
            .into_iter()
            .filter_map(|name| {
                let combined = self.weights.combine(
                    vector.get(name).copied(),
                    lexical.get(name).copied().map(normalize_lexical),
                )?;
                Some((name.to_string(), combined))
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(top_k);

        for (rank, (name, score)) in scored.iter().enumerate() {
            debug!("{}. {} (score: {:.3})", rank + 1, name, score);
        }
        Ok(scored)
    }

    /// Rows whose department equals or contains `department`, sorted.
    pub async fn universities_for_department(&self, department: &str) -> Result<Vec<DepartmentOffering>> {
        let department = department.trim();
        if department.is_empty() {
            return Ok(Vec::new());
        }

        let rows: BTreeSet<&DepartmentOffering> = self
            .offerings()
            .await?
            .iter()
            .filter(|row| row.department.contains(department))
            .collect();

        info!("Found {} universities offering '{}'", rows.len(), department);
        Ok(rows.into_iter().cloned().collect())
    }

    /// Nearest known department name to free text such as "컴공" or "홍대 컴공".
    /// A recognised leading university is split off and returned normalized.
    pub async fn match_department(&self, text: &str) -> Result<Option<DepartmentMatch>> {
        let (university, department_text) = self.split_university(text.trim());
        if department_text.is_empty() {
            debug!("No department text left in '{}'", text);
            return Ok(None);
        }

        let index = self.index().await?;
        if index.names.is_empty() {
            return Ok(None);
        }

        let query_embedding = self.embedder.embed(department_text).await?;
        let Some((best, similarity)) = rank_by_similarity(&query_embedding, &index.embeddings)
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        let matched = DepartmentMatch {
            input: text.to_string(),
            university,
            matched_department: index.names[best].clone(),
            similarity,
        };
        info!(
            "Matched '{}' -> '{}' (similarity: {:.3})",
            text, matched.matched_department, similarity
        );
        Ok(Some(matched))
    }

    fn split_university<'t>(&self, text: &'t str) -> (Option<String>, &'t str) {
        let mut tokens = text.splitn(2, char::is_whitespace);
        if let (Some(first), Some(rest)) = (tokens.next(), tokens.next()) {
            if let Some(university) = self.recognise_university(first) {
                return (Some(university), rest.trim());
            }
        }

        if let Some(prefix) = UNIVERSITY_PREFIX_PATTERN.find(text) {
            if let Some(university) = self.recognise_university(prefix.as_str()) {
                return (Some(university), text[prefix.end()..].trim());
            }
        }

        (None, text)
    }

    fn recognise_university(&self, token: &str) -> Option<String> {
        let mut normalized = self.universities.normalize(token);
        if normalized == token && !normalized.ends_with(OFFICIAL_SUFFIX) {
            return None;
        }
        if !normalized.ends_with(OFFICIAL_SUFFIX) {
            normalized.push_str(OFFICIAL_SUFFIX);
        }
        Some(normalized)
    }
}
