use std::sync::Arc;

use tracing::debug;

use super::loader::AliasTables;
use super::models::DepartmentCategory;
use crate::utils::{dedup_preserving_order, strip_department_suffix, DEPARTMENT_SUFFIXES};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// `raw` is one of the category's alias departments.
    Exact(&'a DepartmentCategory),
    /// `raw` overlaps one of the category's alias keywords.
    Keyword {
        category: &'a DepartmentCategory,
        keyword: &'a str,
    },
    Unmapped,
}

impl<'a> Resolution<'a> {
    pub fn category(&self) -> Option<&'a DepartmentCategory> {
        match *self {
            Resolution::Exact(category) | Resolution::Keyword { category, .. } => Some(category),
            Resolution::Unmapped => None,
        }
    }
}


/// Maps department spellings onto alias categories.
///
/// Both [`normalize`](Self::normalize) and [`variants`](Self::variants) go
/// through [`resolve`](Self::resolve), so they always agree on the category.
pub struct DepartmentResolver {
    tables: Arc<AliasTables>,
}

impl DepartmentResolver {
    pub fn new(tables: Arc<AliasTables>) -> Self {
        Self { tables }
    }


    pub fn resolve<'a>(&'a self, raw: &str) -> Resolution<'a> {
        if raw.is_empty() {
            return Resolution::Unmapped;
        }

        let categories = self.tables.categories();

        if let Some(category) = categories.iter().find(|c| c.contains_department(raw)) {
            return Resolution::Exact(category);
        }

        categories
            .iter()
            .find_map(|category| {
                category
                    .matching_keyword(raw)
                    .map(|keyword| Resolution::Keyword { category, keyword })
            })
            .unwrap_or(Resolution::Unmapped)
    }

    /// Representative spelling with its 과/부 suffix removed.
    pub fn normalize(&self, raw: &str) -> String {
        let resolution = self.resolve(raw);

        let normalized = match resolution.category().and_then(|c| c.representative()) {
            Some(representative) => strip_department_suffix(representative),
            None => strip_department_suffix(raw),
        };

        match resolution {
            Resolution::Exact(category) => debug!(
                "Department normalized: '{}' -> '{}' ({})",
                raw, normalized, category.canonical_label
            ),
            Resolution::Keyword { keyword, .. } => debug!(
                "Department normalized: '{}' -> '{}' (keyword '{}')",
                raw, normalized, keyword
            ),
            Resolution::Unmapped => debug!(
                "Department normalized: '{}' -> '{}' (no mapping)",
                raw, normalized
            ),
        }

        normalized.to_string()
    }

    /// Every spelling treated as equivalent to `raw`. Unmapped names get the
    /// synthetic suffix variants; empty input has none.
    pub fn variants(&self, raw: &str) -> Vec<String> {
        if raw.is_empty() {
            return Vec::new();
        }

        if let Some(category) = self.resolve(raw).category() {
            if !category.alias_departments.is_empty() {
                debug!(
                    "Department variants: '{}' -> {} names from {}",
                    raw,
                    category.alias_departments.len(),
                    category.canonical_label
                );
                return category.alias_departments.clone();
            }
        }

        let base = strip_department_suffix(raw);
        let variants = std::iter::once(base.to_string())
            .chain(DEPARTMENT_SUFFIXES.iter().map(|suffix| format!("{}{}", base, suffix)));

        dedup_preserving_order(variants)
    }
}
