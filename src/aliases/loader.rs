use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use super::models::{DepartmentCategory, UniversityAlias};
use crate::core::config::CourseFinderConfig;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed alias table: {0}")]
    Malformed(#[from] serde_json::Error),
}


/// Read-only university and department alias tables.
#[derive(Debug, Clone, Default)]
pub struct AliasTables {
    universities: Vec<UniversityAlias>,
    categories: Vec<DepartmentCategory>,
}

impl AliasTables {
    pub fn new(universities: Vec<UniversityAlias>, categories: Vec<DepartmentCategory>) -> Self {
        Self {
            universities,
            categories,
        }
    }


    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses both tables; any malformed input is an error.
    pub fn from_json(university_json: &str, department_json: &str) -> Result<Self, LoaderError> {
        Ok(Self::new(
            parse_universities(university_json)?,
            parse_categories(department_json)?,
        ))
    }

    /// Loads both tables from the configured paths. A missing or malformed file
    /// leaves that table empty: university names then pass through unchanged and
    /// departments fall back to suffix stripping.
    pub fn load(config: &CourseFinderConfig) -> Self {
        let universities = read_table(&config.university_aliases_path, parse_universities);
        let categories = read_table(&config.department_categories_path, parse_categories);

        info!(
            "Alias tables loaded: {} universities, {} department categories",
            universities.len(),
            categories.len()
        );

        Self::new(universities, categories)
    }


    pub fn universities(&self) -> &[UniversityAlias] {
        &self.universities
    }


    pub fn categories(&self) -> &[DepartmentCategory] {
        &self.categories
    }


    pub fn is_degraded(&self) -> bool {
        self.universities.is_empty() || self.categories.is_empty()
    }
}


pub fn parse_universities(json: &str) -> Result<Vec<UniversityAlias>, LoaderError> {
    Ok(serde_json::from_str(json)?)
}

/// Keeps file order, which decides which category wins when a name appears twice.
pub fn parse_categories(json: &str) -> Result<Vec<DepartmentCategory>, LoaderError> {
    let raw: Map<String, Value> = serde_json::from_str(json)?;

    raw.into_iter()
        .map(|(id, value)| -> Result<DepartmentCategory, LoaderError> {
            let mut category: DepartmentCategory = serde_json::from_value(value)?;
            category.id = id;
            Ok(category)
        })
        .collect()
}

fn read_table<T>(path: &str, parse: fn(&str) -> Result<Vec<T>, LoaderError>) -> Vec<T> {
    let result = std::fs::read_to_string(Path::new(path))
        .map_err(|source| LoaderError::Read {
            path: path.to_string(),
            source,
        })
        .and_then(|text| parse(&text));

    match result {
        Ok(table) => table,
        Err(e) => {
            warn!("Alias table unavailable, running in degraded mode: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIVERSITIES: &str = include_str!("../../data/univ_mapping.json");
    const DEPARTMENTS: &str = include_str!("../../data/department_mapping.json");

    #[test]
    fn test_parse_bundled_tables() {
        let tables = AliasTables::from_json(UNIVERSITIES, DEPARTMENTS).unwrap();
        assert!(!tables.is_degraded());
        assert_eq!(tables.universities()[0].official_name, "홍익대학교");
    }

    #[test]
    fn test_category_order_and_ids_preserved() {
        let categories = parse_categories(DEPARTMENTS).unwrap();
        let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["cs_software_ai", "ee_electronics_ict", "chem_bio_materials"]);
        assert_eq!(categories[0].representative(), Some("컴퓨터공학과"));
    }

    #[test]
    fn test_missing_optional_lists_default_empty() {
        let categories = parse_categories(r#"{"x": {"canonical_kor": "X"}}"#).unwrap();
        assert!(categories[0].alias_departments.is_empty());
        assert!(categories[0].alias_keywords.is_empty());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            parse_universities("{not json"),
            Err(LoaderError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_files_degrade() {
        let config = CourseFinderConfig::new("/nonexistent/coursefinder-data");
        let tables = AliasTables::load(&config);
        assert!(tables.is_degraded());
        assert!(tables.universities().is_empty());
        assert!(tables.categories().is_empty());
    }
}
