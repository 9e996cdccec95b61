use std::sync::Arc;

use tracing::debug;

use super::models::{ExtractedFilters, FilterField};
use super::patterns::{
    captures_not_followed_by, COLLEGE_PATTERN, DEPARTMENT_PATTERNS, DEPARTMENT_STOPWORDS,
    GRADE_PATTERN, SEMESTER_PATTERN, UNIVERSITY_PATTERN,
};
use crate::aliases::{with_official_suffix, DepartmentResolver, UniversityNormalizer};


/// Rule-based extraction of university, college, department, grade and
/// semester from free text. Never fails; missing entities are simply absent.
pub struct EntityExtractor {
    universities: Arc<UniversityNormalizer>,
    departments: Arc<DepartmentResolver>,
}

impl EntityExtractor {
    pub fn new(universities: Arc<UniversityNormalizer>, departments: Arc<DepartmentResolver>) -> Self {
        Self {
            universities,
            departments,
        }
    }


    pub fn extract(&self, text: &str) -> ExtractedFilters {
        debug!("Extracting entities from: {}", crate::safe_truncate(text, 80));

        let mut filters = ExtractedFilters::new();

        // College first, so "공과대학" is never read as a university.
        let college = captures_not_followed_by(&COLLEGE_PATTERN, text, &['교'])
            .and_then(|caps| caps.get(0))
            .map(|m| m.as_str());

        let university = match college {
            Some(_) => None,
            None => UNIVERSITY_PATTERN.find(text).map(|m| m.as_str()),
        };

        if let Some(college) = college {
            filters.set(FilterField::College, college);
        }
        if let Some(raw) = university {
            let normalized = with_official_suffix(self.universities.normalize(raw));
            filters.set(FilterField::University, normalized);
        }

        let mut remainder = text.to_string();
        for matched in university.into_iter().chain(college) {
            remainder = remainder.replace(matched, "");
        }

        if let Some(department) = self.extract_department(&remainder) {
            filters.set(FilterField::Department, department);
        }

        if let Some(caps) = GRADE_PATTERN.captures(text) {
            filters.set(FilterField::Grade, format!("{}학년", &caps[1]));
        }
        if let Some(caps) = SEMESTER_PATTERN.captures(text) {
            filters.set(FilterField::Semester, format!("{}학기", &caps[1]));
        }

        debug!("Extracted filters: {:?}", filters);
        filters
    }

    fn extract_department(&self, text: &str) -> Option<String> {
        for pattern in DEPARTMENT_PATTERNS.iter() {
            let Some(caps) = captures_not_followed_by(&pattern.regex, text, pattern.not_followed_by)
            else {
                continue;
            };

            let raw: String = caps[1].chars().filter(|c| !c.is_whitespace()).collect();
            if raw.chars().count() < 2 || DEPARTMENT_STOPWORDS.contains(&raw.as_str()) {
                continue;
            }

            return Some(self.departments.normalize(&raw));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::bundled_tables;

    fn extractor() -> EntityExtractor {
        let tables = bundled_tables();
        EntityExtractor::new(
            Arc::new(UniversityNormalizer::new(tables.clone())),
            Arc::new(DepartmentResolver::new(tables)),
        )
    }

    #[test]
    fn test_full_query() {
        let filters = extractor().extract("홍익대학교 컴퓨터공학과 1학년 필수 과목");

        let expected = ExtractedFilters::new()
            .with(FilterField::University, "홍익대학교")
            .with(FilterField::Department, "컴퓨터공학")
            .with(FilterField::Grade, "1학년");
        assert_eq!(filters, expected);
    }

    #[test]
    fn test_university_alias_and_semester() {
        let filters = extractor().extract("홍대 소프트웨어학부 3학년 2학기 과목 알려줘");
        assert_eq!(filters.get(FilterField::University), Some("홍익대학교"));
        assert_eq!(filters.get(FilterField::Department), Some("컴퓨터공학"));
        assert_eq!(filters.get(FilterField::Grade), Some("3학년"));
        assert_eq!(filters.get(FilterField::Semester), Some("2학기"));
    }

    #[test]
    fn test_slang_university() {
        let filters = extractor().extract("설대 전자공학부");
        assert_eq!(filters.get(FilterField::University), Some("서울대학교"));
        assert_eq!(filters.get(FilterField::Department), Some("전기공학"));
    }

    #[test]
    fn test_unknown_short_form_gets_suffix() {
        let filters = extractor().extract("가나대 경영학과");
        assert_eq!(filters.get(FilterField::University), Some("가나대학교"));
        assert_eq!(filters.get(FilterField::Department), Some("경영"));
    }

    #[test]
    fn test_college_suppresses_university() {
        let filters = extractor().extract("공과대학 2학기 수업");
        assert_eq!(filters.get(FilterField::College), Some("공과대학"));
        assert!(!filters.contains(FilterField::University));
        assert_eq!(filters.get(FilterField::Semester), Some("2학기"));
    }

    #[test]
    fn test_college_found_when_glued_to_university() {
        let filters = extractor().extract("공과대학홍익대학교 컴퓨터공학과");
        assert_eq!(filters.get(FilterField::College), Some("공과대학"));
        assert!(!filters.contains(FilterField::University));
    }

    #[test]
    fn test_spaced_department_is_collapsed() {
        let filters = extractor().extract("기계 공학과 과목");
        assert_eq!(filters.get(FilterField::Department), Some("기계공학"));
    }

    #[test]
    fn test_bare_engineering_name() {
        let filters = extractor().extract("화학공학 수업 추천");
        assert_eq!(filters.get(FilterField::Department), Some("화학공학"));
    }

    #[test]
    fn test_short_and_stopword_captures_rejected() {
        assert!(!extractor().extract("의학과").contains(FilterField::Department));
        assert!(!extractor().extract("수업학과 추천").contains(FilterField::Department));
    }

    #[test]
    fn test_out_of_range_grade_and_semester() {
        let filters = extractor().extract("5학년 3학기");
        assert!(filters.is_empty());
    }

    #[test]
    fn test_no_entities() {
        assert!(extractor().extract("인공지능 관련 과목 추천해줘").is_empty());
    }
}
