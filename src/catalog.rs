//! Reader for the nested `university → college → department → [course]`
//! catalog file.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::core::{CourseFinderError, Result};
use crate::search::store::{CourseDocument, CourseMetadata};

pub const MISSING: &str = "[정보 없음]";
pub const MISSING_DESCRIPTION: &str = "[설명 정보가 제공되지 않았습니다]";

lazy_static! {
    static ref KOREAN_TERM: Regex = Regex::new(r"([1-4])학년\s*([1-2])학기").unwrap();
    static ref DASHED_TERM: Regex = Regex::new(r"([0-4])-([1-2])").unwrap();
}


#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCourse {
    name: String,
    name_en: String,
    grade_semester: String,
    course_classification: Option<String>,
    category: Option<String>,
    description: String,
}


pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<CourseDocument>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let documents = parse_catalog(&content)?;
    info!("Loaded {} courses from {}", documents.len(), path.display());
    Ok(documents)
}


pub fn parse_catalog(json: &str) -> Result<Vec<CourseDocument>> {
    let universities: Map<String, Value> = serde_json::from_str(json)?;
    let mut documents = Vec::new();

    for (university, colleges) in &universities {
        for (college, departments) in as_object(colleges, university)? {
            for (department, courses) in as_object(departments, college)? {
                let courses: Vec<RawCourse> = serde_json::from_value(courses.clone())?;
                debug!("{} / {} / {}: {} courses", university, college, department, courses.len());

                documents.extend(
                    courses
                        .into_iter()
                        .map(|course| to_document(university, college, department, course)),
                );
            }
        }
    }

    Ok(documents)
}

fn as_object<'a>(value: &'a Value, parent: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        CourseFinderError::Catalog(format!("expected an object under '{}'", parent))
    })
}

/// "2학년 1학기" or "2-1" -> ("2학년", "1학기"). Grade 0 marks a common course
/// and yields an empty grade.
pub fn parse_grade_semester(raw: &str) -> (String, String) {
    if let Some(caps) = KOREAN_TERM.captures(raw) {
        return (format!("{}학년", &caps[1]), format!("{}학기", &caps[2]));
    }

    if let Some(caps) = DASHED_TERM.captures(raw) {
        let grade = match &caps[1] {
            "0" => String::new(),
            g => format!("{}학년", g),
        };
        return (grade, format!("{}학기", &caps[2]));
    }

    (String::new(), String::new())
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    match value.trim() {
        "" => placeholder,
        trimmed => trimmed,
    }
}

fn to_document(university: &str, college: &str, department: &str, course: RawCourse) -> CourseDocument {
    let classification = course
        .course_classification
        .filter(|c| !c.is_empty())
        .or(course.category)
        .unwrap_or_default();
    let (grade, semester) = parse_grade_semester(&course.grade_semester);

    let content = format!(
        "과목명: {}\n영문명: {}\n학년/학기: {}\n분류: {}\n설명: {}",
        course.name,
        or_placeholder(&course.name_en, MISSING),
        or_placeholder(&course.grade_semester, MISSING),
        or_placeholder(&classification, MISSING),
        or_placeholder(&course.description, MISSING_DESCRIPTION),
    );

    CourseDocument {
        content,
        metadata: CourseMetadata {
            university: university.to_string(),
            college: college.to_string(),
            department: department.to_string(),
            name: course.name,
            name_en: course.name_en,
            grade_semester: course.grade_semester,
            grade,
            semester,
            classification,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLED: &str = include_str!("../data/catalog.json");

    #[test]
    fn test_parse_bundled_catalog_in_file_order() {
        let documents = parse_catalog(BUNDLED).unwrap();
        let names: Vec<&str> = documents.iter().map(|d| d.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["자료구조", "인공지능", "운영체제"]);

        let first = &documents[0].metadata;
        assert_eq!(first.university, "홍익대학교");
        assert_eq!(first.college, "공과대학");
        assert_eq!(first.department, "컴퓨터공학");
        assert_eq!((first.grade.as_str(), first.semester.as_str()), ("2학년", "1학기"));
        assert_eq!(first.classification, "전공필수");
    }

    #[test]
    fn test_category_field_fallback() {
        let documents = parse_catalog(BUNDLED).unwrap();
        assert_eq!(documents[2].metadata.classification, "전공핵심");
    }

    #[test]
    fn test_grade_semester_formats() {
        assert_eq!(parse_grade_semester("3학년 2학기"), ("3학년".into(), "2학기".into()));
        assert_eq!(parse_grade_semester("3학년2학기"), ("3학년".into(), "2학기".into()));
        assert_eq!(parse_grade_semester("3-1"), ("3학년".into(), "1학기".into()));
        assert_eq!(parse_grade_semester("0-2"), (String::new(), "2학기".into()));
        assert_eq!(parse_grade_semester("수시"), (String::new(), String::new()));
    }

    #[test]
    fn test_content_placeholders() {
        let json = r#"{"A대학교": {"B대학": {"C학과": [{"name": "D"}]}}}"#;
        let documents = parse_catalog(json).unwrap();
        assert_eq!(
            documents[0].content,
            "과목명: D\n영문명: [정보 없음]\n학년/학기: [정보 없음]\n분류: [정보 없음]\n설명: [설명 정보가 제공되지 않았습니다]"
        );
    }

    #[test]
    fn test_wrong_shape_is_catalog_error() {
        let result = parse_catalog(r#"{"A대학교": ["not", "an", "object"]}"#);
        assert!(matches!(result, Err(CourseFinderError::Catalog(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_catalog("/nonexistent/catalog.json"),
            Err(CourseFinderError::Io(_))
        ));
    }
}
