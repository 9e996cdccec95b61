use serde::{Deserialize, Serialize};

pub const DEFAULT_QUERY: &str = "추천 과목";
pub const UNNAMED_COURSE: &str = "[이름 없음]";


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculumRequest {
    pub university: String,
    pub department: String,
    pub interests: Option<String>,
    pub start_grade: u8,
    pub start_semester: u8,
    pub end_grade: u8,
    pub end_semester: u8,
    pub per_term: usize,
    /// Candidates retrieved per term before de-duplication.
    pub candidate_pool: usize,
}

impl Default for CurriculumRequest {
    fn default() -> Self {
        Self {
            university: String::new(),
            department: String::new(),
            interests: None,
            start_grade: 2,
            start_semester: 1,
            end_grade: 4,
            end_semester: 2,
            per_term: 5,
            candidate_pool: 20,
        }
    }
}

impl CurriculumRequest {
    pub fn new(university: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            university: university.into(),
            department: department.into(),
            ..Default::default()
        }
    }

    pub fn with_interests(mut self, interests: impl Into<String>) -> Self {
        self.interests = Some(interests.into());
        self
    }

    pub fn with_range(mut self, start: (u8, u8), end: (u8, u8)) -> Self {
        (self.start_grade, self.start_semester) = start;
        (self.end_grade, self.end_semester) = end;
        self
    }

    /// Ranking text for candidate retrieval.
    pub fn query(&self) -> &str {
        self.interests
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .unwrap_or(DEFAULT_QUERY)
    }

    /// (grade, semester) pairs from start to end inclusive, two semesters a year.
    pub fn terms(&self) -> Vec<(u8, u8)> {
        let start = (self.start_grade, self.start_semester);
        let end = (self.end_grade, self.end_semester);

        (self.start_grade..=self.end_grade)
            .flat_map(|grade| (1..=2).map(move |semester| (grade, semester)))
            .filter(|term| *term >= start && *term <= end)
            .collect()
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCourse {
    pub name: String,
    pub classification: String,
    pub description: String,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TermStatus {
    Filled,
    NoCoursesOffered,
    /// Every candidate was already placed in an earlier term.
    AllCandidatesUsed,
    /// The search for this term errored.
    Failed(String),
}

impl TermStatus {
    pub fn message(&self) -> Option<String> {
        match self {
            TermStatus::Filled => None,
            TermStatus::NoCoursesOffered => Some("해당 학기에 개설된 과목이 없습니다.".to_string()),
            TermStatus::AllCandidatesUsed => {
                Some("해당 학기의 과목이 이미 다른 학기에 선택되었습니다.".to_string())
            }
            TermStatus::Failed(reason) => Some(format!("검색 중 오류 발생: {}", reason)),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSlot {
    pub label: String,
    pub grade: u8,
    pub semester: u8,
    pub courses: Vec<PlannedCourse>,
    pub status: TermStatus,
}

impl TermSlot {
    pub fn new(grade: u8, semester: u8, courses: Vec<PlannedCourse>, status: TermStatus) -> Self {
        Self {
            label: format!("{}학년 {}학기", grade, semester),
            grade,
            semester,
            courses,
            status,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CurriculumPlan {
    Planned { terms: Vec<TermSlot> },
    /// No term received a course; the empty slots say why.
    NoResults { terms: Vec<TermSlot> },
}

impl CurriculumPlan {
    pub fn from_terms(terms: Vec<TermSlot>) -> Self {
        if terms.iter().all(TermSlot::is_empty) {
            CurriculumPlan::NoResults { terms }
        } else {
            CurriculumPlan::Planned { terms }
        }
    }

    pub fn terms(&self) -> &[TermSlot] {
        match self {
            CurriculumPlan::Planned { terms } | CurriculumPlan::NoResults { terms } => terms,
        }
    }

    pub fn total_courses(&self) -> usize {
        self.terms().iter().map(|t| t.courses.len()).sum()
    }
}
