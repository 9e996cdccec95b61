use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::models::{
    CurriculumPlan, CurriculumRequest, PlannedCourse, TermSlot, TermStatus, UNNAMED_COURSE,
};
use crate::catalog::MISSING;
use crate::extraction::{ExtractedFilters, FilterField};
use crate::search::filter::FilterBuilder;
use crate::search::retriever::StagedRetriever;
use crate::search::store::CourseDocument;


/// Builds term-by-term course plans; a course name is placed at most once
/// per plan.
pub struct CurriculumAssembler {
    retriever: Arc<StagedRetriever>,
}

impl CurriculumAssembler {
    pub fn new(retriever: Arc<StagedRetriever>) -> Self {
        Self { retriever }
    }

    /// Never fails: a term whose search errors is recorded as
    /// [`TermStatus::Failed`] and planning continues.
    pub async fn recommend(&self, request: &CurriculumRequest) -> CurriculumPlan {
        info!(
            "Planning curriculum: {} {} ({}-{} to {}-{}), interests={:?}",
            request.university,
            request.department,
            request.start_grade,
            request.start_semester,
            request.end_grade,
            request.end_semester,
            request.interests
        );

        let mut selected: HashSet<String> = HashSet::new();
        let mut terms = Vec::new();

        for (grade, semester) in request.terms() {
            let slot = self.plan_term(request, grade, semester, &mut selected).await;
            debug!("[{}] {} courses, {:?}", slot.label, slot.courses.len(), slot.status);
            terms.push(slot);
        }

        let plan = CurriculumPlan::from_terms(terms);
        match &plan {
            CurriculumPlan::Planned { terms } => info!(
                "Generated curriculum with {} terms ({} total courses)",
                terms.len(),
                plan.total_courses()
            ),
            CurriculumPlan::NoResults { .. } => warn!(
                "No curriculum generated for {} {}",
                request.university, request.department
            ),
        }
        plan
    }

    async fn plan_term(
        &self,
        request: &CurriculumRequest,
        grade: u8,
        semester: u8,
        selected: &mut HashSet<String>,
    ) -> TermSlot {
        let filters = ExtractedFilters::new()
            .with(FilterField::University, request.university.as_str())
            .with(FilterField::Department, request.department.as_str())
            .with(FilterField::Grade, format!("{}학년", grade))
            .with(FilterField::Semester, format!("{}학기", semester));
        let filter = FilterBuilder::build(&filters);

        let candidates = match self
            .retriever
            .retrieve(request.query(), filter.as_ref(), request.candidate_pool)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Search failed for {}학년 {}학기: {}", grade, semester, e);
                return TermSlot::new(grade, semester, Vec::new(), TermStatus::Failed(e.to_string()));
            }
        };

        if candidates.is_empty() {
            return TermSlot::new(grade, semester, Vec::new(), TermStatus::NoCoursesOffered);
        }

        let mut courses = Vec::new();
        for document in candidates {
            if courses.len() >= request.per_term {
                break;
            }
            let course = planned_course(document);
            if selected.insert(course.name.clone()) {
                courses.push(course);
            }
        }

        let status = if courses.is_empty() {
            TermStatus::AllCandidatesUsed
        } else {
            TermStatus::Filled
        };
        TermSlot::new(grade, semester, courses, status)
    }
}

fn planned_course(document: CourseDocument) -> PlannedCourse {
    let metadata = document.metadata;
    let name = match metadata.name.as_str() {
        "" => UNNAMED_COURSE.to_string(),
        _ => metadata.name,
    };
    let classification = match metadata.classification.as_str() {
        "" => MISSING.to_string(),
        _ => metadata.classification,
    };

    PlannedCourse {
        name,
        classification,
        description: document.content,
    }
}
