pub mod courses;
pub mod curriculum;
pub mod listing;
pub mod selection;

pub use courses::{CourseQuery, CourseSearcher, CourseView};
pub use curriculum::{CurriculumAssembler, CurriculumPlan, CurriculumRequest, TermSlot, TermStatus};
pub use listing::{DepartmentLister, DepartmentMatch, DepartmentOffering, HybridWeights};
pub use selection::{select_courses, CourseSelection};
