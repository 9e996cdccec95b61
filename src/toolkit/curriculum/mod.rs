pub mod assembler;
pub mod models;

pub use assembler::CurriculumAssembler;
pub use models::{CurriculumPlan, CurriculumRequest, PlannedCourse, TermSlot, TermStatus};
