pub mod extractor;
pub mod models;
pub mod patterns;

pub use extractor::EntityExtractor;
pub use models::{ExtractedFilters, FilterField};
