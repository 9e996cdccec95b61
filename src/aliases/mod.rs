pub mod department;
pub mod loader;
pub mod models;
pub mod university;


pub use department::{DepartmentResolver, Resolution};
pub use loader::{AliasTables, LoaderError};
pub use models::{DepartmentCategory, UniversityAlias};
pub use university::{with_official_suffix, UniversityNormalizer, OFFICIAL_SUFFIX};
