pub mod categories;
pub mod lister;
pub mod scoring;

pub use categories::{expand_query, ExpandedQuery, MAIN_CATEGORIES};
pub use lister::{DepartmentLister, DepartmentMatch, DepartmentOffering, NO_RESULTS_PLACEHOLDER};
pub use scoring::HybridWeights;
