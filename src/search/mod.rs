pub mod filter;
pub mod memory_store;
pub mod retriever;
pub mod store;

pub use filter::{Condition, FilterBuilder, FilterLeaf, FilterQuery};
pub use memory_store::InMemoryCourseStore;
pub use retriever::{Retrieval, RetrievalStage, StagedRetriever};
pub use store::{CourseDocument, CourseMetadata, StoreError, VectorStore};
