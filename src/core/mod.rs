

pub mod config;
pub mod error;

pub use config::CourseFinderConfig;
pub use error::{CourseFinderError, Result};
