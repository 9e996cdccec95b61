use std::sync::Arc;

use tracing::debug;

use super::loader::AliasTables;


pub const OFFICIAL_SUFFIX: &str = "대학교";


pub struct UniversityNormalizer {
    tables: Arc<AliasTables>,
}

impl UniversityNormalizer {
    pub fn new(tables: Arc<AliasTables>) -> Self {
        Self { tables }
    }

    /// "홍대" -> "홍익대학교". Unknown names pass through unchanged.
    pub fn normalize(&self, raw: &str) -> String {
        match self.tables.universities().iter().find(|u| u.matches(raw)) {
            Some(record) => {
                debug!("University normalized: '{}' -> '{}'", raw, record.official_name);
                record.official_name.clone()
            }
            None => raw.to_string(),
        }
    }
}

/// Completes a "…대" short form to "…대학교"; anything else is kept as is.
pub fn with_official_suffix(name: String) -> String {
    if name.ends_with(OFFICIAL_SUFFIX) || !name.ends_with('대') {
        name
    } else {
        name + "학교"
    }
}
