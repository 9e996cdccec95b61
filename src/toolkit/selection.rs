use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

lazy_static! {
    static ref FENCED_JSON: Regex = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap();
}


#[derive(Debug, Deserialize)]
struct RawSelection {
    #[serde(default)]
    selected_ids: Vec<String>,
    #[serde(default)]
    reasoning: Option<String>,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CourseSelection {
    /// Ids chosen by the model, restricted to known candidates.
    Parsed {
        ids: Vec<String>,
        reasoning: Option<String>,
    },
    /// The response was unusable; the leading candidates were taken instead.
    Defaulted { ids: Vec<String>, reason: String },
}

impl CourseSelection {
    pub fn ids(&self) -> &[String] {
        match self {
            CourseSelection::Parsed { ids, .. } | CourseSelection::Defaulted { ids, .. } => ids,
        }
    }
}

/// Reads a `{"selected_ids": [...], "reasoning": "..."}` object out of a
/// model response, optionally wrapped in a ```json fence.
pub fn select_courses(
    response: &str,
    candidate_ids: &[String],
    fallback_count: usize,
) -> CourseSelection {
    let response = response.trim();
    let json = FENCED_JSON
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map_or(response, |m| m.as_str());

    match serde_json::from_str::<RawSelection>(json) {
        Ok(raw) => CourseSelection::Parsed {
            ids: raw
                .selected_ids
                .into_iter()
                .filter(|id| candidate_ids.contains(id))
                .collect(),
            reasoning: raw.reasoning,
        },
        Err(e) => {
            warn!("Course selection parsing failed: {}", e);
            CourseSelection::Defaulted {
                ids: candidate_ids.iter().take(fallback_count).cloned().collect(),
                reason: e.to_string(),
            }
        }
    }
}
