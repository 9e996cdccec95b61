use serde::{Deserialize, Serialize};

const EXACT_SCORE: f64 = 3.0;
const PREFIX_SCORE: f64 = 2.0;
const CONTAINS_SCORE: f64 = 1.0;
const AFFILIATION_SCORE: f64 = 0.5;


/// Weights for blending embedding and lexical department scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridWeights {
    pub vector_weight: f64,
    pub lexical_weight: f64,
    /// Vector candidates kept per requested result.
    pub candidate_multiplier: usize,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            vector_weight: 0.6,
            lexical_weight: 0.4,
            candidate_multiplier: 2,
        }
    }
}

impl HybridWeights {
    /// Lexical-only matches keep their normalized score unweighted.
    pub fn combine(&self, vector: Option<f64>, lexical: Option<f64>) -> Option<f64> {
        match (vector, lexical) {
            (Some(v), Some(l)) => Some(self.vector_weight * v + self.lexical_weight * l),
            (Some(v), None) => Some(self.vector_weight * v),
            (None, Some(l)) => Some(l),
            (None, None) => None,
        }
    }


    pub fn vector_candidates(&self, top_k: usize) -> usize {
        top_k.saturating_mul(self.candidate_multiplier)
    }
}

/// Best raw score of `tokens` against one catalog row, in `0.0..=3.0`.
/// Tokens must already be lowercase.
pub fn lexical_score(tokens: &[String], university: &str, college: &str, department: &str) -> f64 {
    let department = department.to_lowercase();
    let university = university.to_lowercase();
    let college = college.to_lowercase();

    tokens
        .iter()
        .map(|token| {
            let token = token.as_str();
            if token == department {
                EXACT_SCORE
            } else if department.starts_with(token) {
                PREFIX_SCORE
            } else if department.contains(token) {
                CONTAINS_SCORE
            } else if university.contains(token) || college.contains(token) {
                AFFILIATION_SCORE
            } else {
                0.0
            }
        })
        .fold(0.0, f64::max)
}


pub fn normalize_lexical(score: f64) -> f64 {
    score / EXACT_SCORE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_lowercase()).collect()
    }

    #[test]
    fn test_lexical_tiers() {
        let row = ("홍익대학교", "공과대학", "컴퓨터공학");
        let score = |t: &[&str]| lexical_score(&tokens(t), row.0, row.1, row.2);

        assert_eq!(score(&["컴퓨터공학"]), 3.0);
        assert_eq!(score(&["컴퓨터"]), 2.0);
        assert_eq!(score(&["공학"]), 1.0);
        assert_eq!(score(&["홍익"]), 0.5);
        assert_eq!(score(&["경영"]), 0.0);
        assert_eq!(score(&["경영", "컴퓨터"]), 2.0);
    }

    #[test]
    fn test_lexical_case_insensitive() {
        assert_eq!(lexical_score(&tokens(&["AI"]), "", "", "AI융합학부"), 2.0);
    }

    #[test]
    fn test_combine() {
        let weights = HybridWeights::default();
        let both = weights.combine(Some(0.5), Some(1.0)).unwrap();
        assert!((both - 0.7).abs() < 1e-9);
        assert!((weights.combine(Some(0.5), None).unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(weights.combine(None, Some(2.0 / 3.0)), Some(2.0 / 3.0));
        assert_eq!(weights.combine(None, None), None);
    }

    #[test]
    fn test_vector_candidates() {
        assert_eq!(HybridWeights::default().vector_candidates(10), 20);
    }
}
