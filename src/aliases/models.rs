use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityAlias {
    #[serde(rename = "official_name_ko")]
    pub official_name: String,
    #[serde(rename = "aliases_ko", default)]
    pub aliases: Vec<String>,
    #[serde(rename = "slang_ko", default)]
    pub slang: Vec<String>,
}

impl UniversityAlias {
    /// Alias first, then slang, then the official spelling itself.
    pub fn matches(&self, raw: &str) -> bool {
        self.aliases.iter().any(|a| a == raw)
            || self.slang.iter().any(|s| s == raw)
            || self.official_name == raw
    }
}


/// One alias category of interchangeable department names.
///
/// Schema invariant: `alias_departments` is ordered and its first entry is the
/// category's representative spelling. Use [`DepartmentCategory::representative`]
/// rather than indexing the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentCategory {
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "canonical_kor", default)]
    pub canonical_label: String,
    #[serde(default)]
    pub alias_departments: Vec<String>,
    #[serde(default)]
    pub alias_keywords: Vec<String>,
}

impl DepartmentCategory {

    pub fn representative(&self) -> Option<&str> {
        self.alias_departments.first().map(String::as_str)
    }


    pub fn contains_department(&self, name: &str) -> bool {
        self.alias_departments.iter().any(|d| d == name)
    }

    /// First keyword that contains `raw` or is contained in it.
    pub fn matching_keyword(&self, raw: &str) -> Option<&str> {
        if raw.is_empty() {
            return None;
        }
        self.alias_keywords
            .iter()
            .find(|kw| !kw.is_empty() && (raw.contains(kw.as_str()) || kw.contains(raw)))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category() -> DepartmentCategory {
        DepartmentCategory {
            id: "cs".to_string(),
            canonical_label: "컴퓨터 계열".to_string(),
            alias_departments: vec!["컴퓨터공학과".to_string(), "소프트웨어학부".to_string()],
            alias_keywords: vec!["컴공".to_string(), "소프트웨어".to_string()],
        }
    }

    #[test]
    fn test_representative_is_first_entry() {
        assert_eq!(category().representative(), Some("컴퓨터공학과"));
    }

    #[test]
    fn test_empty_category_has_no_representative() {
        let empty = DepartmentCategory {
            alias_departments: vec![],
            ..category()
        };
        assert_eq!(empty.representative(), None);
    }

    #[test]
    fn test_keyword_match_both_directions() {
        let cat = category();
        assert_eq!(cat.matching_keyword("컴공과"), Some("컴공"));
        assert_eq!(cat.matching_keyword("소프트"), Some("소프트웨어"));
        assert_eq!(cat.matching_keyword("경영"), None);
        assert_eq!(cat.matching_keyword(""), None);
    }

    #[test]
    fn test_university_alias_matches() {
        let record = UniversityAlias {
            official_name: "서울대학교".to_string(),
            aliases: vec!["서울대".to_string()],
            slang: vec!["설대".to_string()],
        };
        assert!(record.matches("서울대"));
        assert!(record.matches("설대"));
        assert!(record.matches("서울대학교"));
        assert!(!record.matches("서울"));
    }
}
