use lazy_static::lazy_static;

use crate::utils::dedup_preserving_order;

pub const ALL_DEPARTMENTS: &str = "전체";

const TOKEN_SEPARATORS: [char; 4] = ['/', ',', '(', ')'];

lazy_static! {
    /// Top-level fields of study and their sub-labels.
    pub static ref MAIN_CATEGORIES: Vec<(&'static str, Vec<&'static str>)> = vec![
        ("공학", vec![
            "컴퓨터 / 소프트웨어 / 인공지능", "전기 / 전자 / 반도체", "기계 / 자동차 / 로봇",
            "화학 / 화공 / 신소재", "산업공학 / 시스템 / 데이터분석", "건축 / 토목 / 도시",
            "에너지 / 환경 / 원자력",
        ]),
        ("자연과학", vec!["수학 / 통계", "물리 / 천문", "화학", "생명과학 / 바이오", "지구과학 / 환경"]),
        ("의약·보건", vec!["약학", "간호", "보건행정 / 보건정책"]),
        ("경영·경제·회계", vec!["경영(마케팅, 인사, 전략 등)", "경제 / 금융 / 금융공학", "회계 / 세무"]),
        ("사회과학", vec![
            "행정 / 정책", "정치 / 외교 / 국제관계", "사회 / 사회복지",
            "심리 / 상담", "언론 / 미디어 / 광고 / PR",
        ]),
        ("인문", vec!["국어 / 문학", "영어 / 외국어", "역사 / 고고학", "철학 / 인류학 / 종교학"]),
        ("교육", vec!["교육학 / 교과교육(국영수 등)", "유아교육 / 특수교육"]),
        ("예체능", vec![
            "미술 / 회화 / 조소", "디자인(시각, 산업, UX/UI 등)",
            "음악 / 작곡 / 연주 / 보컬", "체육 / 스포츠 / 운동재활",
        ]),
        ("융합/신산업", vec![
            "데이터사이언스 / 빅데이터", "인공지능 / 로봇 / 자율주행",
            "게임 / 인터랙티브콘텐츠", "영상 / 콘텐츠 / 유튜브 / 방송",
            "스타트업 / 창업",
        ]),
    ];
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedQuery {
    pub tokens: Vec<String>,
    pub embedding_text: String,
}

/// True for blank input or the "everything" keyword.
pub fn is_list_all(query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || query == ALL_DEPARTMENTS
}


pub fn sub_labels(category: &str) -> Option<&'static [&'static str]> {
    MAIN_CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, labels)| labels.as_slice())
}

fn split_label(label: &str) -> impl Iterator<Item = String> + '_ {
    label
        .split(&TOKEN_SEPARATORS[..])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

/// A top-level category expands to every part of every sub-label; anything
/// else is split into its own parts. Falls back to the trimmed query when
/// splitting leaves nothing.
pub fn expand_query(query: &str) -> ExpandedQuery {
    let raw = query.trim();

    let parts: Vec<String> = match sub_labels(raw) {
        Some(labels) => labels.iter().flat_map(|label| split_label(label)).collect(),
        None => split_label(raw).collect(),
    };

    let mut tokens = dedup_preserving_order(parts);
    if tokens.is_empty() && !raw.is_empty() {
        tokens.push(raw.to_string());
    }

    let embedding_text = tokens.join(" ");
    ExpandedQuery {
        tokens,
        embedding_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_category_expands() {
        let expanded = expand_query("공학");
        assert_eq!(&expanded.tokens[..3], ["컴퓨터", "소프트웨어", "인공지능"]);
        assert!(expanded.tokens.contains(&"원자력".to_string()));
        assert!(expanded.embedding_text.starts_with("컴퓨터 소프트웨어 인공지능 전기"));
    }

    #[test]
    fn test_parenthesized_label_splits() {
        let expanded = expand_query("경영(마케팅, 인사, 전략 등)");
        assert_eq!(expanded.tokens, vec!["경영", "마케팅", "인사", "전략 등"]);
    }

    #[test]
    fn test_plain_query() {
        let expanded = expand_query("  AI, 데이터 / AI ");
        assert_eq!(expanded.tokens, vec!["AI", "데이터"]);
        assert_eq!(expanded.embedding_text, "AI 데이터");
    }

    #[test]
    fn test_separator_only_query_falls_back_to_raw() {
        assert_eq!(expand_query("//").tokens, vec!["//"]);
        assert!(expand_query("   ").tokens.is_empty());
    }

    #[test]
    fn test_is_list_all() {
        assert!(is_list_all(""));
        assert!(is_list_all(" 전체 "));
        assert!(!is_list_all("공학"));
    }
}
