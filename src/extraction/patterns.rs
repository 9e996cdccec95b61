use lazy_static::lazy_static;
use regex::{Captures, Regex};


pub struct DepartmentPattern {
    pub regex: Regex,
    /// The capture is rejected when the next character is one of these.
    pub not_followed_by: &'static [char],
}

lazy_static! {
    /// "공과대학", but not the "…대학" inside "…대학교".
    pub static ref COLLEGE_PATTERN: Regex = Regex::new(r"[가-힣]+대학").unwrap();

    pub static ref UNIVERSITY_PATTERN: Regex = Regex::new(r"[가-힣]+대학교|[가-힣]+대").unwrap();

    /// A university name glued to the start of the text ("홍대컴공").
    pub static ref UNIVERSITY_PREFIX_PATTERN: Regex = Regex::new(r"^(?:[가-힣]+대학교|[가-힣]+대)").unwrap();

    pub static ref GRADE_PATTERN: Regex = Regex::new(r"([1-4])학년").unwrap();

    pub static ref SEMESTER_PATTERN: Regex = Regex::new(r"([1-2])학기").unwrap();

    /// Tried in order; the first surviving capture wins.
    pub static ref DEPARTMENT_PATTERNS: Vec<DepartmentPattern> = vec![
        DepartmentPattern { regex: Regex::new(r"([가-힣\s]+공학)과").unwrap(), not_followed_by: &[] },
        DepartmentPattern { regex: Regex::new(r"([가-힣\s]+공학)부").unwrap(), not_followed_by: &[] },
        DepartmentPattern { regex: Regex::new(r"([가-힣\s]+)학과").unwrap(), not_followed_by: &[] },
        DepartmentPattern { regex: Regex::new(r"([가-힣\s]+)학부").unwrap(), not_followed_by: &[] },
        DepartmentPattern { regex: Regex::new(r"([가-힣\s]+공학)").unwrap(), not_followed_by: &['과', '부', '학'] },
    ];
}


pub const DEPARTMENT_STOPWORDS: [&str; 4] = ["대학", "학교", "과목", "수업"];


/// Leftmost match of `regex` whose next character is not in `forbidden`.
/// A rejected candidate is retried with shorter matches from the same start,
/// longest first, before the search resumes one character further on.
pub fn captures_not_followed_by<'t>(
    regex: &Regex,
    text: &'t str,
    forbidden: &[char],
) -> Option<Captures<'t>> {
    let mut start = 0;

    while start <= text.len() {
        let first = regex.captures_at(text, start)?;
        let match_start = first.get(0)?.start();

        let mut candidate = Some(first);
        while let Some(caps) = candidate {
            let end = caps.get(0)?.end();
            let blocked = text[end..].chars().next().is_some_and(|next| forbidden.contains(&next));
            if !blocked {
                return Some(caps);
            }

            let Some(last) = text[match_start..end].chars().next_back() else {
                break;
            };
            let shorter = &text[..end - last.len_utf8()];
            candidate = regex
                .captures_at(shorter, match_start)
                .filter(|c| c.get(0).is_some_and(|m| m.start() == match_start));
        }

        let step = text[match_start..].chars().next().map_or(1, char::len_utf8);
        start = match_start + step;
    }

    None
}
