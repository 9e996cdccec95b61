

use std::collections::HashSet;


pub const DEPARTMENT_SUFFIXES: [char; 2] = ['과', '부'];


#[inline]
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Removes one trailing 과/부 ("컴퓨터공학과" -> "컴퓨터공학").
#[inline]
pub fn strip_department_suffix(name: &str) -> &str {
    name.strip_suffix(&DEPARTMENT_SUFFIXES[..]).unwrap_or(name)
}


pub fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
