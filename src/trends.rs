use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::text::unique_ordered;

pub const DEFAULT_HOT_TERMS: &[&str] = &[
    "핫플", "뉴오픈", "오픈런", "웨이팅", "예약", "오션뷰", "바다뷰", "루프탑", "야경", "브런치",
    "디저트", "가성비", "무료주차", "노키즈존", "애견동반", "포장", "배달",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendDelta {
    pub new_suggestions: Vec<String>,
    pub dropped_suggestions: Vec<String>,
    pub hot_terms: Vec<(String, usize)>,
}

/// Diffs two suggestion snapshots and counts hot-term occurrences in the
/// current one. An empty or missing vocabulary falls back to the defaults.
pub fn compute_trends<S: AsRef<str>>(
    prev: &[S],
    curr: &[S],
    hot_terms: Option<&[&str]>,
) -> TrendDelta {
    let prev_set: BTreeSet<&str> = prev.iter().map(AsRef::as_ref).collect();
    let curr_set: BTreeSet<&str> = curr.iter().map(AsRef::as_ref).collect();

    let new_suggestions = curr_set
        .difference(&prev_set)
        .map(|item| item.to_string())
        .collect();
    let dropped_suggestions = prev_set
        .difference(&curr_set)
        .map(|item| item.to_string())
        .collect();

    let vocabulary = match hot_terms {
        Some(terms) if !terms.is_empty() => unique_ordered(terms.iter().copied()),
        _ => unique_ordered(DEFAULT_HOT_TERMS.iter().copied()),
    };

    let mut counts: Vec<(String, usize)> = vocabulary
        .into_iter()
        .map(|term| {
            let count = curr_set.iter().filter(|item| item.contains(term.as_str())).count();
            (term, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    TrendDelta {
        new_suggestions,
        dropped_suggestions,
        hot_terms: counts,
    }
}
