use crate::text::{normalize, unique_ordered};

pub const KOREAN_LONGTAIL_SUFFIXES: &[&str] = &[
    "방법", "후기", "리뷰", "비교", "추천", "가격", "주의사항", "장점", "단점", "가성비",
];

const TRAVEL_SUFFIXES: &[&str] = &[
    "여행", "일정", "주차", "렌터카", "야경", "숙소", "카페", "맛집", "예산",
];

const FOOD_SUFFIXES: &[&str] = &[
    "맛집", "카페", "브런치", "디저트", "메뉴", "가격", "예약", "웨이팅", "주차",
];

pub fn profile_names() -> &'static [&'static str] {
    &["travel", "food"]
}

pub fn profile_suffixes(profile: &str) -> &'static [&'static str] {
    match profile.trim().to_lowercase().as_str() {
        "travel" => TRAVEL_SUFFIXES,
        "food" => FOOD_SUFFIXES,
        _ => &[],
    }
}

pub fn append_suffixes(seed: &str, suffixes: Option<&[&str]>) -> Vec<String> {
    let suffixes = suffixes.unwrap_or(KOREAN_LONGTAIL_SUFFIXES);
    unique_ordered(
        suffixes
            .iter()
            .map(|suffix| normalize(&format!("{} {}", seed, suffix))),
    )
}

pub fn expand_with_suffixes<S: AsRef<str>>(seeds: &[S], suffixes: Option<&[&str]>) -> Vec<String> {
    let mut out = Vec::new();
    for seed in seeds {
        out.extend(append_suffixes(seed.as_ref(), suffixes));
    }
    unique_ordered(out)
}

/// Expands seeds with a named profile vocabulary. Unknown profiles expand to nothing.
pub fn expand_with_profile<S: AsRef<str>>(seeds: &[S], profile: &str) -> Vec<String> {
    expand_with_suffixes(seeds, Some(profile_suffixes(profile)))
}
