use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Transactional,
    Commercial,
    Informational,
}

impl Intent {
    pub fn label(self) -> &'static str {
        match self {
            Intent::Transactional => "transactional",
            Intent::Commercial => "commercial",
            Intent::Informational => "informational",
        }
    }

    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            Intent::Transactional => &[
                "구매", "가격", "할인", "최저가", "쿠폰", "예약", "신청", "견적", "비용", "수강",
            ],
            Intent::Commercial => &["추천", "비교", "후기", "리뷰", "장단점", "베스트", "top", "vs"],
            Intent::Informational => &[
                "방법", "사용법", "가이드", "주의", "꿀팁", "하는 법", "어떻게", "왜", "무엇",
            ],
        }
    }
}

const PRIORITY: [Intent; 3] = [
    Intent::Transactional,
    Intent::Commercial,
    Intent::Informational,
];

pub fn classify_intent(keyword: &str) -> Intent {
    let lowered = keyword.to_lowercase();
    for intent in PRIORITY {
        for token in intent.tokens() {
            if keyword.contains(token) || lowered.contains(&token.to_lowercase()) {
                return intent;
            }
        }
    }
    Intent::Informational
}
