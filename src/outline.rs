use serde::{Deserialize, Serialize};

use crate::text::normalize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub sections: Vec<String>,
    pub faq: Vec<String>,
}

pub fn build_outline(keyword: &str) -> Outline {
    let head = normalize(keyword);
    Outline {
        title: format!("{} 총정리", head),
        sections: vec![
            format!("{} 한눈에 보기", head),
            format!("{} 핵심 체크리스트", head),
            format!("{} 자주 묻는 질문", head),
            format!("{} 비교/대안", head),
            format!("{} 최종 선택 가이드", head),
        ],
        faq: vec![
            format!("Q. {} 초보도 가능한가요?", head),
            format!("Q. {} 비용/가격 팁은?", head),
            format!("Q. {} 주의할 점은?", head),
            format!("Q. {} 대체 키워드는?", head),
        ],
    }
}
