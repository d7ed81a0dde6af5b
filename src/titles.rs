use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::text::{normalize, tokenize};

const TITLE_MAX_CHARS: usize = 38;
const META_MAX_CHARS: usize = 110;
const HIGH_VOLUME: u64 = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleAngle {
    Comparison,
    Guide,
    General,
}

impl TitleAngle {
    pub fn label(self) -> &'static str {
        match self {
            TitleAngle::Comparison => "comparison",
            TitleAngle::Guide => "guide",
            TitleAngle::General => "general",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMeta {
    pub keyword: String,
    pub angle: TitleAngle,
    pub title: String,
    pub meta: String,
}

/// Picks the angle from whole tokens; the first token that names one wins.
pub fn title_angle(keyword: &str) -> TitleAngle {
    for token in tokenize(keyword) {
        match token.to_lowercase().as_str() {
            "비교" | "vs" | "리뷰" | "후기" => return TitleAngle::Comparison,
            "방법" | "설명" | "정보" | "가이드" => return TitleAngle::Guide,
            _ => {}
        }
    }
    TitleAngle::General
}

/// Title and meta description for the keyword at position `rank` of a list.
/// Neighbouring ranks rotate through different patterns so a list of
/// similar keywords does not repeat one headline. Keywords at or above
/// 20,000 monthly searches get the stronger wording.
pub fn title_meta_for(keyword: &str, monthly_volume: u64, rank: usize, year: i32) -> TitleMeta {
    let base = normalize(keyword);
    let angle = title_angle(&base);
    let (mut titles, metas) = patterns(angle, &base, year);
    if monthly_volume >= HIGH_VOLUME {
        titles = titles
            .into_iter()
            .map(|title| title.replace("가이드", "최신 가이드").replace("추천", "베스트 추천"))
            .collect();
    }
    let title = &titles[rank % titles.len()];
    let meta = &metas[rank % metas.len()];
    TitleMeta {
        keyword: base,
        angle,
        title: clip(title, TITLE_MAX_CHARS),
        meta: clip(meta, META_MAX_CHARS),
    }
}

pub fn title_metas<'a, I>(ranked: I) -> Vec<TitleMeta>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let year = chrono::Local::now().year();
    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, (keyword, volume))| title_meta_for(keyword, volume, rank, year))
        .collect()
}

fn patterns(angle: TitleAngle, base: &str, year: i32) -> (Vec<String>, Vec<String>) {
    match angle {
        TitleAngle::Comparison => (
            vec![
                format!("{} {} 구매 가이드 | 핵심 스펙 비교", base, year),
                format!("{} 필수 체크리스트 12가지", base),
                format!("{} TOP7 추천 | 장단점 요약", base),
                format!("{} 입문자 실수 모음 | 회피 팁", base),
                format!("{} 신제품 vs 가성비 | 무엇이 다를까", base),
            ],
            vec![
                format!("{} 선택 전 꼭 보는 체크리스트와 스펙 비교, 예산/환경별 추천.", base),
                format!("{} 주요 포인트를 쉽게 정리했습니다. A/S와 유지비 팁 포함.", base),
            ],
        ),
        TitleAngle::Guide => (
            vec![
                format!("{} 첫걸음 사용법 10분 요약", base),
                format!("{} 기초부터 핵심까지 | 시간 절약 가이드", base),
                format!("{} 문제 해결 Q&A 20선", base),
            ],
            vec![format!(
                "{} 초보도 바로 따라하는 개요·설정·활용법. 체크포인트 정리.",
                base
            )],
        ),
        TitleAngle::General => (
            vec![
                format!("{} 실전 가이드 | 실수 막는 꿀팁", base),
                format!("{} 추천 리스트 | 꼭 알아야 할 선택 요령", base),
                format!("{} 비교/대안 총정리 15가지", base),
                format!("{} Q&A 20문20답 | 쉽게 정리", base),
            ],
            vec![format!(
                "{} 첫 구매 전 알아둘 점을 정리. 비교, 체크리스트, FAQ 포함.",
                base
            )],
        ),
    }
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max.saturating_sub(2)).collect();
    clipped.push('…');
    clipped
}
