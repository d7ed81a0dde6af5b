use std::collections::HashMap;

use keyword_monetizer::metrics::{EnrichedMetrics, RelatedKeyword};
use keyword_monetizer::monetization::{
    classify_intent, click_value_rows, monetize_keywords, total_revenue, Intent,
    MonetizationParams, Monetizer,
};

fn metrics_with_volume(keyword: &str, pc: u64, mobile: u64) -> (String, EnrichedMetrics) {
    let mut metrics = EnrichedMetrics::new(keyword);
    metrics.monthly_pc = Some(pc);
    metrics.monthly_mobile = Some(mobile);
    (keyword.to_string(), metrics)
}

#[test]
fn default_params_estimate_reference_row() {
    let keywords = vec!["제주 렌터카 가격".to_string()];
    let map = HashMap::from([metrics_with_volume("제주 렌터카 가격", 400, 600)]);
    let rows = monetize_keywords(&keywords, &map, MonetizationParams::default(), 0, &[]);

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.intent, Intent::Transactional);
    assert_eq!(row.monthly_search, 1000);
    assert_eq!(row.est_visits, 150);
    assert_eq!(row.est_pageviews, 195);
    assert_eq!(row.est_display_rev, 487);
    assert_eq!(row.est_aff_orders, 2);
    assert_eq!(row.est_aff_rev, 3000);
    assert_eq!(row.est_total_rev, 3487);
    assert_eq!(row.cpc, None);
}

#[test]
fn missing_sides_count_as_zero_volume() {
    let mut metrics = EnrichedMetrics::new("서울 카페");
    metrics.monthly_mobile = Some(2000);
    assert_eq!(metrics.monthly_volume(), 2000);
    assert_eq!(EnrichedMetrics::new("x").monthly_volume(), 0);
}

#[test]
fn threshold_is_inclusive_and_exclusions_apply() {
    let keywords = vec![
        "강릉 카페".to_string(),
        "강릉 숙소".to_string(),
        "강릉 광고 대행".to_string(),
        "강릉 맛집".to_string(),
    ];
    let map = HashMap::from([
        metrics_with_volume("강릉 카페", 500, 500),
        metrics_with_volume("강릉 숙소", 499, 500),
        metrics_with_volume("강릉 광고 대행", 5000, 5000),
    ]);
    let monetizer = Monetizer::new(
        MonetizationParams::default(),
        1000,
        &[" 광고 ".to_string(), "".to_string()],
    );
    let rows = monetizer.monetize(&keywords, &map);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].keyword, "강릉 카페");
    assert!(monetizer.is_excluded("강릉 광고 대행"));
    assert!(!monetizer.is_excluded("강릉 맛집"));
}

#[test]
fn rows_are_sorted_by_total_then_volume() {
    let keywords = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let map = HashMap::from([
        metrics_with_volume("a", 100, 0),
        metrics_with_volume("b", 10_000, 0),
        metrics_with_volume("c", 1_000, 0),
    ]);
    let rows = monetize_keywords(&keywords, &map, MonetizationParams::default(), 0, &[]);
    let order: Vec<&str> = rows.iter().map(|row| row.keyword.as_str()).collect();
    assert_eq!(order, vec!["b", "c", "a"]);
    assert_eq!(
        total_revenue(&rows),
        rows.iter().map(|row| row.est_total_rev).sum::<i64>()
    );
}

#[test]
fn zero_capture_yields_zero_revenue() {
    let params = MonetizationParams {
        capture_pct: 0.0,
        ..MonetizationParams::default()
    };
    let estimate = params.estimate(50_000);
    assert_eq!(estimate.total_revenue, 0.0);
    assert_eq!(estimate.affiliate_orders, 0.0);
}

#[test]
fn intent_priority_is_transactional_commercial_informational() {
    assert_eq!(classify_intent("노트북 추천 가격"), Intent::Transactional);
    assert_eq!(classify_intent("노트북 추천"), Intent::Commercial);
    assert_eq!(classify_intent("아이폰 VS 갤럭시"), Intent::Commercial);
    assert_eq!(classify_intent("캠핑 하는 법"), Intent::Informational);
    assert_eq!(classify_intent("제주도"), Intent::Informational);
}

#[test]
fn click_value_ranks_by_revenue_then_cpc() {
    let related = vec![
        RelatedKeyword {
            keyword: "제주 렌터카".to_string(),
            monthly_pc: 1000,
            monthly_mobile: 5000,
            clicks_pc: 10,
            clicks_mobile: 30,
            cpc: 500.0,
            competition_index: Some("높음".to_string()),
        },
        RelatedKeyword {
            keyword: "제주 렌트".to_string(),
            monthly_pc: 100,
            monthly_mobile: 400,
            clicks_pc: 20,
            clicks_mobile: 20,
            cpc: 800.0,
            competition_index: None,
        },
        RelatedKeyword {
            keyword: "제주 차량".to_string(),
            monthly_pc: 10,
            monthly_mobile: 10,
            clicks_pc: 0,
            clicks_mobile: 0,
            cpc: 100.0,
            competition_index: None,
        },
    ];
    let rows = click_value_rows(&related);
    assert_eq!(rows[0].keyword, "제주 렌트");
    assert_eq!(rows[0].est_revenue, 32_000);
    assert_eq!(rows[1].est_revenue, 20_000);
    assert_eq!(rows[2].est_revenue, 0);
}
