pub mod click_value;
pub mod intent;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::metrics::EnrichedMetrics;

pub use click_value::{click_value_rows, ClickValueRow};
pub use intent::{classify_intent, Intent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonetizationParams {
    pub capture_pct: f64,
    pub pv_per_visit: f64,
    pub ecpm: f64,
    pub aff_cvr_pct: f64,
    pub aff_commission: f64,
}

impl Default for MonetizationParams {
    fn default() -> Self {
        Self {
            capture_pct: 15.0,
            pv_per_visit: 1.3,
            ecpm: 2500.0,
            aff_cvr_pct: 1.5,
            aff_commission: 1500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenueEstimate {
    pub visits: f64,
    pub pageviews: f64,
    pub affiliate_orders: f64,
    pub display_revenue: f64,
    pub affiliate_revenue: f64,
    pub total_revenue: f64,
}

impl MonetizationParams {
    pub fn estimate(&self, monthly_volume: u64) -> RevenueEstimate {
        let capture = self.capture_pct.max(0.0).min(100.0) / 100.0;
        let visits = monthly_volume as f64 * capture;
        let pageviews = visits * self.pv_per_visit;
        let display_revenue = (pageviews / 1000.0) * self.ecpm;
        let affiliate_orders = (visits * (self.aff_cvr_pct.max(0.0) / 100.0)).trunc();
        let affiliate_revenue = affiliate_orders * self.aff_commission;
        RevenueEstimate {
            visits,
            pageviews,
            affiliate_orders,
            display_revenue,
            affiliate_revenue,
            total_revenue: display_revenue + affiliate_revenue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetizationRow {
    pub keyword: String,
    pub intent: Intent,
    pub monthly_search: u64,
    pub capture_pct: f64,
    pub pv_per_visit: f64,
    pub ecpm: f64,
    pub aff_cvr_pct: f64,
    pub aff_commission: f64,
    pub est_visits: i64,
    pub est_pageviews: i64,
    pub est_aff_orders: i64,
    pub est_display_rev: i64,
    pub est_aff_rev: i64,
    pub est_total_rev: i64,
    pub cpc: Option<f64>,
}

impl MonetizationRow {
    pub fn to_record(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut record = serde_json::Map::new();
        record.insert("keyword".to_string(), self.keyword.clone().into());
        record.insert("intent".to_string(), self.intent.label().into());
        record.insert("monthly_search".to_string(), self.monthly_search.into());
        record.insert("capture_pct".to_string(), self.capture_pct.into());
        record.insert("pv_per_visit".to_string(), self.pv_per_visit.into());
        record.insert("eCPM".to_string(), self.ecpm.into());
        record.insert("aff_cvr_pct".to_string(), self.aff_cvr_pct.into());
        record.insert("aff_commission".to_string(), self.aff_commission.into());
        record.insert("est_visits".to_string(), self.est_visits.into());
        record.insert("est_pageviews".to_string(), self.est_pageviews.into());
        record.insert("est_aff_orders".to_string(), self.est_aff_orders.into());
        record.insert("est_display_rev".to_string(), self.est_display_rev.into());
        record.insert("est_aff_rev".to_string(), self.est_aff_rev.into());
        record.insert("est_total_rev".to_string(), self.est_total_rev.into());
        record.insert(
            "cpc".to_string(),
            self.cpc
                .map(serde_json::Value::from)
                .unwrap_or(serde_json::Value::Null),
        );
        record
    }
}

#[derive(Debug, Clone, Default)]
pub struct Monetizer {
    params: MonetizationParams,
    min_monthly: u64,
    exclude_tokens: Vec<String>,
}

impl Monetizer {
    pub fn new(params: MonetizationParams, min_monthly: u64, exclude_tokens: &[String]) -> Self {
        let exclude_tokens = exclude_tokens
            .iter()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect();
        Self {
            params,
            min_monthly,
            exclude_tokens,
        }
    }

    pub fn is_excluded(&self, keyword: &str) -> bool {
        self.exclude_tokens
            .iter()
            .any(|token| keyword.contains(token.as_str()))
    }

    /// Rows for keywords that have metrics, clear `min_monthly` (inclusive) and
    /// contain no excluded token, ordered by `(total, monthly)` descending.
    pub fn monetize<S: AsRef<str>>(
        &self,
        keywords: &[S],
        metrics: &HashMap<String, EnrichedMetrics>,
    ) -> Vec<MonetizationRow> {
        let mut rows: Vec<MonetizationRow> = keywords
            .iter()
            .filter_map(|keyword| {
                let keyword = keyword.as_ref();
                let entry = metrics.get(keyword)?;
                let monthly = entry.monthly_volume();
                if monthly < self.min_monthly || self.is_excluded(keyword) {
                    return None;
                }
                Some(self.build_row(keyword, monthly, entry.cpc))
            })
            .collect();

        rows.sort_by(|a, b| {
            b.est_total_rev
                .cmp(&a.est_total_rev)
                .then_with(|| b.monthly_search.cmp(&a.monthly_search))
        });
        rows
    }

    fn build_row(&self, keyword: &str, monthly: u64, cpc: Option<f64>) -> MonetizationRow {
        let estimate = self.params.estimate(monthly);
        MonetizationRow {
            keyword: keyword.to_string(),
            intent: classify_intent(keyword),
            monthly_search: monthly,
            capture_pct: round_to(self.params.capture_pct, 2),
            pv_per_visit: round_to(self.params.pv_per_visit, 3),
            ecpm: round_to(self.params.ecpm, 2),
            aff_cvr_pct: round_to(self.params.aff_cvr_pct, 3),
            aff_commission: round_to(self.params.aff_commission, 2),
            est_visits: truncate(estimate.visits),
            est_pageviews: truncate(estimate.pageviews),
            est_aff_orders: truncate(estimate.affiliate_orders),
            est_display_rev: truncate(estimate.display_revenue),
            est_aff_rev: truncate(estimate.affiliate_revenue),
            est_total_rev: truncate(estimate.total_revenue),
            cpc: cpc.filter(|value| value.is_finite()),
        }
    }
}

pub fn monetize_keywords<S: AsRef<str>>(
    keywords: &[S],
    metrics: &HashMap<String, EnrichedMetrics>,
    params: MonetizationParams,
    min_monthly: u64,
    exclude_tokens: &[String],
) -> Vec<MonetizationRow> {
    Monetizer::new(params, min_monthly, exclude_tokens).monetize(keywords, metrics)
}

pub fn total_revenue(rows: &[MonetizationRow]) -> i64 {
    rows.iter().map(|row| row.est_total_rev).sum()
}

fn truncate(value: f64) -> i64 {
    if value.is_finite() {
        value.trunc() as i64
    } else {
        0
    }
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

pub(crate) fn cmp_f64_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
