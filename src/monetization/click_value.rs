use serde::{Deserialize, Serialize};

use crate::metrics::RelatedKeyword;
use crate::monetization::cmp_f64_desc;

/// Advertiser-side value of a related keyword: monthly clicks times CPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickValueRow {
    pub keyword: String,
    pub monthly_pc: u64,
    pub monthly_mobile: u64,
    pub clicks_pc: u64,
    pub clicks_mobile: u64,
    pub cpc: f64,
    pub competition_index: Option<String>,
    pub est_revenue: i64,
}

pub fn click_value_rows(related: &[RelatedKeyword]) -> Vec<ClickValueRow> {
    let mut rows: Vec<ClickValueRow> = related
        .iter()
        .map(|item| {
            let clicks = item.clicks_pc.saturating_add(item.clicks_mobile) as f64;
            let revenue = clicks * item.cpc;
            ClickValueRow {
                keyword: item.keyword.clone(),
                monthly_pc: item.monthly_pc,
                monthly_mobile: item.monthly_mobile,
                clicks_pc: item.clicks_pc,
                clicks_mobile: item.clicks_mobile,
                cpc: item.cpc,
                competition_index: item.competition_index.clone(),
                est_revenue: if revenue.is_finite() { revenue.trunc() as i64 } else { 0 },
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.est_revenue
            .cmp(&a.est_revenue)
            .then_with(|| cmp_f64_desc(a.cpc, b.cpc))
    });
    rows
}
