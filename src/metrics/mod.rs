pub mod aggregate;
pub mod export;
pub mod ratios;

use crate::state::Platform;
use chrono::NaiveDate;

// All report records are emitted already rounded (see `ratios::round_to`).
// Sums stay at full precision until the record is built.

/// One day of ad activity joined with that day's business results.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DailyMetric {
    pub date: NaiveDate,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub roas: f64,
    pub orders: u64,
    pub new_customers: u64,
    pub total_revenue: f64,
    pub gross_profit: f64,
    pub marketing_attribution: f64,
    pub facebook_spend: f64,
    pub google_spend: f64,
    pub tiktok_spend: f64,
    pub facebook_revenue: f64,
    pub google_revenue: f64,
    pub tiktok_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlatformMetric {
    pub platform: Platform,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub roas: f64,
    /// Distinct campaign names seen on this platform.
    pub campaigns: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CampaignMetric {
    pub campaign: String,
    /// Platform of the last row folded into this campaign.
    pub platform: Platform,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub attributed_revenue: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub roas: f64,
}

/// Grand totals and rates across the whole daily series.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SummaryMetric {
    pub total_spend: f64,
    pub total_attributed_revenue: f64,
    pub total_revenue: f64,
    pub total_orders: u64,
    pub total_new_customers: u64,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub avg_ctr: f64,
    pub avg_cpc: f64,
    pub overall_roas: f64,
    /// Cost per new customer.
    pub cpa: f64,
    pub attribution_rate: f64,
}
