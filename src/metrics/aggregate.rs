/// Report aggregation.
/// Every function here is pure: same rows in, bit-identical reports out.
/// Grouping keys map to lazily-created accumulators; ratios and rounding are
/// applied only when the final record is built.

use super::ratios::{attribution, cpa, cpc, ctr, money, roas, round_to};
use super::{CampaignMetric, DailyMetric, PlatformMetric, SummaryMetric};
use crate::state::{AdRow, BusinessRow, Platform, PlatformFeeds};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Base ad metrics shared by every grouping.
#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    impressions: u64,
    clicks: u64,
    spend: f64,
    attributed_revenue: f64,
}

impl Totals {
    #[inline]
    fn add(&mut self, row: &AdRow) {
        self.impressions = self.impressions.saturating_add(row.impressions);
        self.clicks = self.clicks.saturating_add(row.clicks);
        self.spend += row.spend;
        self.attributed_revenue += row.attributed_revenue;
    }

    fn ctr(&self) -> f64 {
        round_to(ctr(self.clicks, self.impressions), 3)
    }

    fn cpc(&self) -> f64 {
        money(cpc(self.spend, self.clicks))
    }

    fn roas(&self) -> f64 {
        round_to(roas(self.attributed_revenue, self.spend), 2)
    }
}

/// One value per platform. Selected by match, never by building field names.
#[derive(Debug, Clone, Copy, Default)]
struct PlatformSplit {
    facebook: f64,
    google: f64,
    tiktok: f64,
}

impl PlatformSplit {
    #[inline]
    fn add(&mut self, platform: Platform, value: f64) {
        match platform {
            Platform::Facebook => self.facebook += value,
            Platform::Google => self.google += value,
            Platform::TikTok => self.tiktok += value,
        }
    }
}

#[derive(Debug, Default)]
struct DayAccumulator {
    totals: Totals,
    spend: PlatformSplit,
    revenue: PlatformSplit,
}

/// Stamp every feed row with its platform and concatenate the feeds in
/// canonical platform order, preserving each feed's row order.
pub fn tag_and_combine(feeds: &PlatformFeeds) -> Vec<AdRow> {
    let total = Platform::ALL.iter().map(|p| feeds.get(*p).len()).sum();
    let mut combined = Vec::with_capacity(total);
    for platform in Platform::ALL {
        combined.extend(
            feeds
                .get(platform)
                .iter()
                .map(|record| AdRow::from_record(record, platform)),
        );
    }
    combined
}

/// Daily series, ascending by date, one record per date present in the ad
/// rows. Business results are left-joined on the ad dates: a missing
/// business row means zero business activity, and business-only dates are
/// dropped.
pub fn daily_metrics(ad_rows: &[AdRow], business_rows: &[BusinessRow]) -> Vec<DailyMetric> {
    let mut by_date: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for row in ad_rows {
        let day = by_date.entry(row.date).or_default();
        day.totals.add(row);
        day.spend.add(row.platform, row.spend);
        day.revenue.add(row.platform, row.attributed_revenue);
    }

    // Later rows overwrite earlier ones for the same date.
    let business: HashMap<NaiveDate, &BusinessRow> =
        business_rows.iter().map(|b| (b.date, b)).collect();

    by_date
        .into_iter()
        .map(|(date, day)| {
            let biz = business.get(&date);
            let total_revenue = biz.map_or(0.0, |b| b.total_revenue);
            let t = &day.totals;

            DailyMetric {
                date,
                impressions: t.impressions,
                clicks: t.clicks,
                spend: money(t.spend),
                attributed_revenue: money(t.attributed_revenue),
                ctr: t.ctr(),
                cpc: t.cpc(),
                roas: t.roas(),
                orders: biz.map_or(0, |b| b.orders),
                new_customers: biz.map_or(0, |b| b.new_customers),
                total_revenue: money(total_revenue),
                gross_profit: money(biz.map_or(0.0, |b| b.gross_profit)),
                marketing_attribution: round_to(attribution(t.attributed_revenue, total_revenue), 1),
                facebook_spend: money(day.spend.facebook),
                google_spend: money(day.spend.google),
                tiktok_spend: money(day.spend.tiktok),
                facebook_revenue: money(day.revenue.facebook),
                google_revenue: money(day.revenue.google),
                tiktok_revenue: money(day.revenue.tiktok),
            }
        })
        .collect()
}

/// Per-platform totals, descending by spend.
pub fn platform_performance(ad_rows: &[AdRow]) -> Vec<PlatformMetric> {
    let mut by_platform: BTreeMap<Platform, (Totals, HashSet<&str>)> = BTreeMap::new();
    for row in ad_rows {
        let (totals, campaigns) = by_platform.entry(row.platform).or_default();
        totals.add(row);
        campaigns.insert(row.campaign.as_str());
    }

    let mut result: Vec<PlatformMetric> = by_platform
        .into_iter()
        .map(|(platform, (t, campaigns))| PlatformMetric {
            platform,
            impressions: t.impressions,
            clicks: t.clicks,
            spend: money(t.spend),
            attributed_revenue: money(t.attributed_revenue),
            ctr: t.ctr(),
            cpc: t.cpc(),
            roas: t.roas(),
            campaigns: campaigns.len(),
        })
        .collect();

    sort_by_spend_desc(&mut result, |m| m.spend);
    result
}

/// Per-campaign totals, descending by spend.
///
/// Campaigns are keyed by name alone. The reported platform is whichever
/// row was folded in last, so a name reused across platforms reports the
/// later feed's platform; see [`campaign_platform_conflicts`].
pub fn campaign_performance(ad_rows: &[AdRow]) -> Vec<CampaignMetric> {
    // First-seen order, so ties come out in a stable, input-defined order.
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut campaigns: Vec<(&str, Platform, Totals)> = Vec::new();

    for row in ad_rows {
        let slot = *index.entry(row.campaign.as_str()).or_insert_with(|| {
            campaigns.push((row.campaign.as_str(), row.platform, Totals::default()));
            campaigns.len() - 1
        });
        let (_, platform, totals) = &mut campaigns[slot];
        totals.add(row);
        *platform = row.platform;
    }

    let mut result: Vec<CampaignMetric> = campaigns
        .into_iter()
        .map(|(campaign, platform, t)| CampaignMetric {
            campaign: campaign.to_string(),
            platform,
            impressions: t.impressions,
            clicks: t.clicks,
            spend: money(t.spend),
            attributed_revenue: money(t.attributed_revenue),
            ctr: t.ctr(),
            cpc: t.cpc(),
            roas: t.roas(),
        })
        .collect();

    sort_by_spend_desc(&mut result, |m| m.spend);
    result
}

/// Grand totals over the daily series. `None` for an empty series.
pub fn summary_metrics(daily: &[DailyMetric]) -> Option<SummaryMetric> {
    if daily.is_empty() {
        return None;
    }

    let mut spend = 0.0;
    let mut attributed_revenue = 0.0;
    let mut total_revenue = 0.0;
    let mut orders: u64 = 0;
    let mut new_customers: u64 = 0;
    let mut impressions: u64 = 0;
    let mut clicks: u64 = 0;

    for d in daily {
        spend += d.spend;
        attributed_revenue += d.attributed_revenue;
        total_revenue += d.total_revenue;
        orders = orders.saturating_add(d.orders);
        new_customers = new_customers.saturating_add(d.new_customers);
        impressions = impressions.saturating_add(d.impressions);
        clicks = clicks.saturating_add(d.clicks);
    }

    Some(SummaryMetric {
        total_spend: money(spend),
        total_attributed_revenue: money(attributed_revenue),
        total_revenue: money(total_revenue),
        total_orders: orders,
        total_new_customers: new_customers,
        total_impressions: impressions,
        total_clicks: clicks,
        avg_ctr: round_to(ctr(clicks, impressions), 3),
        avg_cpc: money(cpc(spend, clicks)),
        overall_roas: round_to(roas(attributed_revenue, spend), 2),
        cpa: money(cpa(spend, new_customers)),
        attribution_rate: round_to(attribution(attributed_revenue, total_revenue), 1),
    })
}

/// Campaign names that appear under more than one platform, first-seen order.
pub fn campaign_platform_conflicts(ad_rows: &[AdRow]) -> Vec<String> {
    let mut first_platform: HashMap<&str, Platform> = HashMap::new();
    let mut flagged: HashSet<&str> = HashSet::new();
    let mut conflicts = Vec::new();

    for row in ad_rows {
        let seen = *first_platform
            .entry(row.campaign.as_str())
            .or_insert(row.platform);
        if seen != row.platform && flagged.insert(row.campaign.as_str()) {
            conflicts.push(row.campaign.clone());
        }
    }
    conflicts
}

/// Stable descending sort on an already-rounded spend value.
fn sort_by_spend_desc<T>(items: &mut [T], spend: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| spend(b).total_cmp(&spend(a)));
}
