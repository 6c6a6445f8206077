pub mod profiles;

use crate::config::GeneratorConfig;
use crate::errors::{DashboardError, DashboardResult};
use crate::ingest::{feed_path, BUSINESS_FILE};
use crate::metrics::ratios::money;
use crate::state::{AdRecord, BusinessRow, Dataset, Platform};
use chrono::{Datelike, NaiveDate, Weekday};
use profiles::{PlatformProfile, RowsPerDay};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use statrs::distribution::{Binomial, Normal};
use std::f64::consts::PI;
use std::path::Path;

const STATES: [&str; 10] = ["CA", "NY", "TX", "FL", "IL", "PA", "OH", "MI", "GA", "NC"];

// Business baselines
const BASE_ORDERS: f64 = 450.0;
const BASE_NEW_CUSTOMERS: f64 = 120.0;
const BUSINESS_SEASONAL_AMPLITUDE: f64 = 0.25;
const WEEKEND_FACTOR: f64 = 1.2;
/// Total growth over the generated window (30%).
const GROWTH_OVER_WINDOW: f64 = 0.3;

/// Seeded source of synthetic draws. Same seed, same dataset.
pub struct Generator {
    rng: StdRng,
}

impl Generator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw from N(mean, std). A degenerate std yields the mean.
    fn gaussian(&mut self, mean: f64, std: f64) -> f64 {
        match Normal::new(mean, std) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => mean,
        }
    }

    /// Successes in `trials` draws with probability `p` (clamped to [0, 1]).
    fn binomial(&mut self, trials: u64, p: f64) -> u64 {
        match Binomial::new(p.clamp(0.0, 1.0), trials) {
            Ok(binomial) => binomial.sample(&mut self.rng) as u64,
            Err(_) => 0,
        }
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn rows_today(&mut self, rule: RowsPerDay) -> u32 {
        match rule {
            RowsPerDay::Between(lo, hi) => self.rng.gen_range(lo..=hi),
            RowsPerDay::Chance(p) => u32::from(self.rng.gen_bool(p)),
        }
    }

    /// One platform feed over `dates`.
    pub fn ad_feed(&mut self, profile: &PlatformProfile, dates: &[NaiveDate]) -> Vec<AdRecord> {
        let mut rows = Vec::new();
        for &date in dates {
            let seasonal = seasonal_factor(date, profile.seasonal_amplitude);
            for &(campaign, conv_rate) in profile.campaigns {
                for _ in 0..self.rows_today(profile.rows_per_day) {
                    let state = self.pick(&STATES);
                    let tactic = self.pick(profile.tactics);

                    let imp = profile.impressions;
                    let impressions =
                        ((self.gaussian(imp.mean, imp.std) * seasonal) as i64).max(imp.floor as i64) as u64;

                    let ctr = self
                        .gaussian(profile.ctr.mean, profile.ctr.std)
                        .clamp(profile.ctr.min, profile.ctr.max);
                    let clicks = (impressions as f64 * ctr) as u64;

                    let cpc = self
                        .gaussian(profile.cpc.mean, profile.cpc.std)
                        .max(profile.cpc.floor);
                    let spend = clicks as f64 * cpc;

                    let conversions = self.binomial(clicks, conv_rate);
                    let aov = self
                        .gaussian(profile.order_value.mean, profile.order_value.std)
                        .max(profile.order_value.floor);

                    rows.push(AdRecord {
                        date,
                        tactic: tactic.to_string(),
                        state: state.to_string(),
                        campaign: campaign.to_string(),
                        impressions,
                        clicks,
                        spend: money(spend),
                        attributed_revenue: money(conversions as f64 * aov),
                    });
                }
            }
        }
        rows
    }

    /// Daily business results with seasonality, weekend lift and growth.
    pub fn business(&mut self, dates: &[NaiveDate]) -> Vec<BusinessRow> {
        let n = dates.len().max(1) as f64;
        dates
            .iter()
            .enumerate()
            .map(|(i, &date)| {
                let weekend = match date.weekday() {
                    Weekday::Sat | Weekday::Sun => WEEKEND_FACTOR,
                    _ => 1.0,
                };
                let growth = 1.0 + (i as f64 / n) * GROWTH_OVER_WINDOW;
                let factor = seasonal_factor(date, BUSINESS_SEASONAL_AMPLITUDE) * weekend * growth;

                let orders = (self.gaussian(BASE_ORDERS * factor, 50.0) as i64).max(50);

                let new_order_rate = self.gaussian(0.35, 0.05).clamp(0.2, 0.6);
                let new_orders = (orders as f64 * new_order_rate) as i64;

                let drawn_new = self.gaussian(BASE_NEW_CUSTOMERS * factor, 20.0) as i64;
                let new_customers = new_orders.min(drawn_new).max(20);

                let aov = self.gaussian(78.0, 25.0).max(20.0);
                let total_revenue = orders as f64 * aov;

                let cogs_rate = self.gaussian(0.45, 0.05).clamp(0.3, 0.65);
                let cogs = total_revenue * cogs_rate;

                BusinessRow {
                    date,
                    orders: orders as u64,
                    new_orders: new_orders as u64,
                    new_customers: new_customers as u64,
                    total_revenue: money(total_revenue),
                    gross_profit: money(total_revenue - cogs),
                    cogs: money(cogs),
                }
            })
            .collect()
    }
}

fn seasonal_factor(date: NaiveDate, amplitude: f64) -> f64 {
    1.0 + amplitude * (2.0 * PI * date.ordinal() as f64 / 365.0).sin()
}

/// Consecutive dates starting at `start`.
pub fn date_range(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    start.iter_days().take(days as usize).collect()
}

/// Generate all four feeds. Platforms are drawn in canonical order, then
/// business results, so a seed always reproduces the same files.
pub fn generate(config: &GeneratorConfig) -> Dataset {
    let dates = date_range(config.start_date, config.days);
    let mut generator = Generator::new(config.seed);

    let mut dataset = Dataset::default();
    for platform in Platform::ALL {
        *dataset.feeds.get_mut(platform) = generator.ad_feed(profiles::profile(platform), &dates);
    }
    dataset.business = generator.business(&dates);
    dataset
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> DashboardResult<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| DashboardError::Csv(format!("{}: {e}", path.display())))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the dataset as `facebook.csv`, `google.csv`, `tiktok.csv` and
/// `business.csv` under `data_dir`.
pub fn write_csvs(dataset: &Dataset, data_dir: &Path) -> DashboardResult<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| DashboardError::Io(format!("create dir {}: {e}", data_dir.display())))?;

    for platform in Platform::ALL {
        let path = feed_path(data_dir, platform);
        let rows = dataset.feeds.get(platform);
        write_csv(&path, rows)?;
        tracing::info!(platform = %platform, rows = rows.len(), path = %path.display(), "wrote ad feed");
    }

    let path = data_dir.join(BUSINESS_FILE);
    write_csv(&path, &dataset.business)?;
    tracing::info!(rows = dataset.business.len(), path = %path.display(), "wrote business feed");
    Ok(())
}
