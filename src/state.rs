use crate::config::AppConfig;
use crate::metrics::export::DashboardExport;
use chrono::NaiveDate;
use portable_atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::watch;

// ── Ad Platforms ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum Platform {
    Facebook,
    Google,
    TikTok,
}

impl Platform {
    /// Canonical feed order. Combined rows are concatenated in this order.
    pub const ALL: [Platform; 3] = [Platform::Facebook, Platform::Google, Platform::TikTok];

    pub fn name(self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Google => "Google",
            Self::TikTok => "TikTok",
        }
    }

    /// CSV file stem for this platform's feed (`facebook.csv`, ...).
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Google => "google",
            Self::TikTok => "tiktok",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Raw Rows ──

/// One row of a platform feed, before it is stamped with its platform.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AdRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub tactic: String,
    #[serde(default)]
    pub state: String,
    pub campaign: String,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub attributed_revenue: f64,
}

/// A platform-tagged ad row. Input of every aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct AdRow {
    pub date: NaiveDate,
    pub platform: Platform,
    pub campaign: String,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub attributed_revenue: f64,
}

impl AdRow {
    pub fn from_record(record: &AdRecord, platform: Platform) -> Self {
        Self {
            date: record.date,
            platform,
            campaign: record.campaign.clone(),
            impressions: record.impressions,
            clicks: record.clicks,
            spend: record.spend,
            attributed_revenue: record.attributed_revenue,
        }
    }
}

/// Daily business results. `new_orders` and `cogs` are carried for the CSV
/// round trip but not used by the aggregator.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BusinessRow {
    pub date: NaiveDate,
    pub orders: u64,
    #[serde(default)]
    pub new_orders: u64,
    pub new_customers: u64,
    pub total_revenue: f64,
    pub gross_profit: f64,
    #[serde(default)]
    pub cogs: f64,
}

/// The three platform feeds, one explicit field per platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformFeeds {
    pub facebook: Vec<AdRecord>,
    pub google: Vec<AdRecord>,
    pub tiktok: Vec<AdRecord>,
}

impl PlatformFeeds {
    pub fn get(&self, platform: Platform) -> &[AdRecord] {
        match platform {
            Platform::Facebook => &self.facebook,
            Platform::Google => &self.google,
            Platform::TikTok => &self.tiktok,
        }
    }

    pub fn get_mut(&mut self, platform: Platform) -> &mut Vec<AdRecord> {
        match platform {
            Platform::Facebook => &mut self.facebook,
            Platform::Google => &mut self.google,
            Platform::TikTok => &mut self.tiktok,
        }
    }
}

/// Everything the aggregator needs, as loaded from the data directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub feeds: PlatformFeeds,
    pub business: Vec<BusinessRow>,
}

// ── Server State ──

/// Request counters. Lock-free, read by `/api/counters`.
pub struct Counters {
    pub requests_served: AtomicU64,
    pub refreshes: AtomicU64,
    pub refresh_failures: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self {
            requests_served: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
            refresh_failures: AtomicU64::new(0),
        }
    }
}

/// Shared state handed to every axum handler.
pub struct AppState {
    pub config: AppConfig,
    pub export_tx: watch::Sender<Arc<DashboardExport>>,
    pub export_rx: watch::Receiver<Arc<DashboardExport>>,
    pub counters: Counters,
}

impl AppState {
    pub fn new(config: AppConfig, initial: DashboardExport) -> Arc<Self> {
        let (export_tx, export_rx) = watch::channel(Arc::new(initial));
        Arc::new(Self {
            config,
            export_tx,
            export_rx,
            counters: Counters::new(),
        })
    }

    /// Current export. Cheap: clones the `Arc`, never blocks the refresher.
    pub fn current(&self) -> Arc<DashboardExport> {
        self.export_rx.borrow().clone()
    }

    pub fn publish(&self, export: DashboardExport) {
        // send_replace never fails, even with no live receivers
        self.export_tx.send_replace(Arc::new(export));
    }
}
