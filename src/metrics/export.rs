use super::aggregate::{
    campaign_performance, campaign_platform_conflicts, daily_metrics, platform_performance,
    summary_metrics, tag_and_combine,
};
use super::{CampaignMetric, DailyMetric, PlatformMetric, SummaryMetric};
use crate::config::AppConfig;
use crate::errors::{DashboardError, DashboardResult};
use crate::ingest;
use crate::state::Dataset;
use serde::Serializer;
use std::io::Write;
use std::path::Path;

/// The JSON payload the dashboard front end reads.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DashboardExport {
    /// Serialized as `{}` when there is no data.
    #[serde(serialize_with = "summary_or_empty")]
    pub summary: Option<SummaryMetric>,
    pub daily_metrics: Vec<DailyMetric>,
    pub platform_performance: Vec<PlatformMetric>,
    pub campaign_performance: Vec<CampaignMetric>,
    pub last_updated: String,
}

fn summary_or_empty<S: Serializer>(
    summary: &Option<SummaryMetric>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match summary {
        Some(s) => serializer.serialize_some(s),
        None => serializer.serialize_some(&serde_json::Map::new()),
    }
}

impl DashboardExport {
    /// Compute every report view from a loaded dataset.
    pub fn build(dataset: &Dataset) -> Self {
        let rows = tag_and_combine(&dataset.feeds);

        for campaign in campaign_platform_conflicts(&rows) {
            tracing::warn!(
                campaign = %campaign,
                "campaign name used on more than one platform; reporting last-seen platform"
            );
        }

        let daily = daily_metrics(&rows, &dataset.business);
        Self {
            summary: summary_metrics(&daily),
            daily_metrics: daily,
            platform_performance: platform_performance(&rows),
            campaign_performance: campaign_performance(&rows),
            last_updated: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Export with no data, stamped now.
    pub fn empty() -> Self {
        Self::build(&Dataset::default())
    }
}

/// Write the export as pretty-printed JSON, creating parent directories.
pub fn write_export(export: &DashboardExport, path: &Path) -> DashboardResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| DashboardError::Io(format!("create dir {}: {e}", parent.display())))?;
    }

    let file = std::fs::File::create(path)
        .map_err(|e| DashboardError::Io(format!("create {}: {e}", path.display())))?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, export)?;
    writer.flush()?;

    tracing::info!(path = %path.display(), "dashboard data exported");
    Ok(())
}

/// Load CSVs, build the export, write it to the configured output path.
pub fn run_pipeline(config: &AppConfig) -> DashboardResult<DashboardExport> {
    tracing::info!(data_dir = %config.data_dir.display(), "processing marketing and business data");

    let dataset = ingest::load_dataset(&config.data_dir)?;
    let export = DashboardExport::build(&dataset);
    write_export(&export, &config.output_path)?;

    match &export.summary {
        Some(s) => tracing::info!(
            total_spend = s.total_spend,
            total_attributed_revenue = s.total_attributed_revenue,
            overall_roas = s.overall_roas,
            total_orders = s.total_orders,
            attribution_rate = s.attribution_rate,
            "summary metrics"
        ),
        None => tracing::warn!("no ad data found; summary is empty"),
    }

    Ok(export)
}
