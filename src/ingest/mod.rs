use crate::errors::{DashboardError, DashboardResult};
use crate::state::{AdRecord, BusinessRow, Dataset, Platform, PlatformFeeds};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const BUSINESS_FILE: &str = "business.csv";

/// Path of a platform's feed inside the data directory.
pub fn feed_path(data_dir: &Path, platform: Platform) -> std::path::PathBuf {
    data_dir.join(format!("{}.csv", platform.file_stem()))
}

/// Deserialize every row of a headered CSV. The first malformed row aborts
/// the whole read; there is no skip-and-continue.
fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> DashboardResult<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize::<T>().enumerate() {
        // +2: one for the header line, one for 1-based numbering
        let row = result.map_err(|e| DashboardError::Csv(format!("row {}: {e}", i + 2)))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_ad_records<R: Read>(reader: R) -> DashboardResult<Vec<AdRecord>> {
    read_rows(reader)
}

pub fn read_business_rows<R: Read>(reader: R) -> DashboardResult<Vec<BusinessRow>> {
    read_rows(reader)
}

fn open(path: &Path) -> DashboardResult<File> {
    File::open(path).map_err(|e| DashboardError::Io(format!("open {}: {e}", path.display())))
}

fn with_path(path: &Path, e: DashboardError) -> DashboardError {
    match e {
        DashboardError::Csv(msg) => DashboardError::Csv(format!("{}: {msg}", path.display())),
        other => other,
    }
}

pub fn load_ad_feed(path: &Path) -> DashboardResult<Vec<AdRecord>> {
    read_ad_records(open(path)?).map_err(|e| with_path(path, e))
}

pub fn load_business(path: &Path) -> DashboardResult<Vec<BusinessRow>> {
    read_business_rows(open(path)?).map_err(|e| with_path(path, e))
}

/// Load the three platform feeds and the business feed from `data_dir`.
pub fn load_dataset(data_dir: &Path) -> DashboardResult<Dataset> {
    let mut feeds = PlatformFeeds::default();
    for platform in Platform::ALL {
        let path = feed_path(data_dir, platform);
        let records = load_ad_feed(&path)?;
        tracing::info!(platform = %platform, rows = records.len(), "loaded ad feed");
        *feeds.get_mut(platform) = records;
    }

    let business = load_business(&data_dir.join(BUSINESS_FILE))?;
    tracing::info!(rows = business.len(), "loaded business feed");

    Ok(Dataset { feeds, business })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const AD_CSV: &str = "\
date,tactic,state,campaign,impressions,clicks,spend,attributed_revenue
2024-01-01,Video_Ads,CA,Brand_Awareness_Q1,5120,98,143.2,85.5
2024-01-02, Single_Image ,NY,Retargeting_Feb,4000,90,120.75,310.0
";

    const BUSINESS_CSV: &str = "\
date,orders,new_orders,new_customers,total_revenue,gross_profit,cogs
2024-01-01,450,160,120,35100.5,19305.28,15795.22
";

    #[test]
    fn test_read_ad_records() {
        let rows = read_ad_records(AD_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(rows[0].campaign, "Brand_Awareness_Q1");
        assert_eq!(rows[0].impressions, 5120);
        assert_eq!(rows[1].tactic, "Single_Image");
        assert_eq!(rows[1].spend, 120.75);
    }

    #[test]
    fn test_ad_records_without_optional_columns() {
        let csv = "date,campaign,impressions,clicks,spend,attributed_revenue\n2024-02-01,X,10,1,0.5,0\n";
        let rows = read_ad_records(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].tactic, "");
        assert_eq!(rows[0].attributed_revenue, 0.0);
    }

    #[test]
    fn test_read_business_rows() {
        let rows = read_business_rows(BUSINESS_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].orders, 450);
        assert_eq!(rows[0].new_customers, 120);
        assert_eq!(rows[0].total_revenue, 35100.5);
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let csv = "date,campaign,impressions,clicks,spend,attributed_revenue\n2024-02-01,X,lots,1,0.5,0\n";
        let err = read_ad_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DashboardError::Csv(ref m) if m.contains("row 2")), "{err}");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let csv = "date,campaign,impressions,clicks,spend\n2024-02-01,X,10,1,0.5\n";
        assert!(read_ad_records(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let csv = "date,orders,new_customers,total_revenue,gross_profit\n01/02/2024,1,1,1,1\n";
        assert!(read_business_rows(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_load_dataset() {
        let dir = TempDir::new().unwrap();
        for platform in Platform::ALL {
            std::fs::write(feed_path(dir.path(), platform), AD_CSV).unwrap();
        }
        std::fs::write(dir.path().join(BUSINESS_FILE), BUSINESS_CSV).unwrap();

        let dataset = load_dataset(dir.path()).unwrap();
        assert_eq!(dataset.feeds.facebook.len(), 2);
        assert_eq!(dataset.feeds.google.len(), 2);
        assert_eq!(dataset.feeds.tiktok.len(), 2);
        assert_eq!(dataset.business.len(), 1);
    }

    #[test]
    fn test_load_dataset_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_dataset(dir.path()).unwrap_err();
        assert!(matches!(err, DashboardError::Io(ref m) if m.contains("facebook.csv")), "{err}");
    }
}
