use crate::errors::{DashboardError, DashboardResult};
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub dashboard_dir: PathBuf,
    pub output_path: PathBuf,
    pub server_port: u16,
    pub generator: GeneratorConfig,
}

/// Knobs for the synthetic data generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub start_date: NaiveDate,
    pub days: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            days: 120,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> DashboardResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_or("SERVER_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| DashboardError::Config(format!("SERVER_PORT: {e}")))?;

        let seed = env_var_or("GENERATOR_SEED", "42")
            .parse::<u64>()
            .map_err(|e| DashboardError::Config(format!("GENERATOR_SEED: {e}")))?;

        let days = env_var_or("GENERATOR_DAYS", "120")
            .parse::<u32>()
            .map_err(|e| DashboardError::Config(format!("GENERATOR_DAYS: {e}")))?;

        let start_date = parse_date(&env_var_or("GENERATOR_START_DATE", "2024-01-01"))
            .map_err(|e| DashboardError::Config(format!("GENERATOR_START_DATE: {e}")))?;

        let dashboard_dir = PathBuf::from(env_var_or("DASHBOARD_DIR", "dashboard"));
        let output_path = std::env::var("DASHBOARD_OUTPUT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dashboard_dir.join("dashboard_data.json"));

        Ok(Self {
            data_dir: PathBuf::from(env_var_or("DATA_DIR", "data")),
            dashboard_dir,
            output_path,
            server_port,
            generator: GeneratorConfig {
                seed,
                start_date,
                days,
            },
        })
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> DashboardResult<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let d = parse_date(" 2024-03-09 ").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert!(matches!(parse_date("03/09/2024"), Err(DashboardError::Parse(_))));
    }

    #[test]
    fn test_generator_defaults() {
        let g = GeneratorConfig::default();
        assert_eq!(g.seed, 42);
        assert_eq!(g.days, 120);
        assert_eq!(g.start_date.to_string(), "2024-01-01");
    }
}
