/// Domain-specific error types for the reporting pipeline.
/// Every failure is fatal to the single call that hit it:
/// - Malformed CSV rows abort ingestion (no partial-row recovery)
/// - Missing business dates are NOT errors (zero-filled by the aggregator)
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("io error: {0}")]
    Io(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),
}

impl From<std::io::Error> for DashboardError {
    fn from(e: std::io::Error) -> Self {
        DashboardError::Io(e.to_string())
    }
}

impl From<csv::Error> for DashboardError {
    fn from(e: csv::Error) -> Self {
        DashboardError::Csv(e.to_string())
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(e: serde_json::Error) -> Self {
        DashboardError::Serialize(e.to_string())
    }
}

impl From<chrono::ParseError> for DashboardError {
    fn from(e: chrono::ParseError) -> Self {
        DashboardError::Parse(e.to_string())
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
