//! Writer backend trait for the daily KPI table
//!
//! Defines the interface for exporting the aggregated table to different backends.

use super::daily::DailyMetricRow;
use async_trait::async_trait;

#[derive(Debug)]
pub enum MetricsWriterError {
    Io(std::io::Error),
    Csv(csv::Error),
    Database(String),
}

impl From<std::io::Error> for MetricsWriterError {
    fn from(err: std::io::Error) -> Self {
        MetricsWriterError::Io(err)
    }
}

impl From<csv::Error> for MetricsWriterError {
    fn from(err: csv::Error) -> Self {
        MetricsWriterError::Csv(err)
    }
}

impl From<rusqlite::Error> for MetricsWriterError {
    fn from(err: rusqlite::Error) -> Self {
        MetricsWriterError::Database(err.to_string())
    }
}

impl std::fmt::Display for MetricsWriterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsWriterError::Io(e) => write!(f, "IO error: {}", e),
            MetricsWriterError::Csv(e) => write!(f, "CSV error: {}", e),
            MetricsWriterError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for MetricsWriterError {}

/// Backend trait for exporting the daily KPI table
///
/// A write replaces the backend's copy of the table wholesale; the table is
/// a per-run snapshot, not an append stream.
#[async_trait]
pub trait MetricsWriterBackend: Send {
    /// Write the full daily table
    async fn write_table(&mut self, rows: &[DailyMetricRow]) -> Result<(), MetricsWriterError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
