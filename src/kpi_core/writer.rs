//! Unified exporter for the daily KPI table
//!
//! Fans writes out to both configured backends: the CSV interchange file
//! the detector consumes, and the SQLite copy kept for ad-hoc queries.

use super::csv_writer::DailyTableCsvWriter;
use super::daily::DailyMetricRow;
use super::sqlite_writer::SqliteMetricsWriter;
use super::writer_backend::{MetricsWriterBackend, MetricsWriterError};
use std::path::PathBuf;

/// Exporter writing the daily table through every configured backend
pub struct MetricsExporter {
    backends: Vec<Box<dyn MetricsWriterBackend>>,
}

impl MetricsExporter {
    /// Create an exporter with the CSV and SQLite backends
    pub fn new(csv_path: PathBuf, db_path: PathBuf) -> Result<Self, MetricsWriterError> {
        let backends: Vec<Box<dyn MetricsWriterBackend>> = vec![
            Box::new(DailyTableCsvWriter::new(csv_path)),
            Box::new(SqliteMetricsWriter::new(db_path)?),
        ];
        Ok(Self { backends })
    }

    /// Write the full daily table to every backend
    pub async fn write_table(&mut self, rows: &[DailyMetricRow]) -> Result<(), MetricsWriterError> {
        for backend in &mut self.backends {
            backend.write_table(rows).await?;
            log::info!("✅ Daily table exported via {} backend", backend.backend_type());
        }
        Ok(())
    }
}
