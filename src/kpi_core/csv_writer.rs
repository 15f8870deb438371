//! CSV writer for the daily KPI table - the interchange format the detector reads back

use super::daily::DailyMetricRow;
use super::writer_backend::{MetricsWriterBackend, MetricsWriterError};
use async_trait::async_trait;
use std::path::PathBuf;

/// CSV backend for the daily KPI table
pub struct DailyTableCsvWriter {
    path: PathBuf,
}

impl DailyTableCsvWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn write_rows(&self, rows: &[DailyMetricRow]) -> Result<(), MetricsWriterError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;

        // Audit columns only appear when the payments source was present
        let has_audit = rows.first().map(|r| r.has_audit_columns()).unwrap_or(false);

        let mut header = vec![
            "date",
            "orders_count",
            "revenue",
            "canceled_orders",
            "avg_order_value",
        ];
        if has_audit {
            header.push("revenue_items");
            header.push("revenue_payments");
        }
        writer.write_record(&header)?;

        for row in rows {
            let mut record = vec![
                row.date.format("%Y-%m-%d").to_string(),
                row.orders_count.to_string(),
                row.revenue.to_string(),
                row.canceled_orders.to_string(),
                row.avg_order_value.to_string(),
            ];
            if has_audit {
                record.push(row.revenue_items.unwrap_or(0.0).to_string());
                record.push(row.revenue_payments.unwrap_or(0.0).to_string());
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
        log::info!("📝 Daily metrics CSV written: {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl MetricsWriterBackend for DailyTableCsvWriter {
    async fn write_table(&mut self, rows: &[DailyMetricRow]) -> Result<(), MetricsWriterError> {
        self.write_rows(rows)
    }

    fn backend_type(&self) -> &'static str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi_core::reader::read_daily_table;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn make_row(day: u32, orders: u32, revenue: f64) -> DailyMetricRow {
        DailyMetricRow {
            date: NaiveDate::from_ymd_opt(2017, 1, day).unwrap(),
            orders_count: orders,
            revenue,
            canceled_orders: 0,
            avg_order_value: if orders > 0 { revenue / orders as f64 } else { 0.0 },
            revenue_items: None,
            revenue_payments: None,
        }
    }

    #[tokio::test]
    async fn test_csv_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        let mut writer = DailyTableCsvWriter::new(path.clone());

        let rows = vec![make_row(5, 2, 100.5), make_row(6, 0, 0.0)];
        writer.write_table(&rows).await.unwrap();

        let read_back = read_daily_table(&path).unwrap();
        assert_eq!(read_back, rows);
    }

    #[tokio::test]
    async fn test_audit_columns_written_when_present() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        let mut writer = DailyTableCsvWriter::new(path.clone());

        let mut row = make_row(5, 1, 63.5);
        row.revenue_items = Some(60.0);
        row.revenue_payments = Some(63.5);
        writer.write_table(&[row]).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(
            "date,orders_count,revenue,canceled_orders,avg_order_value,revenue_items,revenue_payments"
        ));

        let read_back = read_daily_table(&path).unwrap();
        assert_eq!(read_back[0].revenue_items, Some(60.0));
    }

    #[tokio::test]
    async fn test_rewrite_replaces_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        let mut writer = DailyTableCsvWriter::new(path.clone());

        writer.write_table(&[make_row(5, 2, 100.0), make_row(6, 1, 50.0)]).await.unwrap();
        writer.write_table(&[make_row(7, 3, 75.0)]).await.unwrap();

        let read_back = read_daily_table(&path).unwrap();
        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].date.to_string(), "2017-01-07");
    }
}
