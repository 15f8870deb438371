//! SQLite writer for the daily KPI table
//!
//! Keeps a queryable copy of the table in a daily_metrics table, UPSERTed
//! on date so repeated aggregation runs converge to the latest snapshot.

use super::daily::DailyMetricRow;
use super::writer_backend::{MetricsWriterBackend, MetricsWriterError};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite backend for the daily KPI table
pub struct SqliteMetricsWriter {
    conn: Connection,
}

impl SqliteMetricsWriter {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, MetricsWriterError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    MetricsWriterError::Database(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS daily_metrics (
                date TEXT PRIMARY KEY,
                orders_count INTEGER NOT NULL,
                revenue REAL NOT NULL,
                canceled_orders INTEGER NOT NULL,
                avg_order_value REAL NOT NULL,
                revenue_items REAL,
                revenue_payments REAL
            )",
            [],
        )?;

        log::info!("✅ SQLite metrics database initialized with WAL mode");

        Ok(Self { conn })
    }

    fn upsert_rows(&mut self, rows: &[DailyMetricRow]) -> Result<(), MetricsWriterError> {
        let tx = self.conn.transaction()?;

        for row in rows {
            tx.execute(
                "INSERT INTO daily_metrics
                 (date, orders_count, revenue, canceled_orders, avg_order_value,
                  revenue_items, revenue_payments)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(date) DO UPDATE SET
                    orders_count = excluded.orders_count,
                    revenue = excluded.revenue,
                    canceled_orders = excluded.canceled_orders,
                    avg_order_value = excluded.avg_order_value,
                    revenue_items = excluded.revenue_items,
                    revenue_payments = excluded.revenue_payments",
                params![
                    row.date.format("%Y-%m-%d").to_string(),
                    row.orders_count,
                    row.revenue,
                    row.canceled_orders,
                    row.avg_order_value,
                    row.revenue_items,
                    row.revenue_payments,
                ],
            )?;
        }

        tx.commit()?;
        log::debug!("✅ Upserted {} daily rows into SQLite", rows.len());
        Ok(())
    }
}

#[async_trait]
impl MetricsWriterBackend for SqliteMetricsWriter {
    async fn write_table(&mut self, rows: &[DailyMetricRow]) -> Result<(), MetricsWriterError> {
        self.upsert_rows(rows)
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}
