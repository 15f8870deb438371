//! KPI Builder - Daily Operational Metrics Aggregation
//!
//! This binary turns the raw marketplace exports into the daily KPI table:
//! - Loads orders, order items, and (when present) payments
//! - Aggregates per purchase day, zero-filling calendar gaps
//! - Exports the table to CSV and SQLite
//!
//! Usage:
//!   cargo run --release --bin kpi_builder
//!
//! Environment variables:
//!   OPSFLOW_DATA_DIR  - Directory with the raw CSV exports (default: data)
//!   OPSFLOW_DATA_FILE - Output CSV path (default: data/daily_ops_metrics.csv)
//!   OPSFLOW_DB_PATH   - Output SQLite path (default: data/opsflow.db)

use dotenv::dotenv;
use log::info;
use opsflow::kpi_core::{
    build_daily_table, load_items, load_orders, load_payments, MetricsExporter,
};
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let data_dir =
        PathBuf::from(env::var("OPSFLOW_DATA_DIR").unwrap_or_else(|_| "data".to_string()));
    let output_csv = PathBuf::from(
        env::var("OPSFLOW_DATA_FILE")
            .unwrap_or_else(|_| "data/daily_ops_metrics.csv".to_string()),
    );
    let db_path =
        PathBuf::from(env::var("OPSFLOW_DB_PATH").unwrap_or_else(|_| "data/opsflow.db".to_string()));

    info!("🚀 KPI Builder");
    info!("   ├─ Data dir: {}", data_dir.display());
    info!("   ├─ CSV output: {}", output_csv.display());
    info!("   └─ SQLite output: {}", db_path.display());

    let orders = load_orders(data_dir.join("olist_orders_dataset.csv"))?;
    let items = load_items(data_dir.join("olist_order_items_dataset.csv"))?;

    // Payments are optional; without them revenue falls back to item totals
    let payments_path = data_dir.join("olist_order_payments_dataset.csv");
    let payments = if payments_path.exists() {
        Some(load_payments(&payments_path)?)
    } else {
        info!("⚠️  No payments export found, revenue will use item totals");
        None
    };

    let table = build_daily_table(&orders, &items, payments.as_deref());
    if let (Some(first), Some(last)) = (table.first(), table.last()) {
        info!(
            "📊 Daily table: {} → {} ({} days, {} orders)",
            first.date,
            last.date,
            table.len(),
            table.iter().map(|r| r.orders_count as u64).sum::<u64>()
        );
    }

    let mut exporter = MetricsExporter::new(output_csv, db_path)?;
    exporter.write_table(&table).await?;

    info!("✅ KPI build complete");
    Ok(())
}
