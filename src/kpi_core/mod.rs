//! KPI Core - Daily Operational Metrics Builder
//!
//! This module turns the raw e-commerce marketplace exports (orders,
//! order items, optional payments) into the daily KPI table the anomaly
//! detector evaluates.
//!
//! # Architecture
//!
//! ```text
//! orders.csv / items.csv / payments.csv → reader (drop bad timestamps)
//!     ↓
//! build_daily_table (join on order_id, group by purchase day)
//!     ↓
//! calendar-gap fill (zero rows for inactive days, AOV recomputed)
//!     ↓
//! MetricsExporter → CSV interchange file + SQLite daily_metrics table
//! ```

pub mod csv_writer;
pub mod daily;
pub mod reader;
pub mod records;
pub mod sqlite_writer;
pub mod writer;
pub mod writer_backend;

pub use csv_writer::DailyTableCsvWriter;
pub use daily::{build_daily_table, DailyMetricRow};
pub use reader::{load_items, load_orders, load_payments, read_daily_table, DataError};
pub use records::{ItemRecord, OrderRecord, ParsedOrder, PaymentRecord};
pub use sqlite_writer::SqliteMetricsWriter;
pub use writer::MetricsExporter;
pub use writer_backend::{MetricsWriterBackend, MetricsWriterError};
