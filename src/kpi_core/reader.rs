//! CSV readers for the raw marketplace exports and the daily KPI table
//!
//! Raw order rows with unparseable purchase timestamps are dropped here;
//! exhausting every row that way is fatal.

use super::daily::DailyMetricRow;
use super::records::{ItemRecord, OrderRecord, ParsedOrder, PaymentRecord};
use std::path::Path;

/// Required columns of the daily KPI table
pub const REQUIRED_TABLE_COLUMNS: [&str; 5] = [
    "date",
    "orders_count",
    "revenue",
    "canceled_orders",
    "avg_order_value",
];

#[derive(Debug)]
pub enum DataError {
    MissingFile(String),
    MissingColumns(Vec<String>),
    NoValidTimestamps,
    Io(std::io::Error),
    Csv(csv::Error),
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Io(err)
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err)
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::MissingFile(path) => write!(f, "Missing input file: {}", path),
            DataError::MissingColumns(cols) => {
                write!(f, "Daily metrics table missing columns: {}", cols.join(", "))
            }
            DataError::NoValidTimestamps => {
                write!(f, "No valid order purchase timestamps after parsing")
            }
            DataError::Io(e) => write!(f, "IO error: {}", e),
            DataError::Csv(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for DataError {}

/// Load order records, dropping rows whose purchase timestamp cannot be parsed
pub fn load_orders(path: impl AsRef<Path>) -> Result<Vec<ParsedOrder>, DataError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::MissingFile(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut orders = Vec::new();
    let mut dropped = 0usize;

    for result in reader.deserialize() {
        let record: OrderRecord = result?;
        match record.parse() {
            Some(order) => orders.push(order),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::warn!("⚠️  Dropped {} order rows with unparseable purchase timestamps", dropped);
    }
    if orders.is_empty() {
        return Err(DataError::NoValidTimestamps);
    }

    let min_ts = orders.iter().map(|o| o.purchase_time).min();
    let max_ts = orders.iter().map(|o| o.purchase_time).max();
    if let (Some(min_ts), Some(max_ts)) = (min_ts, max_ts) {
        log::info!("📖 Data coverage (orders): {} -> {}", min_ts, max_ts);
    }

    Ok(orders)
}

/// Load item records (price/freight rows joined to orders downstream)
pub fn load_items(path: impl AsRef<Path>) -> Result<Vec<ItemRecord>, DataError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::MissingFile(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut items = Vec::new();
    for result in reader.deserialize() {
        let record: ItemRecord = result?;
        items.push(record);
    }
    Ok(items)
}

/// Load payment records from the optional payments export
pub fn load_payments(path: impl AsRef<Path>) -> Result<Vec<PaymentRecord>, DataError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::MissingFile(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut payments = Vec::new();
    for result in reader.deserialize() {
        let record: PaymentRecord = result?;
        payments.push(record);
    }
    Ok(payments)
}

/// Read the daily KPI table back from its CSV export.
///
/// Validates the required column set up front and names every missing
/// column in the error. Rows come back sorted ascending by date.
pub fn read_daily_table(path: impl AsRef<Path>) -> Result<Vec<DailyMetricRow>, DataError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::MissingFile(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut missing: Vec<String> = REQUIRED_TABLE_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(DataError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: DailyMetricRow = result?;
        rows.push(row);
    }
    rows.sort_by_key(|r| r.date);

    Ok(rows)
}
