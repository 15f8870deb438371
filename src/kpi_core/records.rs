//! Raw record types read from the marketplace CSV exports

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// Order row as it appears in the orders export
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub order_status: String,
    pub order_purchase_timestamp: String,
    #[serde(default)]
    pub order_delivered_customer_date: Option<String>,
}

impl OrderRecord {
    /// Parse into a ParsedOrder, or None when the purchase timestamp is unusable
    pub fn parse(self) -> Option<ParsedOrder> {
        let purchase_time = parse_purchase_timestamp(&self.order_purchase_timestamp)?;
        Some(ParsedOrder {
            order_id: self.order_id,
            status: self.order_status,
            purchase_time,
        })
    }
}

/// Order with a successfully parsed purchase timestamp
#[derive(Debug, Clone)]
pub struct ParsedOrder {
    pub order_id: String,
    pub status: String,
    pub purchase_time: NaiveDateTime,
}

impl ParsedOrder {
    /// Calendar day the order was placed
    pub fn purchase_date(&self) -> NaiveDate {
        self.purchase_time.date()
    }

    /// Check if this order counts toward the canceled_orders KPI
    pub fn is_canceled(&self) -> bool {
        matches!(self.status.as_str(), "canceled" | "unavailable")
    }
}

/// Item row from the order-items export (one row per purchased unit)
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRecord {
    pub order_id: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub freight_value: Option<f64>,
}

impl ItemRecord {
    /// Item contribution to daily revenue (price + freight, missing values as 0)
    pub fn revenue(&self) -> f64 {
        self.price.unwrap_or(0.0) + self.freight_value.unwrap_or(0.0)
    }
}

/// Payment row from the optional payments export
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRecord {
    pub order_id: String,
    #[serde(default)]
    pub payment_value: Option<f64>,
}

impl PaymentRecord {
    pub fn value(&self) -> f64 {
        self.payment_value.unwrap_or(0.0)
    }
}

/// Parse a purchase timestamp, accepting datetime or bare-date forms
pub fn parse_purchase_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(ts);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
