//! Alert payload assembly and summary rendering
//!
//! Field names and the summary line shapes are the wire contract consumed
//! by the downstream webhook workflow; do not reorder or rename.

use super::baseline::BaselineRow;
use super::classifier::Signal;
use serde::{Deserialize, Serialize};

/// Overall outcome of one evaluated day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Normal,
    AnomalyDetected,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Normal => "normal",
            RunStatus::AnomalyDetected => "anomaly_detected",
        }
    }
}

/// Document pushed to the notification sink, once per invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub run_time: String,
    pub sim_cursor: usize,
    pub date: String,
    pub status: RunStatus,
    pub signals_count: usize,
    pub signals: Vec<Signal>,
    pub summary: String,
}

impl AlertPayload {
    /// Assemble the payload for one evaluated day
    pub fn from_evaluation(
        row: &BaselineRow,
        signals: Vec<Signal>,
        cursor: usize,
        run_time: String,
    ) -> Self {
        let status = if signals.is_empty() {
            RunStatus::Normal
        } else {
            RunStatus::AnomalyDetected
        };
        let summary = render_summary(row, status, &signals);

        Self {
            run_time,
            sim_cursor: cursor,
            date: row.day.date.format("%Y-%m-%d").to_string(),
            status,
            signals_count: signals.len(),
            signals,
            summary,
        }
    }
}

/// Render the human-readable run summary
fn render_summary(row: &BaselineRow, status: RunStatus, signals: &[Signal]) -> String {
    let day = &row.day;
    let base_orders = row.base_orders_count.unwrap_or(0.0);
    let base_revenue = row.base_revenue.unwrap_or(0.0);
    let base_canceled = row.base_canceled_orders.unwrap_or(0.0);
    let base_aov = row.base_avg_order_value.unwrap_or(0.0);

    let mut lines = vec![
        format!("Date: {} | Status: {}", day.date.format("%Y-%m-%d"), status.as_str()),
        format!(
            "Orders: {} (avg {:.1}) | Revenue: {:.2} (avg {:.2})",
            day.orders_count, base_orders, day.revenue, base_revenue
        ),
        format!(
            "Canceled: {} (avg {:.1}) | AOV: {:.2} (avg {:.2})",
            day.canceled_orders, base_canceled, day.avg_order_value, base_aov
        ),
    ];

    if signals.is_empty() {
        lines.push("Signals: none".to_string());
    } else {
        lines.push("Signals:".to_string());
        for signal in signals {
            lines.push(format!(
                "- {} ({}, {}): {}",
                signal.metric.as_str(),
                signal.direction.as_str(),
                signal.severity.as_str(),
                signal.details
            ));
        }
    }

    lines.join("\n")
}
