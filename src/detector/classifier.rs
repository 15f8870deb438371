//! Threshold-based anomaly classification for daily KPI rows
//!
//! Each monitored metric is compared to its trailing baseline as a
//! percentage change and classified against fixed drop/spike thresholds.
//! Evaluation order is fixed (revenue, orders, AOV, cancellations) and
//! determines the emitted signal order.

use super::baseline::BaselineRow;
use serde::{Deserialize, Serialize};

/// Default trigger thresholds, as fractions of baseline
mod alert_thresholds {
    pub const REVENUE_DROP_MEDIUM: f64 = 0.15;
    pub const REVENUE_DROP_HIGH: f64 = 0.25;

    pub const ORDERS_DROP_MEDIUM: f64 = 0.12;
    pub const ORDERS_DROP_HIGH: f64 = 0.20;

    pub const AOV_DROP_MEDIUM: f64 = 0.15;
    pub const AOV_DROP_HIGH: f64 = 0.25;

    pub const CANCEL_SPIKE_MEDIUM: f64 = 0.60;
    pub const CANCEL_SPIKE_HIGH: f64 = 1.20;
}

/// Monitored KPI, in wire naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Revenue,
    Orders,
    AvgOrderValue,
    CanceledOrders,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Revenue => "revenue",
            MetricKind::Orders => "orders",
            MetricKind::AvgOrderValue => "avg_order_value",
            MetricKind::CanceledOrders => "canceled_orders",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
        }
    }
}

/// Two-level severity; High means the high threshold was also met
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// One triggered metric for one evaluated day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub metric: MetricKind,
    pub direction: Direction,
    pub severity: Severity,
    pub details: String,
}

/// Trigger thresholds, as fractions of baseline
#[derive(Debug, Clone)]
pub struct Thresholds {
    pub revenue_drop_medium: f64,
    pub revenue_drop_high: f64,
    pub orders_drop_medium: f64,
    pub orders_drop_high: f64,
    pub aov_drop_medium: f64,
    pub aov_drop_high: f64,
    pub cancel_spike_medium: f64,
    pub cancel_spike_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        use alert_thresholds::*;
        Self {
            revenue_drop_medium: REVENUE_DROP_MEDIUM,
            revenue_drop_high: REVENUE_DROP_HIGH,
            orders_drop_medium: ORDERS_DROP_MEDIUM,
            orders_drop_high: ORDERS_DROP_HIGH,
            aov_drop_medium: AOV_DROP_MEDIUM,
            aov_drop_high: AOV_DROP_HIGH,
            cancel_spike_medium: CANCEL_SPIKE_MEDIUM,
            cancel_spike_high: CANCEL_SPIKE_HIGH,
        }
    }
}

/// Percentage change vs baseline.
///
/// A zero or undefined baseline yields 0 rather than a division failure,
/// so sparse-history days never produce a signal.
pub fn pct_change(today: f64, baseline: Option<f64>) -> f64 {
    match baseline {
        Some(base) if base != 0.0 && base.is_finite() => (today - base) / base,
        _ => 0.0,
    }
}

/// Classifier comparing one day's metrics to their baselines
pub struct AnomalyClassifier {
    thresholds: Thresholds,
    rolling_days: u32,
}

impl AnomalyClassifier {
    pub fn new(thresholds: Thresholds, rolling_days: u32) -> Self {
        Self {
            thresholds,
            rolling_days,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Thresholds::default(), super::baseline::DEFAULT_ROLLING_DAYS)
    }

    /// Classify one day, returning a signal per triggered metric in fixed
    /// evaluation order
    pub fn classify(&self, row: &BaselineRow) -> Vec<Signal> {
        let th = &self.thresholds;
        let mut signals = Vec::new();

        // Revenue drop
        let revenue_change = pct_change(row.day.revenue, row.base_revenue);
        if revenue_change <= -th.revenue_drop_medium {
            let severity = if revenue_change.abs() >= th.revenue_drop_high {
                Severity::High
            } else {
                Severity::Medium
            };
            signals.push(Signal {
                metric: MetricKind::Revenue,
                direction: Direction::Down,
                severity,
                details: format!(
                    "Revenue {}% vs {}-day avg",
                    rounded_percent(revenue_change),
                    self.rolling_days
                ),
            });
        }

        // Orders drop
        let orders_change = pct_change(row.day.orders_count as f64, row.base_orders_count);
        if orders_change <= -th.orders_drop_medium {
            let severity = if orders_change.abs() >= th.orders_drop_high {
                Severity::High
            } else {
                Severity::Medium
            };
            signals.push(Signal {
                metric: MetricKind::Orders,
                direction: Direction::Down,
                severity,
                details: format!(
                    "Orders {}% vs {}-day avg",
                    rounded_percent(orders_change),
                    self.rolling_days
                ),
            });
        }

        // AOV drop
        let aov_change = pct_change(row.day.avg_order_value, row.base_avg_order_value);
        if aov_change <= -th.aov_drop_medium {
            let severity = if aov_change.abs() >= th.aov_drop_high {
                Severity::High
            } else {
                Severity::Medium
            };
            signals.push(Signal {
                metric: MetricKind::AvgOrderValue,
                direction: Direction::Down,
                severity,
                details: format!(
                    "AOV {}% vs {}-day avg",
                    rounded_percent(aov_change),
                    self.rolling_days
                ),
            });
        }

        // Cancellation spike
        let cancel_change = pct_change(row.day.canceled_orders as f64, row.base_canceled_orders);
        if cancel_change >= th.cancel_spike_medium {
            let severity = if cancel_change >= th.cancel_spike_high {
                Severity::High
            } else {
                Severity::Medium
            };
            signals.push(Signal {
                metric: MetricKind::CanceledOrders,
                direction: Direction::Up,
                severity,
                details: format!(
                    "Cancellations +{}% vs {}-day avg",
                    rounded_percent(cancel_change),
                    self.rolling_days
                ),
            });
        }

        signals
    }
}

fn rounded_percent(change: f64) -> i64 {
    (change * 100.0).round() as i64
}
