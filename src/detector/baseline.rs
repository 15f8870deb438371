//! Trailing rolling-mean baselines over the daily KPI table

use crate::kpi_core::DailyMetricRow;
use chrono::NaiveDate;

/// Default trailing window, in days
pub const DEFAULT_ROLLING_DAYS: u32 = 7;

/// Daily row extended with trailing baselines for the four monitored metrics
///
/// A baseline is the mean over the `rolling_days` rows preceding this one;
/// the row's own day never contributes to its baseline. All four are None
/// when fewer than `rolling_days` prior rows exist.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineRow {
    pub day: DailyMetricRow,
    pub base_orders_count: Option<f64>,
    pub base_revenue: Option<f64>,
    pub base_canceled_orders: Option<f64>,
    pub base_avg_order_value: Option<f64>,
}

impl BaselineRow {
    /// True when every monitored metric has a defined baseline
    pub fn has_baselines(&self) -> bool {
        self.base_orders_count.is_some()
            && self.base_revenue.is_some()
            && self.base_canceled_orders.is_some()
            && self.base_avg_order_value.is_some()
    }
}

/// Attach trailing baselines to a date-sorted daily table.
///
/// The table must be contiguous by calendar day (the aggregator guarantees
/// this), so a row window equals a day window.
pub fn compute_baselines(rows: &[DailyMetricRow], rolling_days: u32) -> Vec<BaselineRow> {
    let window = rolling_days as usize;

    rows.iter()
        .enumerate()
        .map(|(i, day)| {
            if window == 0 || i < window {
                return BaselineRow {
                    day: day.clone(),
                    base_orders_count: None,
                    base_revenue: None,
                    base_canceled_orders: None,
                    base_avg_order_value: None,
                };
            }

            let trailing = &rows[i - window..i];
            BaselineRow {
                day: day.clone(),
                base_orders_count: Some(mean_of(trailing, |r| r.orders_count as f64)),
                base_revenue: Some(mean_of(trailing, |r| r.revenue)),
                base_canceled_orders: Some(mean_of(trailing, |r| r.canceled_orders as f64)),
                base_avg_order_value: Some(mean_of(trailing, |r| r.avg_order_value)),
            }
        })
        .collect()
}

/// Filter to the rows the replay loop may evaluate: defined baselines and
/// on/after the simulation start boundary.
pub fn eligible_rows(rows: Vec<BaselineRow>, sim_start: NaiveDate) -> Vec<BaselineRow> {
    rows.into_iter()
        .filter(|r| r.has_baselines() && r.day.date >= sim_start)
        .collect()
}

fn mean_of<F>(rows: &[DailyMetricRow], metric: F) -> f64
where
    F: Fn(&DailyMetricRow) -> f64,
{
    rows.iter().map(metric).sum::<f64>() / rows.len() as f64
}
