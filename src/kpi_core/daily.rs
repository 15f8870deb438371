//! Daily KPI aggregation with calendar-gap filling
//!
//! Collapses parsed order/item/payment records into one row per calendar
//! day. Days without any order activity inside the observed range are
//! materialized as zero rows, never omitted.

use super::records::{ItemRecord, ParsedOrder, PaymentRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// One day of operational KPIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricRow {
    pub date: NaiveDate,
    pub orders_count: u32,
    pub revenue: f64,
    pub canceled_orders: u32,
    pub avg_order_value: f64,
    #[serde(default)]
    pub revenue_items: Option<f64>,
    #[serde(default)]
    pub revenue_payments: Option<f64>,
}

impl DailyMetricRow {
    /// True when the payments audit columns are carried by this table
    pub fn has_audit_columns(&self) -> bool {
        self.revenue_items.is_some() || self.revenue_payments.is_some()
    }
}

#[derive(Default)]
struct DayTotals {
    orders_count: u32,
    canceled_orders: u32,
    revenue_items: f64,
    revenue_payments: f64,
}

/// Build the daily KPI table from parsed records.
///
/// Items and payments join to their parent order's purchase day (inner join
/// on order_id; rows without a surviving parent order are dropped). The
/// official revenue column is payments-based when a payments source is
/// supplied, items-based otherwise. The returned table is sorted ascending
/// by date and spans every calendar day between the first and last observed
/// purchase day.
pub fn build_daily_table(
    orders: &[ParsedOrder],
    items: &[ItemRecord],
    payments: Option<&[PaymentRecord]>,
) -> Vec<DailyMetricRow> {
    let mut totals: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    let mut order_days: HashMap<&str, NaiveDate> = HashMap::new();
    let mut seen_orders: HashSet<&str> = HashSet::new();

    for order in orders {
        let day = order.purchase_date();
        order_days.insert(order.order_id.as_str(), day);
        let entry = totals.entry(day).or_default();
        if seen_orders.insert(order.order_id.as_str()) {
            entry.orders_count += 1;
        }
        if order.is_canceled() {
            entry.canceled_orders += 1;
        }
    }

    for item in items {
        if let Some(day) = order_days.get(item.order_id.as_str()) {
            if let Some(entry) = totals.get_mut(day) {
                entry.revenue_items += item.revenue();
            }
        }
    }

    let has_payments = payments.is_some();
    if let Some(payments) = payments {
        for payment in payments {
            if let Some(day) = order_days.get(payment.order_id.as_str()) {
                if let Some(entry) = totals.get_mut(day) {
                    entry.revenue_payments += payment.value();
                }
            }
        }
    }

    let (Some(&first), Some(&last)) = (totals.keys().next(), totals.keys().next_back()) else {
        return Vec::new();
    };

    // Calendar spine: every day in [first, last], zero-filled where no orders landed
    let mut rows = Vec::new();
    let mut day = first;
    loop {
        let totals_for_day = totals.get(&day);
        let orders_count = totals_for_day.map(|t| t.orders_count).unwrap_or(0);
        let canceled_orders = totals_for_day.map(|t| t.canceled_orders).unwrap_or(0);
        let items_total = totals_for_day.map(|t| t.revenue_items).unwrap_or(0.0);
        let payments_total = totals_for_day.map(|t| t.revenue_payments).unwrap_or(0.0);

        let revenue = if has_payments { payments_total } else { items_total };
        let avg_order_value = if orders_count > 0 {
            round2(revenue / orders_count as f64)
        } else {
            0.0
        };

        rows.push(DailyMetricRow {
            date: day,
            orders_count,
            revenue,
            canceled_orders,
            avg_order_value,
            revenue_items: has_payments.then_some(items_total),
            revenue_payments: has_payments.then_some(payments_total),
        });

        if day == last {
            break;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    rows
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
