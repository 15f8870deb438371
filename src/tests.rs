#[cfg(test)]
mod tests {
    use {
        crate::detector::{
            compute_baselines, eligible_rows, AlertPayload, AnomalyClassifier, Direction,
            MetricKind, RunStatus, Severity,
        },
        crate::kpi_core::{build_daily_table, ItemRecord, ParsedOrder},
        chrono::NaiveDate,
    };

    fn make_order(id: &str, day: u32, status: &str) -> ParsedOrder {
        ParsedOrder {
            order_id: id.to_string(),
            status: status.to_string(),
            purchase_time: NaiveDate::from_ymd_opt(2017, 1, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    /// Full chain from raw orders to classified signals: eight quiet days of
    /// five orders, then one day collapsing to a single order
    #[test]
    fn test_order_drop_flows_through_to_signals() {
        let mut orders = Vec::new();
        let mut items = Vec::new();
        for day in 1..=8 {
            for k in 0..5 {
                let id = format!("o{}_{}", day, k);
                orders.push(make_order(&id, day, "delivered"));
                items.push(ItemRecord {
                    order_id: id,
                    price: Some(20.0),
                    freight_value: Some(0.0),
                });
            }
        }
        orders.push(make_order("o9_0", 9, "delivered"));
        items.push(ItemRecord {
            order_id: "o9_0".to_string(),
            price: Some(20.0),
            freight_value: Some(0.0),
        });

        let table = build_daily_table(&orders, &items, None);
        assert_eq!(table.len(), 9);

        let baselines = compute_baselines(&table, 7);
        let eligible =
            eligible_rows(baselines, NaiveDate::from_ymd_opt(2017, 1, 1).unwrap());
        assert_eq!(eligible.len(), 2);

        let classifier = AnomalyClassifier::with_defaults();

        // Day 8 matches its own baseline exactly
        assert!(classifier.classify(&eligible[0]).is_empty());

        // Day 9: revenue and orders both down 80%; AOV unchanged at 20.0
        let signals = classifier.classify(&eligible[1]);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].metric, MetricKind::Revenue);
        assert_eq!(signals[1].metric, MetricKind::Orders);
        assert!(signals
            .iter()
            .all(|s| s.severity == Severity::High && s.direction == Direction::Down));
    }

    /// Cancellation spike with flat volume only trips the cancellations rule
    #[test]
    fn test_cancellation_spike_flows_through_to_signal() {
        let mut orders = Vec::new();
        let mut items = Vec::new();
        for day in 1..=9 {
            let canceled = if day == 9 { 3 } else { 1 };
            for k in 0..5 {
                let id = format!("c{}_{}", day, k);
                let status = if k < canceled { "canceled" } else { "delivered" };
                orders.push(make_order(&id, day, status));
                items.push(ItemRecord {
                    order_id: id,
                    price: Some(10.0),
                    freight_value: Some(0.0),
                });
            }
        }

        let table = build_daily_table(&orders, &items, None);
        let baselines = compute_baselines(&table, 7);
        let eligible =
            eligible_rows(baselines, NaiveDate::from_ymd_opt(2017, 1, 1).unwrap());

        let signals = AnomalyClassifier::with_defaults().classify(&eligible[1]);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].metric, MetricKind::CanceledOrders);
        assert_eq!(signals[0].direction, Direction::Up);
        assert_eq!(signals[0].severity, Severity::High);
        assert_eq!(signals[0].details, "Cancellations +200% vs 7-day avg");
    }

    /// Payload assembly reflects the classified day
    #[test]
    fn test_payload_reflects_classification() {
        let mut orders = Vec::new();
        let mut items = Vec::new();
        for day in 1..=8 {
            for k in 0..5 {
                let id = format!("p{}_{}", day, k);
                orders.push(make_order(&id, day, "delivered"));
                items.push(ItemRecord {
                    order_id: id,
                    price: Some(20.0),
                    freight_value: Some(0.0),
                });
            }
        }
        orders.push(make_order("p9_0", 9, "delivered"));
        items.push(ItemRecord {
            order_id: "p9_0".to_string(),
            price: Some(20.0),
            freight_value: Some(0.0),
        });

        let table = build_daily_table(&orders, &items, None);
        let baselines = compute_baselines(&table, 7);
        let eligible =
            eligible_rows(baselines, NaiveDate::from_ymd_opt(2017, 1, 1).unwrap());

        let signals = AnomalyClassifier::with_defaults().classify(&eligible[1]);
        let payload = AlertPayload::from_evaluation(
            &eligible[1],
            signals,
            1,
            "2017-01-12T08:00:00".to_string(),
        );

        assert_eq!(payload.status, RunStatus::AnomalyDetected);
        assert_eq!(payload.date, "2017-01-09");
        assert_eq!(payload.signals_count, 2);
        assert!(payload.summary.contains("Orders: 1 (avg 5.0)"));
        assert!(payload.summary.contains("Revenue: 20.00 (avg 100.00)"));
    }
}
