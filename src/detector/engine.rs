//! Detector Engine - Orchestration of one replay evaluation
//!
//! One `run_once()` call performs a complete cycle:
//!
//! ```text
//! daily_ops_metrics.csv
//!     ↓
//! read_daily_table()
//!     ↓
//! compute_baselines() → eligible_rows()
//!     ↓
//! ReplayState cursor (wraps past the end, never halts)
//!     ↓
//! AnomalyClassifier::classify()
//!     ↓
//! AlertPayload → NotificationSink::deliver()
//!     ↓
//! save_state(cursor + 1)
//! ```
//!
//! Delivery failures are logged and the cursor still advances; data and
//! configuration failures abort before the state file is touched.

use super::baseline::{compute_baselines, eligible_rows};
use super::classifier::{AnomalyClassifier, Thresholds};
use super::config::{ConfigurationError, DetectorConfig};
use super::payload::AlertPayload;
use super::sink::{DeliveryError, NotificationSink};
use super::state::{load_state, save_state, ReplayState};
use crate::kpi_core::reader::{read_daily_table, DataError};
use chrono::NaiveDateTime;
use log::{info, warn};

#[derive(Debug)]
pub enum DetectorError {
    Data(DataError),
    Configuration(ConfigurationError),
    /// Replay state could not be persisted after delivery
    State(String),
}

impl From<DataError> for DetectorError {
    fn from(err: DataError) -> Self {
        DetectorError::Data(err)
    }
}

impl From<ConfigurationError> for DetectorError {
    fn from(err: ConfigurationError) -> Self {
        DetectorError::Configuration(err)
    }
}

impl std::fmt::Display for DetectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorError::Data(e) => write!(f, "{}", e),
            DetectorError::Configuration(e) => write!(f, "{}", e),
            DetectorError::State(msg) => write!(f, "State persistence failed: {}", msg),
        }
    }
}

impl std::error::Error for DetectorError {}

/// Outcome of one evaluation cycle
#[derive(Debug)]
pub struct EvaluationReport {
    pub payload: AlertPayload,
    /// Present when the sink refused the payload; the run still succeeded
    pub delivery_error: Option<DeliveryError>,
}

/// Engine driving the replay evaluation
///
/// Holds the immutable run configuration and the injected sink; the only
/// mutable state is the on-disk cursor.
pub struct DetectorEngine {
    config: DetectorConfig,
    classifier: AnomalyClassifier,
    sink: Box<dyn NotificationSink>,

    /// Timestamp function (for testing with mock time)
    now_fn: Box<dyn Fn() -> NaiveDateTime + Send + Sync>,
}

impl DetectorEngine {
    /// Create an engine with the system clock
    pub fn new(config: DetectorConfig, sink: Box<dyn NotificationSink>) -> Self {
        Self::new_with_timestamp_fn(config, sink, Box::new(|| chrono::Local::now().naive_local()))
    }

    /// Create an engine with a custom timestamp function
    ///
    /// Used for testing with deterministic timestamps.
    pub fn new_with_timestamp_fn(
        config: DetectorConfig,
        sink: Box<dyn NotificationSink>,
        now_fn: Box<dyn Fn() -> NaiveDateTime + Send + Sync>,
    ) -> Self {
        let classifier = AnomalyClassifier::new(Thresholds::default(), config.rolling_days);
        Self {
            config,
            classifier,
            sink,
            now_fn,
        }
    }

    /// Run one evaluation cycle: select the cursor's day, classify it,
    /// deliver the payload, advance the cursor
    pub async fn run_once(&self) -> Result<EvaluationReport, DetectorError> {
        let rows = read_daily_table(&self.config.data_file)?;
        let baselines = compute_baselines(&rows, self.config.rolling_days);
        let eligible = eligible_rows(baselines, self.config.sim_start_date);
        if eligible.is_empty() {
            return Err(ConfigurationError::NoEligibleDays.into());
        }
        info!(
            "📊 {} table rows, {} eligible after {}-day baseline warmup",
            rows.len(),
            eligible.len(),
            self.config.rolling_days
        );

        let state = load_state(&self.config.state_file);
        let mut cursor = state.cursor;
        if cursor >= eligible.len() {
            info!("🔧 Cursor {} past the last eligible day, wrapping to 0", cursor);
            cursor = 0;
        }

        let row = &eligible[cursor];
        let signals = self.classifier.classify(row);
        let run_time = (self.now_fn)().format("%Y-%m-%dT%H:%M:%S").to_string();
        let payload = AlertPayload::from_evaluation(row, signals, cursor, run_time);

        info!(
            "📊 Evaluated {} (cursor {}): {} with {} signal(s)",
            payload.date,
            cursor,
            payload.status.as_str(),
            payload.signals_count
        );

        let delivery_error = match self.sink.deliver(&payload).await {
            Ok(()) => None,
            Err(e) => {
                warn!("⚠️  {}", e);
                Some(e)
            }
        };

        let next = ReplayState { cursor: cursor + 1 };
        save_state(&next, &self.config.state_file)
            .map_err(|e| DetectorError::State(e.to_string()))?;

        Ok(EvaluationReport {
            payload,
            delivery_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::classifier::{MetricKind, Severity};
    use crate::detector::payload::RunStatus;
    use crate::kpi_core::csv_writer::DailyTableCsvWriter;
    use crate::kpi_core::writer_backend::MetricsWriterBackend;
    use crate::kpi_core::DailyMetricRow;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::tempdir;

    struct RecordingSink {
        delivered: Arc<Mutex<Vec<AlertPayload>>>,
        fail: bool,
    }

    impl RecordingSink {
        fn new(fail: bool) -> (Self, Arc<Mutex<Vec<AlertPayload>>>) {
            let delivered = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    delivered: delivered.clone(),
                    fail,
                },
                delivered,
            )
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn deliver(&self, payload: &AlertPayload) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Sink("recording sink set to fail".to_string()));
            }
            self.delivered.lock().unwrap().push(payload.clone());
            Ok(())
        }

        fn sink_type(&self) -> &'static str {
            "recording"
        }
    }

    // Day tuples: (day-of-january, orders, revenue, canceled, aov)
    async fn write_fixture(path: &Path, days: &[(u32, u32, f64, u32, f64)]) {
        let rows: Vec<DailyMetricRow> = days
            .iter()
            .map(|&(day, orders, revenue, canceled, aov)| DailyMetricRow {
                date: NaiveDate::from_ymd_opt(2017, 1, day).unwrap(),
                orders_count: orders,
                revenue,
                canceled_orders: canceled,
                avg_order_value: aov,
                revenue_items: None,
                revenue_payments: None,
            })
            .collect();
        let mut writer = DailyTableCsvWriter::new(path.to_path_buf());
        writer.write_table(&rows).await.unwrap();
    }

    // Ten quiet days then one day with orders and revenue both down 20%.
    // Window 7 makes days 8-11 eligible (indexes 0-3).
    async fn write_default_fixture(path: &Path) {
        let mut days: Vec<(u32, u32, f64, u32, f64)> =
            (1..=10).map(|d| (d, 100, 1000.0, 2, 10.0)).collect();
        days.push((11, 80, 800.0, 2, 10.0));
        write_fixture(path, &days).await;
    }

    fn make_config(dir: &Path) -> DetectorConfig {
        DetectorConfig {
            data_file: dir.join("daily_ops_metrics.csv"),
            state_file: dir.join("run_state.json"),
            rolling_days: 7,
            webhook_url: "http://127.0.0.1:5678/webhook/ops-insight".to_string(),
            webhook_timeout: Duration::from_secs(1),
            sim_start_date: NaiveDate::from_ymd_opt(2017, 1, 1).unwrap(),
        }
    }

    fn make_engine(config: DetectorConfig, sink: Box<dyn NotificationSink>) -> DetectorEngine {
        let fixed = NaiveDate::from_ymd_opt(2017, 1, 12)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        DetectorEngine::new_with_timestamp_fn(config, sink, Box::new(move || fixed))
    }

    #[tokio::test]
    async fn test_quiet_day_normal_run() {
        let dir = tempdir().unwrap();
        let config = make_config(dir.path());
        write_default_fixture(&config.data_file).await;

        let (sink, delivered) = RecordingSink::new(false);
        let engine = make_engine(config.clone(), Box::new(sink));

        let report = engine.run_once().await.unwrap();
        assert_eq!(report.payload.status, RunStatus::Normal);
        assert_eq!(report.payload.signals_count, 0);
        assert_eq!(report.payload.date, "2017-01-08");
        assert_eq!(report.payload.run_time, "2017-01-12T08:00:00");
        assert!(report.delivery_error.is_none());

        // The delivered payload is the returned one
        let delivered = delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0], report.payload);

        assert_eq!(load_state(&config.state_file).cursor, 1);
    }

    #[tokio::test]
    async fn test_drop_day_flags_anomaly() {
        let dir = tempdir().unwrap();
        let config = make_config(dir.path());
        write_default_fixture(&config.data_file).await;
        save_state(&ReplayState { cursor: 3 }, &config.state_file).unwrap();

        let (sink, _delivered) = RecordingSink::new(false);
        let engine = make_engine(config.clone(), Box::new(sink));

        let report = engine.run_once().await.unwrap();
        let payload = &report.payload;
        assert_eq!(payload.status, RunStatus::AnomalyDetected);
        assert_eq!(payload.date, "2017-01-11");
        assert_eq!(payload.sim_cursor, 3);

        // Revenue (-20%, medium) is checked before orders (-20%, high)
        assert_eq!(payload.signals_count, 2);
        assert_eq!(payload.signals[0].metric, MetricKind::Revenue);
        assert_eq!(payload.signals[0].severity, Severity::Medium);
        assert_eq!(payload.signals[1].metric, MetricKind::Orders);
        assert_eq!(payload.signals[1].severity, Severity::High);
        assert_eq!(payload.signals[1].details, "Orders -20% vs 7-day avg");

        assert_eq!(load_state(&config.state_file).cursor, 4);
    }

    #[tokio::test]
    async fn test_cursor_past_end_wraps_to_zero() {
        let dir = tempdir().unwrap();
        let config = make_config(dir.path());
        write_default_fixture(&config.data_file).await;
        // Four eligible days; cursor 4 is one past the end
        save_state(&ReplayState { cursor: 4 }, &config.state_file).unwrap();

        let (sink, _delivered) = RecordingSink::new(false);
        let engine = make_engine(config.clone(), Box::new(sink));

        let report = engine.run_once().await.unwrap();
        assert_eq!(report.payload.sim_cursor, 0);
        assert_eq!(report.payload.date, "2017-01-08");
        assert_eq!(load_state(&config.state_file).cursor, 1);
    }

    #[tokio::test]
    async fn test_no_eligible_days_is_fatal() {
        let dir = tempdir().unwrap();
        let config = make_config(dir.path());
        // Three days can never complete a 7-day window
        write_fixture(
            &config.data_file,
            &[(1, 10, 100.0, 0, 10.0), (2, 10, 100.0, 0, 10.0), (3, 10, 100.0, 0, 10.0)],
        )
        .await;

        let (sink, _delivered) = RecordingSink::new(false);
        let engine = make_engine(config.clone(), Box::new(sink));

        let result = engine.run_once().await;
        assert!(matches!(
            result,
            Err(DetectorError::Configuration(ConfigurationError::NoEligibleDays))
        ));
        // Fatal errors leave no state file behind
        assert!(!config.state_file.exists());
    }

    #[tokio::test]
    async fn test_missing_table_is_fatal() {
        let dir = tempdir().unwrap();
        let config = make_config(dir.path());

        let (sink, _delivered) = RecordingSink::new(false);
        let engine = make_engine(config.clone(), Box::new(sink));

        let result = engine.run_once().await;
        assert!(matches!(
            result,
            Err(DetectorError::Data(DataError::MissingFile(_)))
        ));
    }

    #[tokio::test]
    async fn test_delivery_failure_still_advances_cursor() {
        let dir = tempdir().unwrap();
        let config = make_config(dir.path());
        write_default_fixture(&config.data_file).await;

        let (sink, delivered) = RecordingSink::new(true);
        let engine = make_engine(config.clone(), Box::new(sink));

        let report = engine.run_once().await.unwrap();
        assert!(report.delivery_error.is_some());
        assert!(delivered.lock().unwrap().is_empty());
        assert_eq!(load_state(&config.state_file).cursor, 1);
    }

    #[tokio::test]
    async fn test_unpersisted_run_replays_identically() {
        let dir = tempdir().unwrap();
        let config = make_config(dir.path());
        write_default_fixture(&config.data_file).await;

        let (sink, _d) = RecordingSink::new(false);
        let engine = make_engine(config.clone(), Box::new(sink));
        let first = engine.run_once().await.unwrap();

        // Roll the cursor back as if the save had never happened
        save_state(&ReplayState { cursor: 0 }, &config.state_file).unwrap();

        let (sink, _d) = RecordingSink::new(false);
        let engine = make_engine(config.clone(), Box::new(sink));
        let second = engine.run_once().await.unwrap();

        assert_eq!(first.payload, second.payload);
    }
}
