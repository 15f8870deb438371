//! Detector - Rolling-Baseline Anomaly Replay
//!
//! This module replays one historical day per invocation against its trailing
//! rolling-window baselines and pushes the resulting alert payload to a
//! notification sink.
//!
//! # Architecture
//!
//! ```text
//! daily_ops_metrics.csv → read_daily_table → compute_baselines
//!     ↓
//! eligible_rows (full baseline window + replay start date)
//!     ↓
//! ReplayState (persisted cursor, wraps past the end)
//!     ↓
//! AnomalyClassifier (drop/spike thresholds, fixed metric order)
//!     ↓
//! AlertPayload → NotificationSink (webhook POST)
//! ```

pub mod baseline;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod payload;
pub mod sink;
pub mod state;

pub use baseline::{compute_baselines, eligible_rows, BaselineRow, DEFAULT_ROLLING_DAYS};
pub use classifier::{
    pct_change, AnomalyClassifier, Direction, MetricKind, Severity, Signal, Thresholds,
};
pub use config::{ConfigurationError, DetectorConfig};
pub use engine::{DetectorEngine, DetectorError, EvaluationReport};
pub use payload::{AlertPayload, RunStatus};
pub use sink::{DeliveryError, NotificationSink, WebhookSink};
pub use state::{load_state, save_state, ReplayState};
