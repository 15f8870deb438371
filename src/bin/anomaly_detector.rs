//! Anomaly Detector - One-Shot Replay Evaluation
//!
//! Evaluates the next historical day against its rolling baselines, POSTs the
//! alert payload to the configured webhook, prints the payload to stdout, and
//! advances the replay cursor. Run it on a schedule (or through the trigger
//! service) to walk the dataset one day per invocation.
//!
//! Usage:
//!   cargo run --release --bin anomaly_detector
//!
//! Environment variables:
//!   OPSFLOW_DATA_FILE            - Daily KPI table (default: data/daily_ops_metrics.csv)
//!   OPSFLOW_STATE_FILE           - Replay cursor file (default: run_state.json)
//!   OPSFLOW_ROLLING_DAYS         - Baseline window in days (default: 7)
//!   OPSFLOW_WEBHOOK_URL          - Alert webhook (default: http://127.0.0.1:5678/webhook/ops-insight)
//!   OPSFLOW_WEBHOOK_TIMEOUT_SECS - Delivery timeout (default: 8)
//!   OPSFLOW_SIM_START_DATE       - First replayable day (default: 2017-01-12)

use dotenv::dotenv;
use log::info;
use opsflow::detector::{DetectorConfig, DetectorEngine, WebhookSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = DetectorConfig::from_env()?;

    info!("🚀 Anomaly Detector");
    info!("   ├─ Data file: {}", config.data_file.display());
    info!("   ├─ State file: {}", config.state_file.display());
    info!("   ├─ Rolling window: {} days", config.rolling_days);
    info!("   ├─ Replay start: {}", config.sim_start_date);
    info!("   └─ Webhook: {}", config.webhook_url);

    let sink = WebhookSink::new(config.webhook_url.clone(), config.webhook_timeout)?;
    let engine = DetectorEngine::new(config, Box::new(sink));

    let report = engine.run_once().await?;
    println!("{}", serde_json::to_string_pretty(&report.payload)?);

    Ok(())
}
