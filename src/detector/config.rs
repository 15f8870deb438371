use super::baseline::DEFAULT_ROLLING_DAYS;
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Replay start of the historical dataset; days before it are never evaluated
pub const DEFAULT_SIM_START_DATE: &str = "2017-01-12";

const DEFAULT_DATA_FILE: &str = "data/daily_ops_metrics.csv";
const DEFAULT_STATE_FILE: &str = "run_state.json";
const DEFAULT_WEBHOOK_URL: &str = "http://127.0.0.1:5678/webhook/ops-insight";
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 8;

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub data_file: PathBuf,
    pub state_file: PathBuf,
    pub rolling_days: u32,
    pub webhook_url: String,
    pub webhook_timeout: Duration,
    pub sim_start_date: NaiveDate,
}

#[derive(Debug)]
pub enum ConfigurationError {
    /// Every table row lacks a full baseline window or precedes the replay start
    NoEligibleDays,
    InvalidValue(String),
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::NoEligibleDays => {
                write!(f, "No rows eligible for evaluation: check ROLLING_DAYS and the replay start date against the data range")
            }
            ConfigurationError::InvalidValue(msg) => {
                write!(f, "Invalid configuration value: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

impl DetectorConfig {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let data_file = env::var("OPSFLOW_DATA_FILE")
            .unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string())
            .into();

        let state_file = env::var("OPSFLOW_STATE_FILE")
            .unwrap_or_else(|_| DEFAULT_STATE_FILE.to_string())
            .into();

        let rolling_days = env::var("OPSFLOW_ROLLING_DAYS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_ROLLING_DAYS);
        if rolling_days == 0 {
            return Err(ConfigurationError::InvalidValue(
                "OPSFLOW_ROLLING_DAYS must be at least 1".to_string(),
            ));
        }

        let webhook_url =
            env::var("OPSFLOW_WEBHOOK_URL").unwrap_or_else(|_| DEFAULT_WEBHOOK_URL.to_string());

        let webhook_timeout_secs = env::var("OPSFLOW_WEBHOOK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS);

        let sim_start_str = env::var("OPSFLOW_SIM_START_DATE")
            .unwrap_or_else(|_| DEFAULT_SIM_START_DATE.to_string());
        let sim_start_date = match NaiveDate::parse_from_str(&sim_start_str, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                log::warn!(
                    "Invalid OPSFLOW_SIM_START_DATE '{}', defaulting to {}",
                    sim_start_str,
                    DEFAULT_SIM_START_DATE
                );
                NaiveDate::parse_from_str(DEFAULT_SIM_START_DATE, "%Y-%m-%d")
                    .map_err(|e| ConfigurationError::InvalidValue(e.to_string()))?
            }
        };

        Ok(Self {
            data_file,
            state_file,
            rolling_days,
            webhook_url,
            webhook_timeout: Duration::from_secs(webhook_timeout_secs),
            sim_start_date,
        })
    }
}
