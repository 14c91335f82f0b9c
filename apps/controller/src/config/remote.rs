//! Client settings derived from the environment.
//!
//! Environment variables (all optional):
//! - `SIM_API_BASE_URL` — engine base URL, default `http://localhost:8000/api`
//! - `SIM_REQUEST_TIMEOUT_MS` — per-request timeout, default 5000
//! - `SIM_TICK_INTERVAL_MS` — auto-run cadence, default 300

use std::env;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(300);

/// Everything needed to talk to the remote engine and drive auto-run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    /// Upper bound on any single request, so a hung call cannot stall
    /// scheduler disarming indefinitely.
    pub request_timeout: Duration,
    /// Cadence of automated round advances.
    pub tick_interval: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl RemoteConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            base_url: base_url(),
            request_timeout: duration_var("SIM_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT)?,
            tick_interval: duration_var("SIM_TICK_INTERVAL_MS", DEFAULT_TICK_INTERVAL)?,
        })
    }
}

fn base_url() -> String {
    let url = env::var("SIM_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    url.trim_end_matches('/').to_string()
}

fn duration_var(name: &'static str, default: Duration) -> Result<Duration, AppError> {
    match env::var(name) {
        Ok(raw) => parse_millis(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_millis(name: &'static str, raw: &str) -> Result<Duration, AppError> {
    let millis: u64 = raw
        .parse()
        .map_err(|_| AppError::config(format!("{name} must be an integer, got {raw:?}")))?;
    if millis == 0 {
        return Err(AppError::config(format!("{name} must be positive")));
    }
    Ok(Duration::from_millis(millis))
}
