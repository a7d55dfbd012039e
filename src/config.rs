use log::{debug, info};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::channel::connection::{parse_endpoint_override, telemetry_endpoint};
use crate::error::ConfigError;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 80;
const DEFAULT_PATH: &str = "/ws";
const DEFAULT_RECONNECT_INITIAL_MS: u64 = 500;
const DEFAULT_RECONNECT_MAX_MS: u64 = 30_000;

/// How the channel behaves after a failed or lost connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// `None` retries forever
    pub max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    /// Single connection attempt; the view freezes once the channel closes
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            initial_delay: Duration::from_millis(DEFAULT_RECONNECT_INITIAL_MS),
            max_delay: Duration::from_millis(DEFAULT_RECONNECT_MAX_MS),
            max_attempts: None,
        }
    }

    /// Delay before the retry following `failures` consecutive failures
    ///
    /// Doubles from `initial_delay` and never exceeds `max_delay`.
    pub fn delay_for(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures.saturating_sub(1));
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub fn exhausted(&self, failures: u32) -> bool {
        self.max_attempts.map_or(false, |max| failures >= max)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            ..Self::disabled()
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub endpoint: Url,
    pub reconnect: ReconnectPolicy,
}

impl DashboardConfig {
    /// Load configuration from `.env` and the process environment
    pub fn new() -> Result<Self, ConfigError> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = match lookup("SENSEBAND_URL") {
            Some(raw) => {
                info!("Using SENSEBAND_URL override");
                parse_endpoint_override(&raw)?
            }
            None => {
                let host = lookup("SENSEBAND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
                let port = parse_var(&lookup, "SENSEBAND_PORT")?.unwrap_or(DEFAULT_PORT);
                let path = lookup("SENSEBAND_PATH").unwrap_or_else(|| DEFAULT_PATH.to_string());
                telemetry_endpoint(&host, port, &path)?
            }
        };

        let enabled = parse_var(&lookup, "SENSEBAND_RECONNECT")?.unwrap_or(true);
        let initial_ms = parse_var(&lookup, "SENSEBAND_RECONNECT_INITIAL_MS")?
            .unwrap_or(DEFAULT_RECONNECT_INITIAL_MS);
        let max_ms =
            parse_var(&lookup, "SENSEBAND_RECONNECT_MAX_MS")?.unwrap_or(DEFAULT_RECONNECT_MAX_MS);
        let max_attempts: u32 = parse_var(&lookup, "SENSEBAND_RECONNECT_MAX_ATTEMPTS")?.unwrap_or(0);

        if max_ms < initial_ms {
            return Err(ConfigError::InvalidValue {
                key: "SENSEBAND_RECONNECT_MAX_MS",
                value: max_ms.to_string(),
                reason: format!("must not be below SENSEBAND_RECONNECT_INITIAL_MS ({})", initial_ms),
            });
        }

        let reconnect = ReconnectPolicy {
            enabled,
            initial_delay: Duration::from_millis(initial_ms),
            max_delay: Duration::from_millis(max_ms),
            max_attempts: (max_attempts > 0).then_some(max_attempts),
        };

        info!("Telemetry endpoint: {}", endpoint);
        debug!("Reconnect policy: {:?}", reconnect);

        Ok(DashboardConfig {
            endpoint,
            reconnect,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
