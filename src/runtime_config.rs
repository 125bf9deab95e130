// =============================================================================
// Runtime Configuration: endpoints, timeouts and lookback tuning
// =============================================================================
//
// Every tunable of the kline service lives here: where quotes and the trading
// calendar are fetched from, how long an HTTP call may take, and how far the
// resolver reaches back before the requested start date.
//
// All fields carry `#[serde(default)]` so that adding new fields never breaks
// loading an older config file.  `load` validates before returning, so a
// config that parses but is unusable is rejected as a whole.
//
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::types::Market;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_a_kline_url() -> String {
    "https://push2his.eastmoney.com/api/qt/stock/kline/get".to_string()
}

fn default_hk_kline_url() -> String {
    "https://33.push2his.eastmoney.com/api/qt/stock/kline/get".to_string()
}

fn default_us_kline_url() -> String {
    "https://63.push2his.eastmoney.com/api/qt/stock/kline/get".to_string()
}

fn default_ratio_a() -> f64 {
    1.5
}

fn default_ratio_hk() -> f64 {
    1.46
}

fn default_ratio_us() -> f64 {
    1.45
}

fn default_ema_buffer() -> f64 {
    1.5
}

fn default_base_buffer() -> f64 {
    1.2
}

// =============================================================================
// Endpoints
// =============================================================================

/// Remote data sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// History kline endpoint for A-shares.
    #[serde(default = "default_a_kline_url")]
    pub a_kline_url: String,

    /// History kline endpoint for Hong Kong listings.
    #[serde(default = "default_hk_kline_url")]
    pub hk_kline_url: String,

    /// History kline endpoint for US listings.
    #[serde(default = "default_us_kline_url")]
    pub us_kline_url: String,

    /// Plain-text list of A-share trading days (`YYYY-MM-DD,YYYY-MM-DD,...`).
    /// Without it the resolver back-dates with the calendar-day heuristic.
    #[serde(default)]
    pub calendar_url: Option<String>,
}

impl EndpointConfig {
    pub fn kline_url(&self, market: Market) -> &str {
        match market {
            Market::A => &self.a_kline_url,
            Market::HK => &self.hk_kline_url,
            Market::US => &self.us_kline_url,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            a_kline_url: default_a_kline_url(),
            hk_kline_url: default_hk_kline_url(),
            us_kline_url: default_us_kline_url(),
            calendar_url: None,
        }
    }
}

// =============================================================================
// Lookback tuning
// =============================================================================

/// How far the resolver reaches back before the requested start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookbackParams {
    /// Calendar days per trading day, A-shares.
    #[serde(default = "default_ratio_a")]
    pub ratio_a: f64,

    /// Calendar days per trading day, Hong Kong.
    #[serde(default = "default_ratio_hk")]
    pub ratio_hk: f64,

    /// Calendar days per trading day, US.
    #[serde(default = "default_ratio_us")]
    pub ratio_us: f64,

    /// Multiplier on the required bars when an EMA-based indicator is active.
    #[serde(default = "default_ema_buffer")]
    pub ema_buffer: f64,

    /// Multiplier on the required bars otherwise.
    #[serde(default = "default_base_buffer")]
    pub base_buffer: f64,
}

impl LookbackParams {
    pub fn ratio(&self, market: Market) -> f64 {
        match market {
            Market::A => self.ratio_a,
            Market::HK => self.ratio_hk,
            Market::US => self.ratio_us,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let fields = [
            ("lookback.ratio_a", self.ratio_a),
            ("lookback.ratio_hk", self.ratio_hk),
            ("lookback.ratio_us", self.ratio_us),
            ("lookback.ema_buffer", self.ema_buffer),
            ("lookback.base_buffer", self.base_buffer),
        ];
        for (param, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::new(
                    param,
                    format!("must be a finite positive number, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

impl Default for LookbackParams {
    fn default() -> Self {
        Self {
            ratio_a: default_ratio_a(),
            ratio_hk: default_ratio_hk(),
            ratio_us: default_ratio_us(),
            ema_buffer: default_ema_buffer(),
            base_buffer: default_base_buffer(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub endpoints: EndpointConfig,

    #[serde(default)]
    pub lookback: LookbackParams,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout_secs(),
            endpoints: EndpointConfig::default(),
            lookback: LookbackParams::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Reject values that would make every request fail or every lookback
    /// meaningless.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::new("http_timeout_secs", "must be at least 1 second"));
        }
        self.lookback.validate()
    }

    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid runtime config in {}", path.display()))?;

        info!(
            path = %path.display(),
            timeout_secs = config.http_timeout_secs,
            calendar = config.endpoints.calendar_url.is_some(),
            "runtime config loaded"
        );

        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.http_timeout_secs, 10);
        assert!(cfg.endpoints.calendar_url.is_none());
        assert!(cfg.endpoints.kline_url(Market::HK).starts_with("https://33."));
        assert!(cfg.endpoints.kline_url(Market::US).starts_with("https://63."));
        assert!((cfg.lookback.ratio(Market::A) - 1.5).abs() < f64::EPSILON);
        assert!((cfg.lookback.ratio(Market::HK) - 1.46).abs() < f64::EPSILON);
        assert!((cfg.lookback.ratio(Market::US) - 1.45).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RuntimeConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "http_timeout_secs": 3,
            "endpoints": { "calendar_url": "http://localhost/calendar.txt" },
            "lookback": { "ratio_hk": 1.5 }
        }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.http_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.endpoints.calendar_url.as_deref(), Some("http://localhost/calendar.txt"));
        assert_eq!(cfg.endpoints.a_kline_url, default_a_kline_url());
        assert!((cfg.lookback.ratio_hk - 1.5).abs() < f64::EPSILON);
        assert!((cfg.lookback.ema_buffer - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let cfg = RuntimeConfig {
            http_timeout_secs: 0,
            ..RuntimeConfig::default()
        };
        assert_eq!(cfg.validate().unwrap_err().param, "http_timeout_secs");
    }

    #[test]
    fn validate_rejects_bad_ratio() {
        let mut cfg = RuntimeConfig::default();
        cfg.lookback.ratio_us = 0.0;
        assert_eq!(cfg.validate().unwrap_err().param, "lookback.ratio_us");
        cfg.lookback.ratio_us = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    fn temp_config(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("kline-indicators-{name}-{}.json", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_reads_file() {
        let path = temp_config("load", r#"{ "endpoints": { "calendar_url": "http://localhost/days" } }"#);
        let loaded = RuntimeConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.endpoints.calendar_url.as_deref(), Some("http://localhost/days"));
        assert_eq!(loaded.lookback, LookbackParams::default());
    }

    #[test]
    fn load_rejects_invalid_values() {
        let path = temp_config("invalid", r#"{ "http_timeout_secs": 0 }"#);
        let result = RuntimeConfig::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(RuntimeConfig::load("/definitely/not/here/config.json").is_err());
    }
}
