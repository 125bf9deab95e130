// =============================================================================
// Error types
// =============================================================================
//
// Only two things can fail: a caller-supplied parameter is invalid, or the
// kline provider could not deliver data. Missing fields, division by zero
// and warm-up gaps are NOT errors; they surface as `None` in the results.
// =============================================================================

use thiserror::Error;

/// A configuration parameter was rejected before any computation started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid configuration: `{param}` {reason}")]
pub struct ConfigError {
    /// Dotted path of the offending parameter, e.g. `macd.long`.
    pub param: String,
    pub reason: String,
}

impl ConfigError {
    pub fn new(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of [`crate::lookback::KlineResolver::resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// The kline provider failed. Calendar failures never end up here.
    #[error("kline data unavailable for {symbol}")]
    DataUnavailable {
        symbol: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ResolveError {
    pub(crate) fn data_unavailable(symbol: &str, err: anyhow::Error) -> Self {
        Self::DataUnavailable {
            symbol: symbol.to_string(),
            source: err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_parameter() {
        let err = ConfigError::new("rsi.periods", "must be a positive integer, got 0");
        assert_eq!(
            err.to_string(),
            "invalid configuration: `rsi.periods` must be a positive integer, got 0"
        );
    }

    #[test]
    fn data_unavailable_keeps_source() {
        let err = ResolveError::data_unavailable("600519", anyhow::anyhow!("HTTP 502"));
        assert_eq!(err.to_string(), "kline data unavailable for 600519");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("HTTP 502"));
    }
}
