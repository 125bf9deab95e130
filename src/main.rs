// =============================================================================
// kline-indicators: Command-line entry point
// =============================================================================
//
// Resolves one kline request described by environment variables (a `.env`
// file is honoured) and prints the result as JSON on stdout.  Logs go to
// stderr so the output stays machine-readable.
//
//   KLINE_SYMBOL      symbol, e.g. 600519 / 00700 / 105.MSFT   (required)
//   KLINE_START       YYYY-MM-DD, first bar to return          (optional)
//   KLINE_END         YYYY-MM-DD, last bar to return           (optional)
//   KLINE_INDICATORS  JSON indicator selection                 (optional)
//   KLINE_PERIOD      daily | weekly | monthly                 (optional)
//   KLINE_ADJUST      "" | qfq | hfq                           (optional)
//   KLINE_CONFIG      runtime config path (default runtime_config.json)
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kline_indicators::market_data::{CalendarClient, EastmoneyClient};
use kline_indicators::{IndicatorOptions, KlineRequest, KlineResolver, Market, RuntimeConfig};

const DEFAULT_CONFIG_PATH: &str = "runtime_config.json";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::var("KLINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // ── 2. Request from env ──────────────────────────────────────────────
    let request = request_from_env()?;
    info!(
        symbol = %request.symbol,
        market = %request.market(),
        start = ?request.start,
        end = ?request.end,
        "Resolving klines"
    );

    // ── 3. Build providers and resolver ──────────────────────────────────
    let provider = Arc::new(EastmoneyClient::new(&config)?);
    let mut resolver = KlineResolver::new(provider).with_lookback(config.lookback.clone());

    if let Some(url) = &config.endpoints.calendar_url {
        // The published trading-day list covers the mainland exchanges.
        let calendar = CalendarClient::new(url.as_str(), Market::A, config.http_timeout())?;
        resolver = resolver.with_calendar(Arc::new(calendar));
    }

    // ── 4. Resolve & print ───────────────────────────────────────────────
    let rows = resolver.resolve(&request).await?;
    info!(bars = rows.len(), "Klines resolved");

    let json = serde_json::to_string_pretty(&rows).context("failed to serialise klines")?;
    println!("{json}");
    Ok(())
}

fn request_from_env() -> Result<KlineRequest> {
    let symbol = std::env::var("KLINE_SYMBOL").context("KLINE_SYMBOL is not set")?;
    let mut request = KlineRequest::new(symbol.trim());

    request.start = env_date("KLINE_START")?;
    request.end = env_date("KLINE_END")?;

    if let Ok(raw) = std::env::var("KLINE_INDICATORS") {
        request.indicators = serde_json::from_str::<IndicatorOptions>(&raw)
            .context("KLINE_INDICATORS is not a valid indicator selection")?;
    }
    if let Some(period) = env_enum("KLINE_PERIOD")? {
        request.period = period;
    }
    if let Some(adjust) = env_enum("KLINE_ADJUST")? {
        request.adjust = adjust;
    }
    Ok(request)
}

fn env_date(key: &str) -> Result<Option<NaiveDate>> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .with_context(|| format!("{key} must be YYYY-MM-DD, got '{raw}'")),
        _ => Ok(None),
    }
}

/// Parse a string-valued enum through its serde representation.
fn env_enum<T: DeserializeOwned>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
            .map(Some)
            .with_context(|| format!("invalid {key} '{raw}'")),
        Err(_) => Ok(None),
    }
}
