// =============================================================================
// Eastmoney REST API Client: historical klines
// =============================================================================
//
// All three markets share the same `/api/qt/stock/kline/get` endpoint on
// different hosts; only the `secid` format differs:
//   A-share: `{1|0}.{code}`  (1 = Shanghai, 0 = Shenzhen / Beijing)
//   HK:      `116.{5-digit code}`
//   US:      symbol as given, e.g. `105.MSFT`
//
// The response carries one CSV line per bar in `data.klines`.
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::provider::{KlineProvider, KlineQuery};
use crate::runtime_config::{EndpointConfig, RuntimeConfig};
use crate::types::{AdjustType, Kline, KlinePeriod, Market};

/// Public token the web client sends with every kline request.
const UT_TOKEN: &str = "7eea3edcaed734bea9cbfc24409ed989";

/// Bounds sent when the query leaves a side open.
const EARLIEST: &str = "19700101";
const LATEST: &str = "20500101";

/// Number of CSV columns in a kline line.
const KLINE_FIELDS: usize = 11;

#[derive(Debug, Deserialize)]
struct KlineResponse {
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    klines: Vec<String>,
}

/// Eastmoney history kline client.
#[derive(Debug, Clone)]
pub struct EastmoneyClient {
    endpoints: EndpointConfig,
    client: reqwest::Client,
}

impl EastmoneyClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .context("failed to build reqwest client")?;

        debug!(timeout_secs = config.http_timeout_secs, "EastmoneyClient initialised");

        Ok(Self {
            endpoints: config.endpoints.clone(),
            client,
        })
    }

    // -------------------------------------------------------------------------
    // Klines
    // -------------------------------------------------------------------------

    /// GET /api/qt/stock/kline/get for one symbol.
    #[instrument(skip(self), name = "eastmoney::get_history_kline")]
    pub async fn get_history_kline(&self, query: &KlineQuery) -> Result<Vec<Kline>> {
        let url = self.endpoints.kline_url(query.market);

        let resp = self
            .client
            .get(url)
            .query(&query_params(query))
            .send()
            .await
            .context("GET kline request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Eastmoney kline endpoint returned {}: {}", status, body);
        }

        let body: KlineResponse = resp
            .json()
            .await
            .context("failed to parse kline response")?;

        let Some(data) = body.data else {
            warn!(symbol = %query.symbol, "kline response has no data, unknown symbol?");
            return Ok(Vec::new());
        };

        let code = display_code(query.market, &query.symbol, data.code.as_deref());
        // The A-share endpoint's name is not reported per bar.
        let name = match query.market {
            Market::A => None,
            Market::HK | Market::US => Some(data.name.unwrap_or_default()),
        };

        let mut klines = Vec::with_capacity(data.klines.len());
        for line in &data.klines {
            klines.push(parse_kline_line(line, &code, name.as_deref())?);
        }

        debug!(symbol = %query.symbol, count = klines.len(), "klines fetched");
        Ok(klines)
    }
}

#[async_trait]
impl KlineProvider for EastmoneyClient {
    async fn fetch(&self, query: &KlineQuery) -> Result<Vec<Kline>> {
        self.get_history_kline(query).await
    }
}

// -------------------------------------------------------------------------
// Request helpers
// -------------------------------------------------------------------------

fn query_params(query: &KlineQuery) -> Vec<(&'static str, String)> {
    let beg = query
        .start
        .map_or_else(|| EARLIEST.to_string(), |d| d.format("%Y%m%d").to_string());
    let end = query
        .end
        .map_or_else(|| LATEST.to_string(), |d| d.format("%Y%m%d").to_string());

    vec![
        ("fields1", "f1,f2,f3,f4,f5,f6".to_string()),
        ("fields2", "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61".to_string()),
        ("ut", UT_TOKEN.to_string()),
        ("klt", period_code(query.period).to_string()),
        ("fqt", adjust_code(query.adjust).to_string()),
        ("secid", secid(query.market, &query.symbol)),
        ("beg", beg),
        ("end", end),
        ("lmt", "1000000".to_string()),
    ]
}

fn period_code(period: KlinePeriod) -> &'static str {
    match period {
        KlinePeriod::Daily => "101",
        KlinePeriod::Weekly => "102",
        KlinePeriod::Monthly => "103",
    }
}

fn adjust_code(adjust: AdjustType) -> &'static str {
    match adjust {
        AdjustType::None => "0",
        AdjustType::Forward => "1",
        AdjustType::Backward => "2",
    }
}

/// Strip an exchange prefix (`sh` / `sz` / `bj` / `hk`) from a symbol.
fn strip_prefix<'a>(symbol: &'a str, prefixes: &[&str]) -> &'a str {
    prefixes
        .iter()
        .find_map(|p| symbol.strip_prefix(*p))
        .unwrap_or(symbol)
}

fn hk_code(symbol: &str) -> String {
    let bare = strip_prefix(symbol, &["hk", "HK"]);
    format!("{bare:0>5}")
}

/// Eastmoney security id.
pub(crate) fn secid(market: Market, symbol: &str) -> String {
    match market {
        Market::A => {
            let exchange = if symbol.starts_with("sh") {
                "1"
            } else if symbol.starts_with("sz") || symbol.starts_with("bj") {
                "0"
            } else if symbol.starts_with('6') {
                "1"
            } else {
                "0"
            };
            format!("{exchange}.{}", strip_prefix(symbol, &["sh", "sz", "bj"]))
        }
        Market::HK => format!("116.{}", hk_code(symbol)),
        Market::US => symbol.to_string(),
    }
}

/// Code reported on each kline.
fn display_code(market: Market, symbol: &str, reported: Option<&str>) -> String {
    match market {
        Market::A => strip_prefix(symbol, &["sh", "sz", "bj"]).to_string(),
        Market::HK => hk_code(symbol),
        Market::US => reported
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .or_else(|| symbol.split_once('.').map(|(_, ticker)| ticker.to_string()))
            .unwrap_or_else(|| symbol.to_string()),
    }
}

// -------------------------------------------------------------------------
// Response parsing
// -------------------------------------------------------------------------

/// Parse `date,open,close,high,low,volume,amount,amplitude,changePercent,change,turnoverRate`.
pub(crate) fn parse_kline_line(line: &str, code: &str, name: Option<&str>) -> Result<Kline> {
    let mut fields: Vec<&str> = line.split(',').collect();
    let raw_date = fields.first().copied().unwrap_or_default();
    let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid kline date '{raw_date}' in line '{line}'"))?;

    // Short lines leave the trailing statistics absent.
    fields.resize(KLINE_FIELDS, "");
    let num = |i: usize| parse_number(fields[i]);

    Ok(Kline {
        date,
        code: code.to_string(),
        name: name.map(str::to_string),
        open: num(1),
        close: num(2),
        high: num(3),
        low: num(4),
        volume: num(5),
        amount: num(6),
        amplitude: num(7),
        change_percent: num(8),
        change: num(9),
        turnover_rate: num(10),
    })
}

/// Empty strings, `-` and unparsable text are absent values.
fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
