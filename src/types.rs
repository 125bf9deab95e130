// =============================================================================
// Shared types used across the kline / indicator pipeline
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Minimal per-bar price record consumed by the OHLC-based calculators.
///
/// Every field is nullable: quote providers routinely emit `-` or empty
/// strings for suspended sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl Ohlcv {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }
}

/// One historical trading period for a symbol, as returned by a kline
/// provider. Series are ordered ascending by `date` with no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kline {
    pub date: NaiveDate,
    pub code: String,
    /// Only HK / US endpoints report a display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
    pub amount: Option<f64>,
    /// Intraday range as a percentage of the previous close.
    pub amplitude: Option<f64>,
    pub change_percent: Option<f64>,
    pub change: Option<f64>,
    pub turnover_rate: Option<f64>,
}

impl Kline {
    /// Build a kline that only carries price/volume data. The derived
    /// statistics (amount, amplitude, ...) are left absent.
    pub fn from_ohlcv(date: NaiveDate, code: impl Into<String>, bar: Ohlcv) -> Self {
        Self {
            date,
            code: code.into(),
            name: None,
            open: bar.open,
            close: bar.close,
            high: bar.high,
            low: bar.low,
            volume: bar.volume,
            amount: None,
            amplitude: None,
            change_percent: None,
            change: None,
            turnover_rate: None,
        }
    }

    pub fn ohlcv(&self) -> Ohlcv {
        Ohlcv {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

/// Market a symbol trades on. Decides the provider endpoint and the
/// calendar-days-per-trading-day ratio used when back-dating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// Shanghai / Shenzhen / Beijing A-shares, funds and indices.
    A,
    HK,
    US,
}

impl Market {
    /// Infer the market from the symbol shape:
    /// - `105.MSFT` (three digit exchange prefix, dot, ticker) => US
    /// - `00700` (five digits) => HK
    /// - anything else (`600519`, `sz000858`, ...) => A
    pub fn detect(symbol: &str) -> Self {
        if let Some((prefix, ticker)) = symbol.split_once('.') {
            if prefix.len() == 3
                && prefix.bytes().all(|b| b.is_ascii_digit())
                && !ticker.is_empty()
                && ticker.bytes().all(|b| b.is_ascii_alphabetic())
            {
                return Self::US;
            }
        }
        if symbol.len() == 5 && symbol.bytes().all(|b| b.is_ascii_digit()) {
            return Self::HK;
        }
        Self::A
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::HK => write!(f, "HK"),
            Self::US => write!(f, "US"),
        }
    }
}

/// Bar duration of a historical kline request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KlinePeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for KlinePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// Price adjustment convention for historical bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustType {
    /// Raw exchange prices.
    #[serde(rename = "")]
    None,
    /// Forward-adjusted (qfq).
    #[serde(rename = "qfq")]
    Forward,
    /// Backward-adjusted (hfq).
    #[default]
    #[serde(rename = "hfq")]
    Backward,
}

impl std::fmt::Display for AdjustType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Forward => write!(f, "qfq"),
            Self::Backward => write!(f, "hfq"),
        }
    }
}
