// =============================================================================
// Market data ports
// =============================================================================
//
// The resolver only talks to these two traits, so the HTTP adapters can be
// swapped for in-memory fakes in tests.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::{AdjustType, Kline, KlinePeriod, Market};

/// One historical kline request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineQuery {
    pub symbol: String,
    pub market: Market,
    pub period: KlinePeriod,
    pub adjust: AdjustType,
    /// Inclusive lower bound; `None` means from the earliest available bar.
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound; `None` means up to the latest bar.
    pub end: Option<NaiveDate>,
}

impl KlineQuery {
    /// Daily, backward-adjusted, unbounded query for `symbol`.
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            market: Market::detect(&symbol),
            symbol,
            period: KlinePeriod::default(),
            adjust: AdjustType::default(),
            start: None,
            end: None,
        }
    }
}

/// Source of historical klines.
///
/// Implementations return bars ascending by date with no duplicates.
#[async_trait]
pub trait KlineProvider: Send + Sync {
    async fn fetch(&self, query: &KlineQuery) -> anyhow::Result<Vec<Kline>>;
}

/// Ordered list of the trading days of one market.
#[async_trait]
pub trait TradingCalendar: Send + Sync {
    /// Market whose sessions this calendar lists.
    fn market(&self) -> Market;

    /// All known trading days, ascending.
    async fn trading_days(&self) -> anyhow::Result<Vec<NaiveDate>>;
}
