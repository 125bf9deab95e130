// =============================================================================
// Adaptive lookback resolver
// =============================================================================
//
// Indicators need history before the first bar a caller asks for: an MA20 on
// the requested start date needs the 19 sessions before it.  The resolver
//
//   1. sizes that history from the selected indicators (`required_bars`),
//   2. moves the fetch start back by that many trading days, using the
//      trading calendar when one covers the market and a calendar-day
//      heuristic otherwise,
//   3. fetches, re-fetches without a lower bound if history was still short,
//   4. computes the indicators over everything and trims back to the
//      requested window.
// =============================================================================

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{debug, info, instrument, warn};

use crate::error::ResolveError;
use crate::indicators::aggregate::{add_indicators, KlineWithIndicators};
use crate::indicators::config::{IndicatorOptions, IndicatorSet};
use crate::indicators::ma::MaType;
use crate::market_data::{KlineProvider, KlineQuery, TradingCalendar};
use crate::runtime_config::LookbackParams;
use crate::types::{AdjustType, Kline, KlinePeriod, Market};

// =============================================================================
// Required bars
// =============================================================================

/// Bars of history the active indicators need, with the default buffers.
pub fn required_bars(set: &IndicatorSet) -> usize {
    required_bars_with(set, &LookbackParams::default())
}

/// Bars of history the active indicators need.
///
/// The largest single-indicator requirement is scaled by `ema_buffer` when an
/// EMA-based indicator is active (EMAs converge slowly from their seed) and by
/// `base_buffer` otherwise, then rounded up.  No active indicator needs 0.
pub fn required_bars_with(set: &IndicatorSet, params: &LookbackParams) -> usize {
    let base = base_requirement(set);
    if base == 0 {
        return 0;
    }
    let buffer = if uses_ema(set) {
        params.ema_buffer
    } else {
        params.base_buffer
    };
    (base as f64 * buffer).ceil() as usize
}

fn base_requirement(set: &IndicatorSet) -> usize {
    let max_of = |periods: &[usize]| periods.iter().copied().max().unwrap_or(0);

    [
        set.ma.as_ref().map(|p| max_of(&p.periods)),
        set.macd.as_ref().map(|p| p.long.saturating_mul(3).saturating_add(p.signal)),
        set.boll.as_ref().map(|p| p.period),
        set.kdj.as_ref().map(|p| p.period),
        set.rsi.as_ref().map(|p| max_of(&p.periods).saturating_add(1)),
        set.wr.as_ref().map(|p| max_of(&p.periods)),
        set.bias.as_ref().map(|p| max_of(&p.periods)),
        set.cci.as_ref().map(|p| p.period),
        set.atr.as_ref().map(|p| p.period),
        set.roc.as_ref().map(|p| p.period.saturating_add(p.signal_period.unwrap_or(0))),
        set.dmi.as_ref().map(|p| p.period.saturating_add(p.adx_period().saturating_mul(2))),
        set.kc.as_ref().map(|p| p.ema_period.max(p.atr_period)),
        set.sar.as_ref().map(|_| 2),
        set.obv.as_ref().map(|p| p.ma_period.unwrap_or(1)),
    ]
    .into_iter()
    .flatten()
    .max()
    .unwrap_or(0)
}

fn uses_ema(set: &IndicatorSet) -> bool {
    set.ma.as_ref().is_some_and(|p| p.ma_type == MaType::Ema)
        || set.macd.is_some()
        || set.kc.is_some()
        || set.dmi.is_some()
}

// =============================================================================
// Back-dating
// =============================================================================

/// Step back `required` trading days from the first calendar day on or after
/// `start` (the last calendar day if `start` is beyond it).  `None` for an
/// empty calendar.
pub fn calendar_start(days: &[NaiveDate], start: NaiveDate, required: usize) -> Option<NaiveDate> {
    let last = days.len().checked_sub(1)?;
    let idx = days.partition_point(|d| *d < start).min(last);
    Some(days[idx.saturating_sub(required)])
}

/// Approximate `required` trading days as `ceil(required * ratio)` calendar
/// days before `start`.  `None` when that reaches past the earliest
/// representable date, i.e. fetch without a lower bound.
pub fn heuristic_start(start: NaiveDate, required: usize, ratio: f64) -> Option<NaiveDate> {
    let days = (required as f64 * ratio).ceil() as i64;
    Duration::try_days(days).and_then(|back| start.checked_sub_signed(back))
}

// =============================================================================
// Request / resolver
// =============================================================================

/// Klines for one symbol over an optional window, with indicators attached.
#[derive(Debug, Clone, PartialEq)]
pub struct KlineRequest {
    pub symbol: String,
    /// Overrides market detection from the symbol shape.
    pub market: Option<Market>,
    pub period: KlinePeriod,
    pub adjust: AdjustType,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub indicators: IndicatorOptions,
}

impl KlineRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            market: None,
            period: KlinePeriod::default(),
            adjust: AdjustType::default(),
            start: None,
            end: None,
            indicators: IndicatorOptions::default(),
        }
    }

    pub fn market(&self) -> Market {
        self.market.unwrap_or_else(|| Market::detect(&self.symbol))
    }

    fn in_window(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

pub struct KlineResolver {
    provider: Arc<dyn KlineProvider>,
    calendar: Option<Arc<dyn TradingCalendar>>,
    lookback: LookbackParams,
}

impl KlineResolver {
    pub fn new(provider: Arc<dyn KlineProvider>) -> Self {
        Self {
            provider,
            calendar: None,
            lookback: LookbackParams::default(),
        }
    }

    pub fn with_calendar(mut self, calendar: Arc<dyn TradingCalendar>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn with_lookback(mut self, lookback: LookbackParams) -> Self {
        self.lookback = lookback;
        self
    }

    /// Fetch the requested klines with indicators attached.
    ///
    /// Indicator options are validated before anything is fetched.  When a
    /// start date is given only bars in `[start, end]` are returned, but every
    /// indicator value on them is computed from the full fetched history.
    #[instrument(skip(self, request), name = "resolver::resolve", fields(symbol = %request.symbol))]
    pub async fn resolve(&self, request: &KlineRequest) -> Result<Vec<KlineWithIndicators>, ResolveError> {
        let set = request.indicators.validate()?;
        let market = request.market();
        let required = required_bars_with(&set, &self.lookback);

        let fetch_start = match request.start {
            Some(start) if required > 0 => self.fetch_start(market, start, required).await,
            other => other,
        };
        debug!(%market, required, ?fetch_start, "lookback computed");

        let mut query = KlineQuery {
            symbol: request.symbol.clone(),
            market,
            period: request.period,
            adjust: request.adjust,
            start: fetch_start,
            end: request.end,
        };
        let mut klines = self.fetch(&query).await?;

        if query.start.is_some() && klines.len() < required {
            info!(
                fetched = klines.len(),
                required,
                "insufficient history before start, re-fetching without lower bound"
            );
            query.start = None;
            klines = self.fetch(&query).await?;
        }

        let mut rows = add_indicators(&klines, &set);
        if request.start.is_some() {
            rows.retain(|row| request.in_window(row.kline.date));
        }

        debug!(fetched = klines.len(), returned = rows.len(), "klines resolved");
        Ok(rows)
    }

    async fn fetch(&self, query: &KlineQuery) -> Result<Vec<Kline>, ResolveError> {
        self.provider
            .fetch(query)
            .await
            .map_err(|e| ResolveError::data_unavailable(&query.symbol, e))
    }

    /// First date to fetch so that `required` bars precede `start`; `None`
    /// means the whole history.
    async fn fetch_start(&self, market: Market, start: NaiveDate, required: usize) -> Option<NaiveDate> {
        if let Some(calendar) = self.calendar.as_ref().filter(|c| c.market() == market) {
            match calendar.trading_days().await {
                Ok(days) => match calendar_start(&days, start, required) {
                    Some(date) => return Some(date),
                    None => warn!(%market, "trading calendar is empty, using calendar-day heuristic"),
                },
                Err(e) => warn!(%market, error = %e, "trading calendar unavailable, using calendar-day heuristic"),
            }
        }
        heuristic_start(start, required, self.lookback.ratio(market))
    }
}
