// =============================================================================
// kline-indicators: historical klines with technical indicators attached
// =============================================================================
//
// `indicators`   pure per-bar calculators, selection config and aggregation
// `market_data`  provider / calendar ports and their HTTP adapters
// `lookback`     resolver that back-dates fetches so indicators are warm on
//                the first requested bar
// =============================================================================

pub mod error;
pub mod indicators;
pub mod lookback;
pub mod market_data;
pub mod runtime_config;
pub mod types;

pub use error::{ConfigError, ResolveError};
pub use indicators::{add_indicators, IndicatorOptions, IndicatorSet, KlineWithIndicators};
pub use lookback::{required_bars, KlineRequest, KlineResolver};
pub use market_data::{KlineProvider, KlineQuery, TradingCalendar};
pub use runtime_config::RuntimeConfig;
pub use types::{AdjustType, Kline, KlinePeriod, Market, Ohlcv};
