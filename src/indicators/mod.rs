// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the technical indicators that can
// be attached to a kline series.  Every calculator returns exactly one entry
// per input bar; warm-up bars and bars whose inputs are missing hold `None`
// so callers are forced to handle insufficient-data and numerical-edge-case
// scenarios.  No calculator ever yields NaN or infinity.
//
// The classic family (MA, MACD, BOLL, KDJ, RSI, WR, BIAS, CCI, ATR) is
// rounded to 2 decimals; ROC, DMI, SAR, KC and OBV keep full precision.

use std::collections::BTreeMap;

pub mod adx;
pub mod aggregate;
pub mod atr;
pub mod bias;
pub mod bollinger;
pub mod cci;
pub mod config;
pub mod kdj;
pub mod keltner;
pub mod ma;
pub mod macd;
pub mod obv;
pub mod roc;
pub mod rsi;
pub mod sar;
pub mod wr;

pub use adx::{calc_dmi, DmiParams, DmiResult};
pub use aggregate::{add_indicators, KlineWithIndicators};
pub use atr::{calc_atr, AtrParams, AtrResult};
pub use bias::{calc_bias, BiasParams};
pub use bollinger::{calc_boll, BollParams, BollResult};
pub use cci::{calc_cci, CciParams, CciResult};
pub use config::{IndicatorOptions, IndicatorSet, Selection};
pub use kdj::{calc_kdj, KdjParams, KdjResult};
pub use keltner::{calc_kc, KcParams, KcResult};
pub use ma::{calc_ma, ema, sma, wma, MaParams, MaType};
pub use macd::{calc_macd, MacdParams, MacdResult};
pub use obv::{calc_obv, ObvParams, ObvResult};
pub use roc::{calc_roc, RocParams, RocResult};
pub use rsi::{calc_rsi, RsiParams};
pub use sar::{calc_sar, SarParams, SarResult, Trend};
pub use wr::{calc_wr, WrParams};

/// Values of a multi-period indicator at one bar, keyed by period.
pub type PeriodValues = BTreeMap<usize, Option<f64>>;

/// Round to 2 decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
