// =============================================================================
// Indicator aggregation
// =============================================================================
//
// Runs every selected calculator once over the full series and attaches the
// per-index results to the matching kline. Families that were not selected
// are omitted from the output entirely (not serialized as null).

use serde::Serialize;

use super::adx::{calc_dmi, DmiResult};
use super::atr::{calc_atr, AtrResult};
use super::bias::calc_bias;
use super::bollinger::{calc_boll, BollResult};
use super::cci::{calc_cci, CciResult};
use super::config::IndicatorSet;
use super::kdj::{calc_kdj, KdjResult};
use super::keltner::{calc_kc, KcResult};
use super::ma::calc_ma;
use super::macd::{calc_macd, MacdResult};
use super::obv::{calc_obv, ObvResult};
use super::roc::{calc_roc, RocResult};
use super::rsi::calc_rsi;
use super::sar::{calc_sar, SarResult};
use super::wr::calc_wr;
use super::PeriodValues;
use crate::types::{Kline, Ohlcv};

/// A kline plus the indicator values computed at its index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KlineWithIndicators {
    #[serde(flatten)]
    pub kline: Kline,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma: Option<PeriodValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boll: Option<BollResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kdj: Option<KdjResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<PeriodValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wr: Option<PeriodValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bias: Option<PeriodValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cci: Option<CciResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr: Option<AtrResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roc: Option<RocResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dmi: Option<DmiResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sar: Option<SarResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kc: Option<KcResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obv: Option<ObvResult>,
}

impl From<Kline> for KlineWithIndicators {
    fn from(kline: Kline) -> Self {
        Self {
            kline,
            ma: None,
            macd: None,
            boll: None,
            kdj: None,
            rsi: None,
            wr: None,
            bias: None,
            cci: None,
            atr: None,
            roc: None,
            dmi: None,
            sar: None,
            kc: None,
            obv: None,
        }
    }
}

/// Attach every indicator in `set` to `klines`.
///
/// The output has one entry per input kline, in the same order.
pub fn add_indicators(klines: &[Kline], set: &IndicatorSet) -> Vec<KlineWithIndicators> {
    let mut rows: Vec<KlineWithIndicators> = klines.iter().cloned().map(Into::into).collect();
    if rows.is_empty() || set.is_empty() {
        return rows;
    }

    let bars: Vec<Ohlcv> = klines.iter().map(Kline::ohlcv).collect();
    let closes: Vec<Option<f64>> = bars.iter().map(|b| b.close).collect();

    // --- Close-based families ---
    if let Some(p) = &set.ma {
        merge(&mut rows, calc_ma(&closes, p), |row, v| row.ma = Some(v));
    }
    if let Some(p) = &set.macd {
        merge(&mut rows, calc_macd(&closes, p), |row, v| row.macd = Some(v));
    }
    if let Some(p) = &set.boll {
        merge(&mut rows, calc_boll(&closes, p), |row, v| row.boll = Some(v));
    }
    if let Some(p) = &set.rsi {
        merge(&mut rows, calc_rsi(&closes, p), |row, v| row.rsi = Some(v));
    }
    if let Some(p) = &set.bias {
        merge(&mut rows, calc_bias(&closes, p), |row, v| row.bias = Some(v));
    }
    if let Some(p) = &set.roc {
        merge(&mut rows, calc_roc(&closes, p), |row, v| row.roc = Some(v));
    }

    // --- OHLCV-based families ---
    if let Some(p) = &set.kdj {
        merge(&mut rows, calc_kdj(&bars, p), |row, v| row.kdj = Some(v));
    }
    if let Some(p) = &set.wr {
        merge(&mut rows, calc_wr(&bars, p), |row, v| row.wr = Some(v));
    }
    if let Some(p) = &set.cci {
        merge(&mut rows, calc_cci(&bars, p), |row, v| row.cci = Some(v));
    }
    if let Some(p) = &set.atr {
        merge(&mut rows, calc_atr(&bars, p), |row, v| row.atr = Some(v));
    }
    if let Some(p) = &set.dmi {
        merge(&mut rows, calc_dmi(&bars, p), |row, v| row.dmi = Some(v));
    }
    if let Some(p) = &set.sar {
        merge(&mut rows, calc_sar(&bars, p), |row, v| row.sar = Some(v));
    }
    if let Some(p) = &set.kc {
        merge(&mut rows, calc_kc(&bars, p), |row, v| row.kc = Some(v));
    }
    if let Some(p) = &set.obv {
        merge(&mut rows, calc_obv(&bars, p), |row, v| row.obv = Some(v));
    }

    rows
}

/// Positionally attach one calculator's output to the rows.
fn merge<T>(rows: &mut [KlineWithIndicators], values: Vec<T>, mut attach: impl FnMut(&mut KlineWithIndicators, T)) {
    debug_assert_eq!(rows.len(), values.len());
    for (row, value) in rows.iter_mut().zip(values) {
        attach(row, value);
    }
}
