// =============================================================================
// Average True Range (ATR): Wilder's Smoothing Method
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR_0 = H - L                                   (no previous close)
//   TR   = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is then the smoothed average of TR using Wilder's method:
//   ATR_{period-1} = SMA of first `period` TR values
//   ATR_t          = (ATR_{t-1} * (period - 1) + TR_t) / period
//
// Default period: 14
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ma::wilder;
use super::round2;
use crate::types::Ohlcv;

fn default_atr_period() -> usize {
    14
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtrParams {
    #[serde(default = "default_atr_period")]
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self {
            period: default_atr_period(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AtrResult {
    /// True range of the bar.
    pub tr: Option<f64>,
    pub atr: Option<f64>,
}

/// True range of every bar. A bar without a usable previous close falls back
/// to its own high - low.
pub fn true_range(bars: &[Ohlcv]) -> Vec<Option<f64>> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let (high, low) = (bar.high?, bar.low?);
            bar.close?;
            let hl = high - low;
            let prev_close = if i == 0 { None } else { bars[i - 1].close };
            Some(match prev_close {
                Some(pc) => hl.max((high - pc).abs()).max((low - pc).abs()),
                None => hl,
            })
        })
        .collect()
}

/// Compute TR and ATR for every bar.
pub fn calc_atr(bars: &[Ohlcv], params: &AtrParams) -> Vec<AtrResult> {
    let tr = true_range(bars);
    let atr = wilder(&tr, params.period);

    tr.iter()
        .zip(atr)
        .map(|(tr, atr)| AtrResult {
            tr: tr.map(round2),
            atr: atr.map(round2),
        })
        .collect()
}
