// =============================================================================
// Keltner Channel (KC)
// =============================================================================
//
//   mid   = EMA(close, ema_period)
//   upper = mid + multiplier * ATR(atr_period)
//   lower = mid - multiplier * ATR(atr_period)
//   width = (upper - lower) / mid * 100
//
// Like Bollinger Bands but the band width comes from ATR instead of the
// standard deviation, so the channel reacts more smoothly to single spikes.
// Values are kept at full precision: mid and ATR come from the unrounded
// EMA / Wilder primitives, not from the 2-decimal `ema` and `calc_atr`.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::atr::true_range;
use super::ma::{ema_unrounded, wilder};
use crate::types::Ohlcv;

fn default_ema_period() -> usize {
    20
}

fn default_atr_period() -> usize {
    10
}

fn default_multiplier() -> f64 {
    2.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KcParams {
    #[serde(default = "default_ema_period")]
    pub ema_period: usize,
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for KcParams {
    fn default() -> Self {
        Self {
            ema_period: default_ema_period(),
            atr_period: default_atr_period(),
            multiplier: default_multiplier(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KcResult {
    pub mid: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
    pub width: Option<f64>,
}

pub fn calc_kc(bars: &[Ohlcv], params: &KcParams) -> Vec<KcResult> {
    let closes: Vec<Option<f64>> = bars.iter().map(|b| b.close).collect();
    let mid = ema_unrounded(&closes, params.ema_period);
    let atr = wilder(&true_range(bars), params.atr_period);

    mid.into_iter()
        .zip(atr)
        .map(|(mid, atr)| {
            let (Some(mid), Some(atr)) = (mid, atr) else {
                return KcResult::default();
            };
            let upper = mid + params.multiplier * atr;
            let lower = mid - params.multiplier * atr;
            KcResult {
                mid: Some(mid),
                upper: Some(upper),
                lower: Some(lower),
                width: (mid > 0.0).then(|| (upper - lower) / mid * 100.0),
            }
        })
        .collect()
}
