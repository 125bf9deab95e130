// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   DIF  = EMA(close, short) - EMA(close, long)
//   DEA  = EMA(DIF, signal)
//   MACD = (DIF - DEA) * 2
//
// DIF only exists once the long EMA has warmed up; DEA needs a further
// `signal` DIF values on top of that.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ma::ema;
use super::round2;

fn default_short() -> usize {
    12
}

fn default_long() -> usize {
    26
}

fn default_signal() -> usize {
    9
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MacdParams {
    #[serde(default = "default_short")]
    pub short: usize,
    #[serde(default = "default_long")]
    pub long: usize,
    #[serde(default = "default_signal")]
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            short: default_short(),
            long: default_long(),
            signal: default_signal(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub dif: Option<f64>,
    pub dea: Option<f64>,
    /// Histogram.
    pub macd: Option<f64>,
}

pub fn calc_macd(closes: &[Option<f64>], params: &MacdParams) -> Vec<MacdResult> {
    let ema_short = ema(closes, params.short);
    let ema_long = ema(closes, params.long);

    let dif: Vec<Option<f64>> = ema_short
        .iter()
        .zip(&ema_long)
        .map(|(s, l)| Some((*s)? - (*l)?))
        .collect();
    let dea = ema(&dif, params.signal);

    dif.iter()
        .zip(dea)
        .map(|(&dif, dea)| MacdResult {
            dif: dif.map(round2),
            dea,
            macd: dif.zip(dea).map(|(dif, dea)| round2((dif - dea) * 2.0)),
        })
        .collect()
}
