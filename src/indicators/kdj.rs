// =============================================================================
// KDJ Stochastic Oscillator
// =============================================================================
//
//   RSV = (close - lowest_low_N) / (highest_high_N - lowest_low_N) * 100
//   K   = (k - 1) / k * K_prev + 1 / k * RSV
//   D   = (d - 1) / d * D_prev + 1 / d * K
//   J   = 3K - 2D
//
// K and D start from 50. Bars without a defined RSV (incomplete window,
// missing field, flat range) are absent and do not advance K / D.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::round2;
use super::wr::high_low;
use crate::types::Ohlcv;

/// Starting value of both K and D.
const KDJ_SEED: f64 = 50.0;

fn default_kdj_period() -> usize {
    9
}

fn default_smoothing() -> usize {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KdjParams {
    /// RSV window.
    #[serde(default = "default_kdj_period")]
    pub period: usize,
    #[serde(default = "default_smoothing")]
    pub k_period: usize,
    #[serde(default = "default_smoothing")]
    pub d_period: usize,
}

impl Default for KdjParams {
    fn default() -> Self {
        Self {
            period: default_kdj_period(),
            k_period: default_smoothing(),
            d_period: default_smoothing(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KdjResult {
    pub k: Option<f64>,
    pub d: Option<f64>,
    pub j: Option<f64>,
}

pub fn calc_kdj(bars: &[Ohlcv], params: &KdjParams) -> Vec<KdjResult> {
    let period = params.period;
    let mut result = vec![KdjResult::default(); bars.len()];
    if period == 0 || params.k_period == 0 || params.d_period == 0 {
        return result;
    }

    let k_n = params.k_period as f64;
    let d_n = params.d_period as f64;
    let mut k = KDJ_SEED;
    let mut d = KDJ_SEED;

    for i in (period - 1)..bars.len() {
        let Some(rsv) = rsv(&bars[i + 1 - period..=i]) else {
            continue;
        };

        k = (k_n - 1.0) / k_n * k + rsv / k_n;
        d = (d_n - 1.0) / d_n * d + k / d_n;
        let j = 3.0 * k - 2.0 * d;

        result[i] = KdjResult {
            k: Some(round2(k)),
            d: Some(round2(d)),
            j: Some(round2(j)),
        };
    }
    result
}

/// Raw stochastic value of the last bar of `window`.
fn rsv(window: &[Ohlcv]) -> Option<f64> {
    let (high_n, low_n) = high_low(window)?;
    let close = window.last()?.close?;
    if high_n == low_n {
        return None;
    }
    Some((close - low_n) / (high_n - low_n) * 100.0)
}
