// =============================================================================
// Williams %R
// =============================================================================
//
//   WR = (highest_high_N - close) / (highest_high_N - lowest_low_N) * 100
//
// 0 means the close sits at the top of the N-bar range, 100 at the bottom.
// A flat window (highest == lowest) has no defined position and yields None.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ma::pivot;
use super::{round2, PeriodValues};
use crate::types::Ohlcv;

fn default_wr_periods() -> Vec<usize> {
    vec![6, 10]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WrParams {
    #[serde(default = "default_wr_periods")]
    pub periods: Vec<usize>,
}

impl Default for WrParams {
    fn default() -> Self {
        Self {
            periods: default_wr_periods(),
        }
    }
}

pub fn calc_wr(bars: &[Ohlcv], params: &WrParams) -> Vec<PeriodValues> {
    let lines: Vec<(usize, Vec<Option<f64>>)> = params
        .periods
        .iter()
        .map(|&period| (period, wr_line(bars, period)))
        .collect();
    pivot(bars.len(), &lines)
}

fn wr_line(bars: &[Ohlcv], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; bars.len()];
    if period == 0 {
        return result;
    }
    for i in (period - 1)..bars.len() {
        let Some((high_n, low_n)) = high_low(&bars[i + 1 - period..=i]) else {
            continue;
        };
        let Some(close) = bars[i].close else {
            continue;
        };
        if high_n == low_n {
            continue;
        }
        result[i] = Some(round2((high_n - close) / (high_n - low_n) * 100.0));
    }
    result
}

/// Highest high and lowest low of a window, `None` if any bar lacks either.
pub(crate) fn high_low(window: &[Ohlcv]) -> Option<(f64, f64)> {
    window.iter().try_fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), bar| {
        Some((hi.max(bar.high?), lo.min(bar.low?)))
    })
}
