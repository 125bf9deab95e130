// =============================================================================
// Moving Averages: SMA / EMA / WMA over nullable series
// =============================================================================
//
// Every function here returns a vector with exactly one slot per input value.
// Slots inside the warm-up zone (fewer than `period` preceding values) or
// whose window contains a missing value are `None`.
//
//   SMA_i = mean(x_{i-period+1} ..= x_i)
//   EMA_i = alpha * x_i + (1 - alpha) * EMA_{i-1},   alpha = 2 / (period + 1)
//   WMA_i = sum(w_j * x_j) / sum(w_j),                w = 1..=period
//
// The EMA is seeded with the SMA of its first complete window rather than
// the raw first value, which removes first-value bias.
// =============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{round2, PeriodValues};

/// Which moving-average primitive `calc_ma` applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaType {
    #[default]
    Sma,
    Ema,
    Wma,
}

fn default_ma_periods() -> Vec<usize> {
    vec![5, 10, 20, 30, 60, 120, 250]
}

/// Parameters of the multi-period moving average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaParams {
    #[serde(default = "default_ma_periods")]
    pub periods: Vec<usize>,
    #[serde(default, rename = "type")]
    pub ma_type: MaType,
}

impl Default for MaParams {
    fn default() -> Self {
        Self {
            periods: default_ma_periods(),
            ma_type: MaType::Sma,
        }
    }
}

/// Simple moving average, rounded to 2 decimals.
pub fn sma(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; series.len()];
    if period == 0 {
        return result;
    }
    for i in (period - 1)..series.len() {
        result[i] = window_mean(&series[i + 1 - period..=i]).map(round2);
    }
    result
}

/// Exponential moving average, rounded to 2 decimals on output.
///
/// The internal state is kept at full precision. A missing value after the
/// seed carries the previous EMA forward unchanged.
pub fn ema(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    ema_unrounded(series, period)
        .into_iter()
        .map(|v| v.map(round2))
        .collect()
}

/// Same recurrence as [`ema`] without the output rounding.
pub(crate) fn ema_unrounded(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; series.len()];
    if period == 0 {
        return result;
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut state: Option<f64> = None;

    for i in (period - 1)..series.len() {
        state = match (state, series[i]) {
            // Seed: SMA of the first complete window.
            (None, _) => window_mean(&series[i + 1 - period..=i]),
            (Some(prev), Some(x)) => Some(alpha * x + (1.0 - alpha) * prev),
            (Some(prev), None) => Some(prev),
        };
        result[i] = state;
    }
    result
}

/// Linearly weighted moving average (most recent value weighs `period`),
/// rounded to 2 decimals.
pub fn wma(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; series.len()];
    if period == 0 {
        return result;
    }
    let weight_sum = period as f64 * (period as f64 + 1.0) / 2.0;

    for i in (period - 1)..series.len() {
        let window = &series[i + 1 - period..=i];
        let weighted: Option<f64> = window
            .iter()
            .enumerate()
            .map(|(j, v)| v.map(|x| x * (j + 1) as f64))
            .sum();
        result[i] = weighted.map(|sum| round2(sum / weight_sum));
    }
    result
}

/// Wilder smoothing: `avg = (avg * (n - 1) + x) / n`.
///
/// Seeded with the plain mean of the first complete window of `period`
/// values; missing values after the seed carry the average forward.
/// Unlike the other primitives the output is NOT rounded, since RSI / ATR /
/// DMI feed it into further arithmetic.
pub fn wilder(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; series.len()];
    if period == 0 {
        return result;
    }
    let n = period as f64;
    let mut state: Option<f64> = None;

    for i in (period - 1)..series.len() {
        state = match (state, series[i]) {
            (None, _) => window_mean(&series[i + 1 - period..=i]),
            (Some(avg), Some(x)) => Some((avg * (n - 1.0) + x) / n),
            (Some(avg), None) => Some(avg),
        };
        result[i] = state;
    }
    result
}

/// Apply the configured primitive once per period and pivot the result to
/// one `period -> value` map per index.
pub fn calc_ma(closes: &[Option<f64>], params: &MaParams) -> Vec<PeriodValues> {
    let primitive: fn(&[Option<f64>], usize) -> Vec<Option<f64>> = match params.ma_type {
        MaType::Sma => sma,
        MaType::Ema => ema,
        MaType::Wma => wma,
    };

    let lines: Vec<(usize, Vec<Option<f64>>)> = params
        .periods
        .iter()
        .map(|&period| (period, primitive(closes, period)))
        .collect();

    pivot(closes.len(), &lines)
}

/// Turn per-period lines into per-index maps.
pub(crate) fn pivot(len: usize, lines: &[(usize, Vec<Option<f64>>)]) -> Vec<PeriodValues> {
    (0..len)
        .map(|i| {
            lines
                .iter()
                .map(|(period, line)| (*period, line[i]))
                .collect::<BTreeMap<_, _>>()
        })
        .collect()
}

/// Mean of a window, or `None` if any value is missing.
pub(crate) fn window_mean(window: &[Option<f64>]) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    let sum: Option<f64> = window.iter().copied().sum();
    sum.map(|s| s / window.len() as f64)
}
