// =============================================================================
// BIAS: deviation of the close from its simple moving average
// =============================================================================
//
//   BIAS = (close - SMA(close, N)) / SMA(close, N) * 100
//
// Positive BIAS: price above its average (potentially overbought).
// Negative BIAS: price below its average (potentially oversold).
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ma::{pivot, sma};
use super::{round2, PeriodValues};

fn default_bias_periods() -> Vec<usize> {
    vec![6, 12, 24]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BiasParams {
    #[serde(default = "default_bias_periods")]
    pub periods: Vec<usize>,
}

impl Default for BiasParams {
    fn default() -> Self {
        Self {
            periods: default_bias_periods(),
        }
    }
}

pub fn calc_bias(closes: &[Option<f64>], params: &BiasParams) -> Vec<PeriodValues> {
    let lines: Vec<(usize, Vec<Option<f64>>)> = params
        .periods
        .iter()
        .map(|&period| {
            let line = closes
                .iter()
                .zip(sma(closes, period))
                .map(|(close, ma)| match (close, ma) {
                    (Some(close), Some(ma)) if ma != 0.0 => Some(round2((close - ma) / ma * 100.0)),
                    _ => None,
                })
                .collect();
            (period, line)
        })
        .collect();

    pivot(closes.len(), &lines)
}
