// =============================================================================
// Relative Strength Index (RSI): Wilder's Smoothing
// =============================================================================
//
// Step 1: Compute price changes (deltas) from consecutive closes.  A delta
//          involving a missing close counts as no movement.
// Step 2: Seed average gain / average loss with the mean of the first
//          `period` gains / losses.  The first RSI lands on index `period`.
// Step 3: Apply Wilder's smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4: RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//
// Degenerate averages: avg_loss == 0 => 100, avg_gain == 0 => 0.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ma::{pivot, wilder};
use super::{round2, PeriodValues};

fn default_rsi_periods() -> Vec<usize> {
    vec![6, 12, 24]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RsiParams {
    #[serde(default = "default_rsi_periods")]
    pub periods: Vec<usize>,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            periods: default_rsi_periods(),
        }
    }
}

/// Compute one RSI line per configured period.
pub fn calc_rsi(closes: &[Option<f64>], params: &RsiParams) -> Vec<PeriodValues> {
    // --- Gains / losses per bar (index 0 has no predecessor) -----------------
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i == 0 {
            gains.push(None);
            losses.push(None);
            continue;
        }
        let delta = match (closes[i - 1], closes[i]) {
            (Some(prev), Some(cur)) => cur - prev,
            _ => 0.0,
        };
        gains.push(Some(delta.max(0.0)));
        losses.push(Some((-delta).max(0.0)));
    }

    let lines: Vec<(usize, Vec<Option<f64>>)> = params
        .periods
        .iter()
        .map(|&period| (period, rsi_line(&gains, &losses, period)))
        .collect();

    pivot(closes.len(), &lines)
}

fn rsi_line(gains: &[Option<f64>], losses: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    // Index 0 is always None, so the first complete window of `period` deltas
    // ends at index `period`.
    let avg_gain = wilder(gains, period);
    let avg_loss = wilder(losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| match (g, l) {
            (Some(g), Some(l)) => Some(rsi_from_averages(*g, *l)),
            _ => None,
        })
        .collect()
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        let rs = avg_gain / avg_loss;
        round2(100.0 - 100.0 / (1.0 + rs))
    }
}
