// =============================================================================
// Rate of Change (ROC): Momentum Indicator
// =============================================================================
//
// ROC measures the percentage change in price over a look-back period:
//   ROC = ((close - close_n) / close_n) * 100
//
// Positive ROC indicates upward momentum; negative indicates downward.
// An optional signal line is the SMA of ROC over `signal_period` bars.

use serde::{Deserialize, Serialize};

use super::ma::window_mean;

fn default_roc_period() -> usize {
    12
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RocParams {
    #[serde(default = "default_roc_period")]
    pub period: usize,
    /// Signal line is only computed when set.
    #[serde(default)]
    pub signal_period: Option<usize>,
}

impl Default for RocParams {
    fn default() -> Self {
        Self {
            period: default_roc_period(),
            signal_period: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RocResult {
    pub roc: Option<f64>,
    pub signal: Option<f64>,
}

/// Calculate ROC (and its optional signal line) for every close.
pub fn calc_roc(closes: &[Option<f64>], params: &RocParams) -> Vec<RocResult> {
    let period = params.period;
    let mut result = vec![RocResult::default(); closes.len()];
    if period == 0 {
        return result;
    }

    for i in period..closes.len() {
        result[i].roc = match (closes[i], closes[i - period]) {
            (Some(current), Some(prev)) if prev != 0.0 => Some((current - prev) / prev * 100.0),
            _ => None,
        };
    }

    if let Some(signal_period) = params.signal_period.filter(|&p| p > 0) {
        let roc: Vec<Option<f64>> = result.iter().map(|r| r.roc).collect();
        for i in (signal_period - 1)..roc.len() {
            result[i].signal = window_mean(&roc[i + 1 - signal_period..=i]);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closes(values: impl IntoIterator<Item = f64>) -> Vec<Option<f64>> {
        values.into_iter().map(Some).collect()
    }

    #[test]
    fn roc_basic() {
        let data = closes((1..=20).map(|x| x as f64));
        let out = calc_roc(&data, &RocParams { period: 14, signal_period: None });
        assert_eq!(out.len(), 20);
        assert!(out[13].roc.is_none());
        // From 1 to 15: ROC = (15-1)/1 * 100 = 1400%
        assert!((out[14].roc.unwrap() - 1400.0).abs() < 1e-10);
        assert!(out.iter().all(|r| r.signal.is_none()));
    }

    #[test]
    fn roc_insufficient_data() {
        let out = calc_roc(&closes([1.0, 2.0, 3.0]), &RocParams::default());
        assert!(out.iter().all(|r| r.roc.is_none()));
    }

    #[test]
    fn roc_zero_base_is_absent() {
        let out = calc_roc(&closes([0.0, 5.0, 10.0]), &RocParams { period: 1, signal_period: None });
        assert!(out[1].roc.is_none());
        assert!((out[2].roc.unwrap() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn roc_signal_line() {
        let data = closes([100.0, 110.0, 121.0, 121.0, 108.9]);
        let out = calc_roc(&data, &RocParams { period: 1, signal_period: Some(2) });
        assert!(out[1].signal.is_none());
        // ROC: _, 10, 10, 0, -10
        assert!((out[2].signal.unwrap() - 10.0).abs() < 1e-9);
        assert!((out[3].signal.unwrap() - 5.0).abs() < 1e-9);
        assert!((out[4].signal.unwrap() + 5.0).abs() < 1e-9);
    }
}
