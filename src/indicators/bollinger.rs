// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the population standard deviation
// of the same window. The Band Width is the normalised distance:
// BW = (upper - lower) / middle * 100.

use serde::{Deserialize, Serialize};

use super::ma::sma;
use super::round2;

fn default_boll_period() -> usize {
    20
}

fn default_std_dev() -> f64 {
    2.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BollParams {
    #[serde(default = "default_boll_period")]
    pub period: usize,
    /// Band multiplier `k`.
    #[serde(default = "default_std_dev")]
    pub std_dev: f64,
}

impl Default for BollParams {
    fn default() -> Self {
        Self {
            period: default_boll_period(),
            std_dev: default_std_dev(),
        }
    }
}

/// Bollinger values for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BollResult {
    pub mid: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
    pub bandwidth: Option<f64>,
}

/// Calculate Bollinger Bands for every close.
///
/// A bar is left empty when the window is incomplete or contains a missing
/// close. `bandwidth` is additionally absent when the middle band is zero.
pub fn calc_boll(closes: &[Option<f64>], params: &BollParams) -> Vec<BollResult> {
    let period = params.period;
    let mid = sma(closes, period);
    let mut result = vec![BollResult::default(); closes.len()];

    for (i, slot) in result.iter_mut().enumerate() {
        let Some(middle) = mid[i] else {
            continue;
        };
        let Some(std_dev) = population_std_dev(&closes[i + 1 - period..=i], middle) else {
            continue;
        };

        let upper = middle + params.std_dev * std_dev;
        let lower = middle - params.std_dev * std_dev;
        let bandwidth = if middle != 0.0 {
            Some(round2((upper - lower) / middle * 100.0))
        } else {
            None
        };

        *slot = BollResult {
            mid: Some(middle),
            upper: Some(round2(upper)),
            lower: Some(round2(lower)),
            bandwidth,
        };
    }
    result
}

/// Population standard deviation of `window` around `mean`.
fn population_std_dev(window: &[Option<f64>], mean: f64) -> Option<f64> {
    let sum_squares: Option<f64> = window.iter().map(|v| v.map(|x| (x - mean).powi(2))).sum();
    sum_squares.map(|s| (s / window.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closes(values: impl IntoIterator<Item = f64>) -> Vec<Option<f64>> {
        values.into_iter().map(Some).collect()
    }

    #[test]
    fn bollinger_basic() {
        let data = closes((1..=20).map(|x| x as f64));
        let out = calc_boll(&data, &BollParams::default());
        assert_eq!(out.len(), 20);
        assert!(out[18].mid.is_none());
        let bb = out[19];
        assert!(bb.upper.unwrap() > bb.mid.unwrap());
        assert!(bb.lower.unwrap() < bb.mid.unwrap());
        assert!(bb.bandwidth.unwrap() > 0.0);
    }

    #[test]
    fn bollinger_known_value() {
        // mean 5, population σ = 2
        let data = closes([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let out = calc_boll(&data, &BollParams { period: 8, std_dev: 2.0 });
        let bb = out[7];
        assert_eq!(bb.mid, Some(5.0));
        assert_eq!(bb.upper, Some(9.0));
        assert_eq!(bb.lower, Some(1.0));
        assert_eq!(bb.bandwidth, Some(160.0));
    }

    #[test]
    fn bollinger_flat() {
        let out = calc_boll(&vec![Some(100.0); 20], &BollParams::default());
        assert_eq!(out[19].bandwidth, Some(0.0));
        assert_eq!(out[19].upper, out[19].lower);
    }

    #[test]
    fn bollinger_bands_ordered() {
        let data = closes((0..80).map(|i| 20.0 + (i as f64 * 0.35).sin() * 4.0 + i as f64 * 0.05));
        for bb in calc_boll(&data, &BollParams::default()) {
            if let (Some(u), Some(m), Some(l)) = (bb.upper, bb.mid, bb.lower) {
                assert!(u >= m && m >= l, "{u} {m} {l}");
            }
        }
    }

    #[test]
    fn bollinger_zero_mid_has_no_bandwidth() {
        let out = calc_boll(&closes([-1.0, 1.0]), &BollParams { period: 2, std_dev: 2.0 });
        assert_eq!(out[1].mid, Some(0.0));
        assert_eq!(out[1].bandwidth, None);
    }
}
