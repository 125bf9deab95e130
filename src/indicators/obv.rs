// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
// Running volume total: a bar closing higher than the previous one adds its
// volume, a lower close subtracts it, an equal close leaves it unchanged.
// The total starts at the first bar's volume.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ma::window_mean;
use crate::types::Ohlcv;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ObvParams {
    /// Trailing SMA of OBV, only computed when set.
    #[serde(default)]
    pub ma_period: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObvResult {
    pub obv: Option<f64>,
    pub obv_ma: Option<f64>,
}

pub fn calc_obv(bars: &[Ohlcv], params: &ObvParams) -> Vec<ObvResult> {
    let mut result = vec![ObvResult::default(); bars.len()];
    let Some(first) = bars.first() else {
        return result;
    };

    let mut total = first.volume.unwrap_or(0.0);
    result[0].obv = Some(total);

    for i in 1..bars.len() {
        let (Some(close), Some(prev_close), Some(volume)) = (bars[i].close, bars[i - 1].close, bars[i].volume) else {
            continue;
        };
        if close > prev_close {
            total += volume;
        } else if close < prev_close {
            total -= volume;
        }
        result[i].obv = Some(total);
    }

    if let Some(ma_period) = params.ma_period.filter(|&p| p > 0) {
        let obv: Vec<Option<f64>> = result.iter().map(|r| r.obv).collect();
        for i in (ma_period - 1)..obv.len() {
            result[i].obv_ma = window_mean(&obv[i + 1 - ma_period..=i]);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64, volume: f64) -> Ohlcv {
        Ohlcv::new(close, close, close, close, volume)
    }

    #[test]
    fn obv_running_total() {
        let bars = vec![bar(10.0, 100.0), bar(11.0, 50.0), bar(10.5, 30.0), bar(10.5, 70.0), bar(12.0, 20.0)];
        let out = calc_obv(&bars, &ObvParams::default());
        let obv: Vec<Option<f64>> = out.iter().map(|r| r.obv).collect();
        assert_eq!(obv, vec![Some(100.0), Some(150.0), Some(120.0), Some(120.0), Some(140.0)]);
        assert!(out.iter().all(|r| r.obv_ma.is_none()));
    }

    #[test]
    fn obv_missing_volume_on_first_bar_starts_at_zero() {
        let mut bars = vec![bar(10.0, 100.0), bar(11.0, 40.0)];
        bars[0].volume = None;
        let out = calc_obv(&bars, &ObvParams::default());
        assert_eq!(out[0].obv, Some(0.0));
        assert_eq!(out[1].obv, Some(40.0));
    }

    #[test]
    fn obv_gap_is_absent_and_keeps_total() {
        let mut bars = vec![bar(10.0, 100.0), bar(11.0, 50.0), bar(12.0, 30.0), bar(13.0, 10.0)];
        bars[2].volume = None;
        let out = calc_obv(&bars, &ObvParams::default());
        assert_eq!(out[2].obv, None);
        assert_eq!(out[3].obv, Some(160.0));
    }

    #[test]
    fn obv_moving_average() {
        let bars = vec![bar(10.0, 100.0), bar(11.0, 50.0), bar(10.0, 30.0), bar(11.0, 20.0)];
        let out = calc_obv(&bars, &ObvParams { ma_period: Some(2) });
        // OBV: 100, 150, 120, 140
        assert!(out[0].obv_ma.is_none());
        assert_eq!(out[1].obv_ma, Some(125.0));
        assert_eq!(out[3].obv_ma, Some(130.0));
    }

    #[test]
    fn obv_empty_input() {
        assert!(calc_obv(&[], &ObvParams::default()).is_empty());
    }
}
