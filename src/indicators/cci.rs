// =============================================================================
// Commodity Channel Index (CCI)
// =============================================================================
//
//   TP  = (high + low + close) / 3
//   MA  = SMA(TP, N)
//   MD  = mean(|TP_j - MA|) over the same window
//   CCI = (TP - MA) / (0.015 * MD)
//
// CCI > 100 is read as overbought, CCI < -100 as oversold. A window of
// identical typical prices has MD == 0; CCI is then defined as 0.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::round2;
use crate::types::Ohlcv;

/// Lambert's constant, chosen so that ~75% of values fall in [-100, 100].
const CCI_SCALE: f64 = 0.015;

fn default_cci_period() -> usize {
    14
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CciParams {
    #[serde(default = "default_cci_period")]
    pub period: usize,
}

impl Default for CciParams {
    fn default() -> Self {
        Self {
            period: default_cci_period(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CciResult {
    pub cci: Option<f64>,
}

pub fn calc_cci(bars: &[Ohlcv], params: &CciParams) -> Vec<CciResult> {
    let period = params.period;
    let mut result = vec![CciResult::default(); bars.len()];
    if period == 0 {
        return result;
    }

    let tp: Vec<Option<f64>> = bars
        .iter()
        .map(|b| Some((b.high? + b.low? + b.close?) / 3.0))
        .collect();

    for i in (period - 1)..bars.len() {
        let window: Option<Vec<f64>> = tp[i + 1 - period..=i].iter().copied().collect();
        let (Some(window), Some(current)) = (window, tp[i]) else {
            continue;
        };

        let ma = window.iter().sum::<f64>() / period as f64;
        let md = window.iter().map(|v| (v - ma).abs()).sum::<f64>() / period as f64;

        let cci = if md == 0.0 {
            0.0
        } else {
            round2((current - ma) / (CCI_SCALE * md))
        };
        result[i].cci = Some(cci);
    }
    result
}
