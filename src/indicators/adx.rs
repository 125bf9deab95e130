// =============================================================================
// Directional Movement Index (DMI) / Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Apply Wilder's smoothing (period) to +DM, -DM, and TR.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = Wilder's smoothed average of DX over `adx_period` bars.
//   7. ADXR = (ADX_t + ADX_{t - adx_period}) / 2
//
// Index layout for `period = adx_period = n`:
//   +DI / -DI / DX first defined at  n
//   ADX first defined at             2n - 1
//   ADXR first defined at            3n - 1
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ma::wilder;
use crate::types::Ohlcv;

fn default_dmi_period() -> usize {
    14
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DmiParams {
    #[serde(default = "default_dmi_period")]
    pub period: usize,
    /// Smoothing period of ADX; falls back to `period` when unset.
    #[serde(default)]
    pub adx_period: Option<usize>,
}

impl DmiParams {
    pub fn adx_period(&self) -> usize {
        self.adx_period.unwrap_or(self.period)
    }
}

impl Default for DmiParams {
    fn default() -> Self {
        Self {
            period: default_dmi_period(),
            adx_period: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DmiResult {
    /// +DI
    pub pdi: Option<f64>,
    /// -DI
    pub mdi: Option<f64>,
    pub adx: Option<f64>,
    pub adxr: Option<f64>,
}

pub fn calc_dmi(bars: &[Ohlcv], params: &DmiParams) -> Vec<DmiResult> {
    let period = params.period;
    let adx_period = params.adx_period();
    let n = bars.len();
    let mut result = vec![DmiResult::default(); n];
    if period == 0 || adx_period == 0 || n < 2 {
        return result;
    }

    // ------------------------------------------------------------------
    // Step 1 & 2: Raw +DM, -DM, and True Range for each consecutive pair
    // ------------------------------------------------------------------
    let mut plus_dm = vec![None; n];
    let mut minus_dm = vec![None; n];
    let mut tr_vals = vec![None; n];

    for i in 1..n {
        let Some(m) = directional_move(&bars[i - 1], &bars[i]) else {
            continue;
        };
        plus_dm[i] = Some(m.plus);
        minus_dm[i] = Some(m.minus);
        tr_vals[i] = Some(m.true_range);
    }

    // ------------------------------------------------------------------
    // Step 3 & 4: Wilder smoothing and directional indicators
    // ------------------------------------------------------------------
    // Index 0 carries no movement, so the first smoothed value is at `period`.
    let smooth_plus = wilder(&plus_dm, period);
    let smooth_minus = wilder(&minus_dm, period);
    let smooth_tr = wilder(&tr_vals, period);

    let mut dx = vec![None; n];
    for i in 0..n {
        let (Some(sp), Some(sm), Some(st)) = (smooth_plus[i], smooth_minus[i], smooth_tr[i]) else {
            continue;
        };
        if st <= 0.0 {
            continue;
        }
        let pdi = sp / st * 100.0;
        let mdi = sm / st * 100.0;
        result[i].pdi = Some(pdi);
        result[i].mdi = Some(mdi);

        // Step 5: both DIs zero means no directional movement at all.
        let di_sum = pdi + mdi;
        dx[i] = Some(if di_sum > 0.0 {
            (pdi - mdi).abs() / di_sum * 100.0
        } else {
            0.0
        });
    }

    // ------------------------------------------------------------------
    // Step 6 & 7: ADX and ADXR
    // ------------------------------------------------------------------
    let adx = wilder(&dx, adx_period);
    for i in 0..n {
        result[i].adx = adx[i];
        if i >= adx_period {
            if let (Some(current), Some(earlier)) = (adx[i], adx[i - adx_period]) {
                result[i].adxr = Some((current + earlier) / 2.0);
            }
        }
    }

    result
}

struct DirectionalMove {
    plus: f64,
    minus: f64,
    true_range: f64,
}

/// +DM / -DM / TR between two bars. The larger of the up-move and down-move
/// wins when positive; a tie gives zero to both.
fn directional_move(prev: &Ohlcv, current: &Ohlcv) -> Option<DirectionalMove> {
    let (high, low) = (current.high?, current.low?);
    let (prev_high, prev_low, prev_close) = (prev.high?, prev.low?, prev.close?);

    let true_range = (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs());

    let up_move = high - prev_high;
    let down_move = prev_low - low;

    let plus = if up_move > down_move && up_move > 0.0 {
        up_move
    } else {
        0.0
    };
    let minus = if down_move > up_move && down_move > 0.0 {
        down_move
    } else {
        0.0
    };

    Some(DirectionalMove {
        plus,
        minus,
        true_range,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Ohlcv {
        Ohlcv::new(open, high, low, close, 1.0)
    }

    fn uptrend(n: usize) -> Vec<Ohlcv> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                candle(base, base + 1.5, base - 0.5, base + 1.0)
            })
            .collect()
    }

    #[test]
    fn dmi_output_length_matches_input() {
        let out = calc_dmi(&uptrend(40), &DmiParams::default());
        assert_eq!(out.len(), 40);
        assert!(calc_dmi(&[], &DmiParams::default()).is_empty());
    }

    #[test]
    fn dmi_boundary_indices() {
        let period = 3;
        let out = calc_dmi(
            &uptrend(20),
            &DmiParams {
                period,
                adx_period: None,
            },
        );
        // DI first at `period`.
        assert!(out[period - 1].pdi.is_none());
        assert!(out[period].pdi.is_some());
        // ADX first at `period * 2 - 1`.
        assert!(out[period * 2 - 2].adx.is_none());
        assert!(out[period * 2 - 1].adx.is_some());
        // ADXR first at `period * 2 - 1 + adx_period`.
        assert!(out[period * 2 - 2 + period].adxr.is_none());
        assert!(out[period * 2 - 1 + period].adxr.is_some());
    }

    #[test]
    fn dmi_boundary_with_distinct_adx_period() {
        let out = calc_dmi(
            &uptrend(30),
            &DmiParams {
                period: 4,
                adx_period: Some(2),
            },
        );
        // ADX at period + adx_period - 1 = 5, ADXR two bars later.
        assert!(out[4].adx.is_none());
        assert!(out[5].adx.is_some());
        assert!(out[6].adxr.is_none());
        assert!(out[7].adxr.is_some());
    }

    #[test]
    fn dmi_strong_uptrend() {
        let out = calc_dmi(&uptrend(60), &DmiParams::default());
        let last = out[59];
        assert!(last.pdi.unwrap() > last.mdi.unwrap());
        // Consecutive higher highs and higher lows: a strong trend.
        assert!(last.adx.unwrap() > 25.0, "got {:?}", last.adx);
    }

    #[test]
    fn dmi_flat_market() {
        // Identical candles: no directional movement.
        let candles = vec![candle(100.0, 101.0, 99.0, 100.0); 60];
        let out = calc_dmi(&candles, &DmiParams::default());
        let adx = out[59].adx.unwrap();
        assert!(adx < 1.0, "expected ADX near 0 for flat market, got {adx}");
    }

    #[test]
    fn dmi_zero_range_is_absent_not_nan() {
        let candles = vec![candle(10.0, 10.0, 10.0, 10.0); 30];
        let out = calc_dmi(&candles, &DmiParams { period: 5, adx_period: None });
        assert!(out.iter().all(|r| r.pdi.is_none() && r.adx.is_none()));
    }

    #[test]
    fn dmi_tie_moves_give_zero() {
        let prev = candle(10.0, 12.0, 8.0, 10.0);
        let cur = candle(10.0, 13.0, 7.0, 10.0);
        let m = directional_move(&prev, &cur).unwrap();
        assert_eq!(m.plus, 0.0);
        assert_eq!(m.minus, 0.0);
        assert_eq!(m.true_range, 6.0);
    }

    #[test]
    fn dmi_result_range() {
        let candles: Vec<Ohlcv> = (0..100)
            .map(|i| {
                let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                candle(base - 0.5, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        for r in calc_dmi(&candles, &DmiParams::default()) {
            if let Some(adx) = r.adx {
                assert!((0.0..=100.0).contains(&adx), "ADX {adx} out of range");
            }
        }
    }
}
