// =============================================================================
// Parabolic SAR (Stop And Reverse)
// =============================================================================
//
//   SAR_t = SAR_{t-1} + AF * (EP - SAR_{t-1})
//
// EP (extreme point) is the highest high of an uptrend or the lowest low of
// a downtrend. AF starts at `af_start`, grows by `af_increment` each time
// a new extreme is made and is capped at `af_max`.
//
// In an uptrend the SAR may not rise above the lows of the previous two
// bars (in a downtrend it may not fall below their highs). A bar that
// crosses the SAR reverses the trend: SAR jumps to the old EP, EP resets to
// the bar's extreme and AF to `af_start`.
//
// The first bar only seeds the state and has no output.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::Ohlcv;

fn default_af_start() -> f64 {
    0.02
}

fn default_af_increment() -> f64 {
    0.02
}

fn default_af_max() -> f64 {
    0.2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SarParams {
    #[serde(default = "default_af_start")]
    pub af_start: f64,
    #[serde(default = "default_af_increment")]
    pub af_increment: f64,
    #[serde(default = "default_af_max")]
    pub af_max: f64,
}

impl Default for SarParams {
    fn default() -> Self {
        Self {
            af_start: default_af_start(),
            af_increment: default_af_increment(),
            af_max: default_af_max(),
        }
    }
}

/// Trend direction, serialized as `1` (up) / `-1` (down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Trend {
    Up,
    Down,
}

impl From<Trend> for i8 {
    fn from(trend: Trend) -> Self {
        match trend {
            Trend::Up => 1,
            Trend::Down => -1,
        }
    }
}

impl TryFrom<i8> for Trend {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Trend::Up),
            -1 => Ok(Trend::Down),
            other => Err(format!("invalid trend {other}, expected 1 or -1")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SarResult {
    pub sar: Option<f64>,
    pub trend: Option<Trend>,
    /// Extreme point.
    pub ep: Option<f64>,
    /// Acceleration factor.
    pub af: Option<f64>,
}

/// State carried from one bar to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SarState {
    sar: f64,
    trend: Trend,
    extreme_point: f64,
    acceleration: f64,
}

impl SarState {
    fn seed(trend: Trend, high: f64, low: f64, af_start: f64) -> Self {
        match trend {
            Trend::Up => Self {
                sar: low,
                trend,
                extreme_point: high,
                acceleration: af_start,
            },
            Trend::Down => Self {
                sar: high,
                trend,
                extreme_point: low,
                acceleration: af_start,
            },
        }
    }

    /// Advance by one bar. `guard_low` / `guard_high` are the extremes of
    /// the two preceding bars that the SAR may not penetrate.
    fn step(&mut self, high: f64, low: f64, guard_low: f64, guard_high: f64, params: &SarParams) {
        let tentative = self.sar + self.acceleration * (self.extreme_point - self.sar);

        match self.trend {
            Trend::Up => {
                let sar = tentative.min(guard_low);
                if low < sar {
                    self.reverse(Trend::Down, low, params.af_start);
                } else {
                    self.sar = sar;
                    if high > self.extreme_point {
                        self.extend(high, params);
                    }
                }
            }
            Trend::Down => {
                let sar = tentative.max(guard_high);
                if high > sar {
                    self.reverse(Trend::Up, high, params.af_start);
                } else {
                    self.sar = sar;
                    if low < self.extreme_point {
                        self.extend(low, params);
                    }
                }
            }
        }
    }

    fn reverse(&mut self, trend: Trend, extreme: f64, af_start: f64) {
        self.sar = self.extreme_point;
        self.trend = trend;
        self.extreme_point = extreme;
        self.acceleration = af_start;
    }

    fn extend(&mut self, extreme: f64, params: &SarParams) {
        self.extreme_point = extreme;
        self.acceleration = (self.acceleration + params.af_increment).min(params.af_max);
    }

    fn result(&self) -> SarResult {
        SarResult {
            sar: Some(self.sar),
            trend: Some(self.trend),
            ep: Some(self.extreme_point),
            af: Some(self.acceleration),
        }
    }
}

pub fn calc_sar(bars: &[Ohlcv], params: &SarParams) -> Vec<SarResult> {
    let n = bars.len();
    let mut result = vec![SarResult::default(); n];
    if n < 2 {
        return result;
    }

    let initial_trend = match (bars[0].close, bars[1].close) {
        (Some(first), Some(second)) if second < first => Trend::Down,
        _ => Trend::Up,
    };

    let mut state: Option<SarState> = None;
    for i in 0..n {
        let (Some(high), Some(low)) = (bars[i].high, bars[i].low) else {
            continue;
        };
        let Some(current) = state.as_mut() else {
            // The first bar with a full range seeds the state.
            state = Some(SarState::seed(initial_trend, high, low, params.af_start));
            continue;
        };

        let prev = &bars[i - 1];
        let (Some(prev_high), Some(prev_low)) = (prev.high, prev.low) else {
            continue;
        };
        let before = &bars[i.saturating_sub(2)];
        let guard_low = prev_low.min(before.low.unwrap_or(prev_low));
        let guard_high = prev_high.max(before.high.unwrap_or(prev_high));

        current.step(high, low, guard_low, guard_high, params);
        result[i] = current.result();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(high: f64, low: f64, close: f64) -> Ohlcv {
        Ohlcv::new(close, high, low, close, 100.0)
    }

    fn uptrend(n: usize) -> Vec<Ohlcv> {
        (0..n)
            .map(|i| {
                let base = 10.0 + i as f64;
                candle(base + 0.5, base - 0.5, base + 0.2)
            })
            .collect()
    }

    #[test]
    fn sar_first_bar_is_absent() {
        let out = calc_sar(&uptrend(5), &SarParams::default());
        assert_eq!(out[0], SarResult::default());
        assert!(out[1].sar.is_some());
    }

    #[test]
    fn sar_short_input_is_all_absent() {
        let out = calc_sar(&uptrend(1), &SarParams::default());
        assert_eq!(out, vec![SarResult::default()]);
    }

    #[test]
    fn sar_first_step_in_uptrend() {
        let out = calc_sar(&uptrend(3), &SarParams::default());
        // seed: SAR 9.5, EP 10.5; tentative 9.5 + 0.02 * 1 = 9.52, guard low 9.5
        let first = out[1];
        assert_eq!(first.trend, Some(Trend::Up));
        assert!((first.sar.unwrap() - 9.5).abs() < 1e-10);
        // new high 11.5 extends EP and grows AF
        assert!((first.ep.unwrap() - 11.5).abs() < 1e-10);
        assert!((first.af.unwrap() - 0.04).abs() < 1e-10);
    }

    #[test]
    fn sar_stays_below_lows_in_uptrend() {
        let bars = uptrend(40);
        let out = calc_sar(&bars, &SarParams::default());
        for (bar, r) in bars.iter().zip(&out).skip(1) {
            assert_eq!(r.trend, Some(Trend::Up));
            assert!(r.sar.unwrap() <= bar.low.unwrap());
        }
    }

    #[test]
    fn sar_af_is_capped() {
        let out = calc_sar(&uptrend(40), &SarParams::default());
        assert!(out.iter().filter_map(|r| r.af).all(|af| af <= 0.2 + 1e-12));
        assert!((out[39].af.unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn sar_reverses_on_cross() {
        let mut bars = uptrend(10);
        // Collapse far below the running SAR.
        bars.push(candle(12.0, 2.0, 3.0));
        let out = calc_sar(&bars, &SarParams::default());
        let flip = out[10];
        assert_eq!(flip.trend, Some(Trend::Down));
        // SAR jumps to the previous extreme, EP to the new low.
        assert_eq!(flip.sar, out[9].ep);
        assert_eq!(flip.ep, Some(2.0));
        assert_eq!(flip.af, Some(0.02));
    }

    #[test]
    fn sar_initial_downtrend_from_closes() {
        let bars = vec![candle(10.5, 9.5, 10.0), candle(10.0, 9.0, 9.2), candle(9.5, 8.5, 8.7)];
        let out = calc_sar(&bars, &SarParams::default());
        assert_eq!(out[1].trend, Some(Trend::Down));
        assert!(out[2].sar.unwrap() >= bars[2].high.unwrap());
    }

    #[test]
    fn sar_missing_range_is_absent() {
        let mut bars = uptrend(6);
        bars[3].high = None;
        let out = calc_sar(&bars, &SarParams::default());
        assert!(out[3].sar.is_none());
        // Bar 4 has no complete previous bar either.
        assert!(out[4].sar.is_none());
        assert!(out[5].sar.is_some());
    }

    #[test]
    fn trend_serializes_as_sign() {
        assert_eq!(serde_json::to_string(&Trend::Down).unwrap(), "-1");
        assert_eq!(serde_json::from_str::<Trend>("1").unwrap(), Trend::Up);
        assert!(serde_json::from_str::<Trend>("0").is_err());
    }
}
