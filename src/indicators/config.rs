// =============================================================================
// Indicator selection
// =============================================================================
//
// Callers describe the indicators they want as JSON where every key accepts
// either a flag or a parameter object:
//
//   { "ma": { "periods": [5, 10] }, "macd": true, "rsi": false }
//
// `IndicatorOptions::validate` resolves every selection exactly once into an
// `IndicatorSet` of plain `Option<Params>`; the calculators never see the
// flag form.
// =============================================================================

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::adx::DmiParams;
use super::atr::AtrParams;
use super::bias::BiasParams;
use super::bollinger::BollParams;
use super::cci::CciParams;
use super::kdj::KdjParams;
use super::keltner::KcParams;
use super::ma::MaParams;
use super::macd::MacdParams;
use super::obv::ObvParams;
use super::roc::RocParams;
use super::rsi::RsiParams;
use super::sar::SarParams;
use super::wr::WrParams;
use crate::error::ConfigError;

/// Three-way choice for one indicator family.
///
/// JSON: absent / `false` / `null` => `Skip`, `true` => `Default`,
/// object => `Explicit` (missing fields take their defaults).
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<T> {
    Skip,
    Default,
    Explicit(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::Skip
    }
}

impl<T: Clone + Default> Selection<T> {
    /// Parameters to compute with, or `None` when the family is skipped.
    pub fn resolve(&self) -> Option<T> {
        match self {
            Self::Skip => None,
            Self::Default => Some(T::default()),
            Self::Explicit(params) => Some(params.clone()),
        }
    }
}

impl<T> From<T> for Selection<T> {
    fn from(params: T) -> Self {
        Self::Explicit(params)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Selection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<P> {
            Unset,
            Flag(bool),
            Params(P),
        }

        Ok(match Raw::<T>::deserialize(deserializer)? {
            Raw::Unset | Raw::Flag(false) => Self::Skip,
            Raw::Flag(true) => Self::Default,
            Raw::Params(params) => Self::Explicit(params),
        })
    }
}

impl<T: Serialize> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Skip => serializer.serialize_bool(false),
            Self::Default => serializer.serialize_bool(true),
            Self::Explicit(params) => params.serialize(serializer),
        }
    }
}

/// Requested indicators as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorOptions {
    pub ma: Selection<MaParams>,
    pub macd: Selection<MacdParams>,
    pub boll: Selection<BollParams>,
    pub kdj: Selection<KdjParams>,
    pub rsi: Selection<RsiParams>,
    pub wr: Selection<WrParams>,
    pub bias: Selection<BiasParams>,
    pub cci: Selection<CciParams>,
    pub atr: Selection<AtrParams>,
    pub roc: Selection<RocParams>,
    pub dmi: Selection<DmiParams>,
    pub sar: Selection<SarParams>,
    pub kc: Selection<KcParams>,
    pub obv: Selection<ObvParams>,
}

/// Validated indicator configuration: one `Some(params)` per active family.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    pub ma: Option<MaParams>,
    pub macd: Option<MacdParams>,
    pub boll: Option<BollParams>,
    pub kdj: Option<KdjParams>,
    pub rsi: Option<RsiParams>,
    pub wr: Option<WrParams>,
    pub bias: Option<BiasParams>,
    pub cci: Option<CciParams>,
    pub atr: Option<AtrParams>,
    pub roc: Option<RocParams>,
    pub dmi: Option<DmiParams>,
    pub sar: Option<SarParams>,
    pub kc: Option<KcParams>,
    pub obv: Option<ObvParams>,
}

impl IndicatorSet {
    /// `true` when no family is selected.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl IndicatorOptions {
    /// Resolve every selection and check its parameters.
    pub fn validate(&self) -> Result<IndicatorSet, ConfigError> {
        Ok(IndicatorSet {
            ma: checked(&self.ma, |p| periods("ma.periods", &p.periods))?,
            macd: checked(&self.macd, |p| {
                period("macd.short", p.short)?;
                period("macd.long", p.long)?;
                period("macd.signal", p.signal)
            })?,
            boll: checked(&self.boll, |p| {
                period("boll.period", p.period)?;
                multiplier("boll.stdDev", p.std_dev)
            })?,
            kdj: checked(&self.kdj, |p| {
                period("kdj.period", p.period)?;
                period("kdj.kPeriod", p.k_period)?;
                period("kdj.dPeriod", p.d_period)
            })?,
            rsi: checked(&self.rsi, |p| periods("rsi.periods", &p.periods))?,
            wr: checked(&self.wr, |p| periods("wr.periods", &p.periods))?,
            bias: checked(&self.bias, |p| periods("bias.periods", &p.periods))?,
            cci: checked(&self.cci, |p| period("cci.period", p.period))?,
            atr: checked(&self.atr, |p| period("atr.period", p.period))?,
            roc: checked(&self.roc, |p| {
                period("roc.period", p.period)?;
                optional_period("roc.signalPeriod", p.signal_period)
            })?,
            dmi: checked(&self.dmi, |p| {
                period("dmi.period", p.period)?;
                optional_period("dmi.adxPeriod", p.adx_period)
            })?,
            sar: checked(&self.sar, |p| {
                factor("sar.afStart", p.af_start)?;
                factor("sar.afIncrement", p.af_increment)?;
                factor("sar.afMax", p.af_max)?;
                if p.af_start > p.af_max {
                    return Err(ConfigError::new(
                        "sar.afStart",
                        format!("must not exceed afMax ({}), got {}", p.af_max, p.af_start),
                    ));
                }
                Ok(())
            })?,
            kc: checked(&self.kc, |p| {
                period("kc.emaPeriod", p.ema_period)?;
                period("kc.atrPeriod", p.atr_period)?;
                multiplier("kc.multiplier", p.multiplier)
            })?,
            obv: checked(&self.obv, |p| optional_period("obv.maPeriod", p.ma_period))?,
        })
    }
}

// --- Validation helpers ---

fn checked<T: Clone + Default>(
    selection: &Selection<T>,
    check: impl FnOnce(&T) -> Result<(), ConfigError>,
) -> Result<Option<T>, ConfigError> {
    let Some(params) = selection.resolve() else {
        return Ok(None);
    };
    check(&params)?;
    Ok(Some(params))
}

fn period(param: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::new(param, "must be a positive integer, got 0"));
    }
    Ok(())
}

fn optional_period(param: &str, value: Option<usize>) -> Result<(), ConfigError> {
    value.map_or(Ok(()), |v| period(param, v))
}

fn periods(param: &str, values: &[usize]) -> Result<(), ConfigError> {
    if values.is_empty() {
        return Err(ConfigError::new(param, "must list at least one period"));
    }
    values.iter().try_for_each(|&v| period(param, v))
}

fn multiplier(param: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::new(
            param,
            format!("must be a finite non-negative number, got {value}"),
        ));
    }
    Ok(())
}

fn factor(param: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::new(
            param,
            format!("must be a finite positive number, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::ma::MaType;

    fn parse(json: &str) -> IndicatorOptions {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn selection_from_json_forms() {
        let opts = parse(r#"{ "ma": true, "macd": false, "rsi": { "periods": [14] }, "kdj": null }"#);
        assert_eq!(opts.ma, Selection::Default);
        assert_eq!(opts.macd, Selection::Skip);
        assert_eq!(opts.kdj, Selection::Skip);
        assert_eq!(opts.boll, Selection::Skip);
        assert_eq!(opts.rsi, Selection::Explicit(RsiParams { periods: vec![14] }));
    }

    #[test]
    fn explicit_object_fills_missing_fields() {
        let opts = parse(r#"{ "macd": { "long": 30 }, "boll": {} }"#);
        let set = opts.validate().unwrap();
        let macd = set.macd.unwrap();
        assert_eq!((macd.short, macd.long, macd.signal), (12, 30, 9));
        assert_eq!(set.boll, Some(BollParams::default()));
    }

    #[test]
    fn validate_resolves_defaults() {
        let set = parse(r#"{ "ma": true, "dmi": true }"#).validate().unwrap();
        assert_eq!(set.ma.unwrap().periods, vec![5, 10, 20, 30, 60, 120, 250]);
        assert_eq!(set.dmi.unwrap().adx_period(), 14);
        assert!(set.rsi.is_none());
    }

    #[test]
    fn empty_options_give_empty_set() {
        let set = IndicatorOptions::default().validate().unwrap();
        assert!(set.is_empty());
        assert!(parse("{}").validate().unwrap().is_empty());
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        // `period` instead of `periods` must not fall back to the defaults.
        assert!(serde_json::from_str::<IndicatorOptions>(r#"{ "ma": { "period": 5 } }"#).is_err());
        assert!(serde_json::from_str::<IndicatorOptions>(r#"{ "kc": { "emaPeriod": 20, "atrPerod": 10 } }"#).is_err());
        assert!(serde_json::from_str::<IndicatorOptions>(r#"{ "mcad": true }"#).is_err());
        // Partial objects with known keys still fill in defaults.
        let opts = parse(r#"{ "ma": { "periods": [5] } }"#);
        assert_eq!(opts.validate().unwrap().ma.unwrap().periods, vec![5]);
    }

    #[test]
    fn zero_period_is_rejected_with_path() {
        let err = parse(r#"{ "macd": { "long": 0 } }"#).validate().unwrap_err();
        assert_eq!(err.param, "macd.long");

        let err = parse(r#"{ "rsi": { "periods": [6, 0] } }"#).validate().unwrap_err();
        assert_eq!(err.param, "rsi.periods");

        let err = parse(r#"{ "roc": { "signalPeriod": 0 } }"#).validate().unwrap_err();
        assert_eq!(err.param, "roc.signalPeriod");
    }

    #[test]
    fn empty_period_list_is_rejected() {
        let err = parse(r#"{ "wr": { "periods": [] } }"#).validate().unwrap_err();
        assert_eq!(err.param, "wr.periods");
    }

    #[test]
    fn negative_multiplier_is_rejected() {
        let err = parse(r#"{ "kc": { "multiplier": -1.0 } }"#).validate().unwrap_err();
        assert_eq!(err.param, "kc.multiplier");
        // Zero collapses the bands but is allowed.
        assert!(parse(r#"{ "boll": { "stdDev": 0 } }"#).validate().is_ok());
    }

    #[test]
    fn sar_factors_are_checked() {
        let err = parse(r#"{ "sar": { "afStart": 0.3 } }"#).validate().unwrap_err();
        assert_eq!(err.param, "sar.afStart");
        let err = parse(r#"{ "sar": { "afIncrement": 0 } }"#).validate().unwrap_err();
        assert_eq!(err.param, "sar.afIncrement");
    }

    #[test]
    fn skipped_invalid_params_are_not_checked() {
        let opts = IndicatorOptions {
            ma: Selection::Skip,
            ..Default::default()
        };
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn selection_serializes_back_to_json_forms() {
        let opts = IndicatorOptions {
            ma: Selection::Explicit(MaParams {
                periods: vec![5],
                ma_type: MaType::Ema,
            }),
            macd: Selection::Default,
            ..Default::default()
        };
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["ma"]["periods"][0], 5);
        assert_eq!(json["ma"]["type"], "ema");
        assert_eq!(json["macd"], true);
        assert_eq!(json["rsi"], false);
    }
}
