//! Parameter decoding
//!
//! Operation parameters arrive as a loosely typed bag. [`ParamValue`] is the
//! tagged variant every value decodes into; [`Params`] wraps the bag with
//! typed getters that fail with [`SphynxError::ParameterType`] instead of
//! guessing. Keys nobody asks for are ignored.

use crate::error::{SphynxError, SphynxResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type ParamMap = IndexMap<String, ParamValue>;

/// A dynamically typed parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<ParamValue>),
    Map(ParamMap),
}

impl ParamValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Number(_) => "number",
            ParamValue::String(_) => "string",
            ParamValue::List(_) => "list",
            ParamValue::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ParamMap> {
        match self {
            ParamValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::String(v)
    }
}

impl From<Params> for ParamValue {
    fn from(v: Params) -> Self {
        ParamValue::Map(v.0)
    }
}

/// The parameter bag of one operation invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(ParamMap);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: ParamMap) -> Self {
        Self(map)
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn get_string(&self, key: &str) -> SphynxResult<&str> {
        let v = self.required(key)?;
        v.as_str().ok_or_else(|| type_error(key, "string", v))
    }

    pub fn get_double(&self, key: &str) -> SphynxResult<f64> {
        let v = self.required(key)?;
        v.as_f64().ok_or_else(|| type_error(key, "number", v))
    }

    pub fn get_bool(&self, key: &str) -> SphynxResult<bool> {
        let v = self.required(key)?;
        v.as_bool().ok_or_else(|| type_error(key, "boolean", v))
    }

    pub fn get_map(&self, key: &str) -> SphynxResult<Params> {
        let v = self.required(key)?;
        v.as_map()
            .map(|m| Params(m.clone()))
            .ok_or_else(|| type_error(key, "map", v))
    }

    /// Like `get_double`, but an absent key is `Ok(None)`
    pub fn opt_double(&self, key: &str) -> SphynxResult<Option<f64>> {
        self.0.get(key).map(|_| self.get_double(key)).transpose()
    }

    pub fn opt_bool(&self, key: &str) -> SphynxResult<Option<bool>> {
        self.0.get(key).map(|_| self.get_bool(key)).transpose()
    }

    pub fn opt_map(&self, key: &str) -> SphynxResult<Option<Params>> {
        self.0.get(key).map(|_| self.get_map(key)).transpose()
    }

    fn required(&self, key: &str) -> SphynxResult<&ParamValue> {
        self.0
            .get(key)
            .ok_or_else(|| SphynxError::MissingParameter(key.to_string()))
    }
}

fn type_error(key: &str, expected: &'static str, found: &ParamValue) -> SphynxError {
    SphynxError::ParameterType {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

/// Options map passed to algorithm operations.
///
/// Absence of a key is meaningful: a missing seed means seed 1, which is
/// not the same as an explicit seed of 0.
#[derive(Debug, Clone, Default)]
pub struct AlgorithmOptions {
    pub options: Params,
}

impl AlgorithmOptions {
    pub const DEFAULT_SEED: u64 = 1;

    pub fn new(options: Params) -> Self {
        Self { options }
    }

    pub fn double(&self, key: &str) -> SphynxResult<f64> {
        self.options.get_double(key)
    }

    pub fn seed(&self) -> SphynxResult<u64> {
        match self.options.opt_double("seed")? {
            None => Ok(Self::DEFAULT_SEED),
            Some(s) => non_negative_integer("seed", s),
        }
    }

    /// Resolution parameter of modularity-based algorithms
    pub fn gamma(&self) -> SphynxResult<f64> {
        self.double("gamma")
    }

    /// Only an explicit `false` makes the graph undirected
    pub fn directed(&self) -> bool {
        self.options.get("directed") != Some(&ParamValue::Bool(false))
    }

    pub fn refine(&self) -> SphynxResult<bool> {
        Ok(self.options.opt_bool("refine")?.unwrap_or(false))
    }

    /// Per-call thread count override
    pub fn threads(&self) -> SphynxResult<Option<usize>> {
        match self.options.opt_double("threads")? {
            None => Ok(None),
            Some(t) => {
                let t = non_negative_integer("threads", t)?;
                if t == 0 {
                    return Err(SphynxError::InvalidInput(
                        "option 'threads' must be positive".to_string(),
                    ));
                }
                Ok(Some(t as usize))
            }
        }
    }
}

fn non_negative_integer(key: &str, v: f64) -> SphynxResult<u64> {
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 {
        Ok(v as u64)
    } else {
        Err(SphynxError::InvalidInput(format!(
            "option '{}' must be a non-negative integer, got {}",
            key, v
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(json: &str) -> Params {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decode_from_json() {
        let p = params(r#"{"op": "PLM", "options": {"gamma": 1, "directed": false}, "x": null}"#);
        assert_eq!(p.get_string("op").unwrap(), "PLM");
        assert_eq!(p.get("x"), Some(&ParamValue::Null));

        let options = p.get_map("options").unwrap();
        assert_eq!(options.get_double("gamma").unwrap(), 1.0);
        assert!(!options.get_bool("directed").unwrap());
    }

    #[test]
    fn test_type_errors() {
        let p = Params::new().with("gamma", "high").with("op", 3.0);
        assert_eq!(
            p.get_double("gamma"),
            Err(SphynxError::ParameterType {
                key: "gamma".to_string(),
                expected: "number",
                found: "string",
            })
        );
        assert!(matches!(p.get_string("op"), Err(SphynxError::ParameterType { .. })));
        assert!(matches!(p.get_map("op"), Err(SphynxError::ParameterType { .. })));
        assert_eq!(
            p.get_string("missing"),
            Err(SphynxError::MissingParameter("missing".to_string()))
        );
    }

    #[test]
    fn test_optional_getters() {
        let p = Params::new().with("a", 2.5).with("b", true);
        assert_eq!(p.opt_double("a").unwrap(), Some(2.5));
        assert_eq!(p.opt_double("zzz").unwrap(), None);
        assert!(p.opt_double("b").is_err());
        assert_eq!(p.opt_bool("b").unwrap(), Some(true));
        assert!(p.opt_map("a").is_err());
    }

    #[test]
    fn test_seed_presence() {
        assert_eq!(AlgorithmOptions::default().seed().unwrap(), 1);

        let zero = AlgorithmOptions::new(Params::new().with("seed", 0.0));
        assert_eq!(zero.seed().unwrap(), 0);

        let bad = AlgorithmOptions::new(Params::new().with("seed", -4.0));
        assert!(bad.seed().is_err());

        let wrong = AlgorithmOptions::new(Params::new().with("seed", "7"));
        assert!(matches!(wrong.seed(), Err(SphynxError::ParameterType { .. })));
    }

    #[test]
    fn test_seed_beyond_u64_is_rejected() {
        let high = AlgorithmOptions::new(Params::new().with("seed", 2f64.powi(63)));
        assert_eq!(high.seed().unwrap(), 1u64 << 63);

        let overflow = AlgorithmOptions::new(Params::new().with("seed", 2f64.powi(64)));
        assert!(matches!(overflow.seed(), Err(SphynxError::InvalidInput(_))));
    }

    #[test]
    fn test_directed_defaults_to_true() {
        assert!(AlgorithmOptions::default().directed());
        assert!(AlgorithmOptions::new(Params::new().with("directed", true)).directed());
        assert!(AlgorithmOptions::new(Params::new().with("directed", "no")).directed());
        assert!(!AlgorithmOptions::new(Params::new().with("directed", false)).directed());
    }

    #[test]
    fn test_gamma_and_threads() {
        let o = AlgorithmOptions::new(Params::new().with("gamma", 0.5).with("threads", 2.0));
        assert_eq!(o.gamma().unwrap(), 0.5);
        assert_eq!(o.threads().unwrap(), Some(2));
        assert!(!o.refine().unwrap());

        assert!(matches!(
            AlgorithmOptions::default().gamma(),
            Err(SphynxError::MissingParameter(_))
        ));
        assert!(AlgorithmOptions::new(Params::new().with("threads", 0.0))
            .threads()
            .is_err());
    }
}
