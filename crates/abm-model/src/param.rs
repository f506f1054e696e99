//! Model parameters: declared schemas, raw parameter sets, and validation.
//!
//! A factory declares a [`ParamSchema`].  Callers hand the registry a raw
//! [`ParamSet`]; it is checked against the schema before any model code
//! runs, producing [`ValidatedParams`] in which every declared key is present
//! with the declared type.
//!
//! Raw values may arrive as `Value::Text` from a key/value config source;
//! text is parsed with [`ParamSpec::parse`] for non-text parameters.

use std::collections::BTreeMap;
use std::fmt;

use abm_core::Value;

use crate::{ModelError, ModelResult};

// ── ParamKind ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamKind {
    Int,
    Float,
    Bool,
    Text,
    /// Text restricted to one of the listed options.
    Choice(Vec<String>),
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Int => f.write_str("integer"),
            ParamKind::Float => f.write_str("float"),
            ParamKind::Bool => f.write_str("boolean"),
            ParamKind::Text => f.write_str("text"),
            ParamKind::Choice(opts) => write!(f, "one of [{}]", opts.join(", ")),
        }
    }
}

// ── ParamSpec ─────────────────────────────────────────────────────────────────

/// Declaration of a single parameter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamSpec {
    pub key:         String,
    pub kind:        ParamKind,
    pub description: String,
    /// Value used when the key is absent.  `None` makes the key required.
    pub default:     Option<Value>,
    /// Inclusive numeric bounds for `Int` / `Float` parameters.
    pub range:       Option<(f64, f64)>,
}

impl ParamSpec {
    pub fn new(key: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            description: description.into(),
            default: None,
            range: None,
        }
    }

    pub fn int(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(key, ParamKind::Int, description)
    }

    pub fn float(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(key, ParamKind::Float, description)
    }

    pub fn bool(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(key, ParamKind::Bool, description)
    }

    pub fn text(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(key, ParamKind::Text, description)
    }

    pub fn choice(
        key:         impl Into<String>,
        options:     &[&str],
        description: impl Into<String>,
    ) -> Self {
        let opts = options.iter().map(|s| (*s).to_owned()).collect();
        Self::new(key, ParamKind::Choice(opts), description)
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Parse a raw string into a value of this parameter's kind.
    ///
    /// Booleans accept `true/false`, `yes/no`, `on/off`, and `1/0`
    /// (case-insensitive).  The result is range-checked.
    pub fn parse(&self, raw: &str) -> ModelResult<Value> {
        let raw = raw.trim();
        let value = match &self.kind {
            ParamKind::Int => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.invalid(format!("expected {}, got {raw:?}", self.kind)))?,
            ParamKind::Float => raw
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float)
                .ok_or_else(|| self.invalid(format!("expected {}, got {raw:?}", self.kind)))?,
            ParamKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Value::Bool(true),
                "false" | "no" | "off" | "0" => Value::Bool(false),
                _ => return Err(self.invalid(format!("expected {}, got {raw:?}", self.kind))),
            },
            ParamKind::Text | ParamKind::Choice(_) => Value::Text(raw.to_owned()),
        };
        self.check(value)
    }

    /// Coerce and check an already-typed value.
    ///
    /// `Int` is widened to `Float` for float parameters; `Text` is parsed for
    /// every non-text kind.
    pub fn check(&self, value: Value) -> ModelResult<Value> {
        let value = match (&self.kind, value) {
            (ParamKind::Int, v @ Value::Int(_)) => v,
            (ParamKind::Float, Value::Int(i)) => Value::Float(i as f64),
            (ParamKind::Float, v @ Value::Float(_)) => v,
            (ParamKind::Bool, v @ Value::Bool(_)) => v,
            (ParamKind::Text, v @ Value::Text(_)) => v,
            (ParamKind::Choice(opts), Value::Text(s)) => {
                if !opts.iter().any(|o| *o == s) {
                    return Err(self.invalid(format!("expected {}, got {s:?}", self.kind)));
                }
                Value::Text(s)
            }
            (_, Value::Text(s)) => return self.parse(&s),
            (kind, other) => {
                return Err(self.invalid(format!("expected {kind}, got {}", other.type_name())));
            }
        };

        if let Value::Float(f) = value {
            if !f.is_finite() {
                return Err(self.invalid(format!("{f} is not a finite number")));
            }
        }
        if let (Some((min, max)), Ok(n)) = (self.range, value.as_f64()) {
            if n < min || n > max {
                return Err(self.invalid(format!("{n} is outside [{min}, {max}]")));
            }
        }
        Ok(value)
    }

    fn invalid(&self, reason: String) -> ModelError {
        ModelError::invalid(&self.key, reason)
    }
}

// ── ParamSchema ───────────────────────────────────────────────────────────────

/// Ordered list of parameter declarations for one model.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamSchema {
    specs: Vec<ParamSpec>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration.  A later spec with the same key replaces the
    /// earlier one.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.specs.retain(|s| s.key != spec.key);
        self.specs.push(spec);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Check `params` against the schema.
    ///
    /// Fails on the first problem found: unknown keys (ascending), then
    /// declared keys in declaration order (missing, wrong type, out of
    /// range, not an allowed choice).
    pub fn validate(&self, params: &ParamSet) -> ModelResult<ValidatedParams> {
        if let Some(unknown) = params.keys().find(|k| self.get(k).is_none()) {
            return Err(ModelError::invalid(unknown, "not a parameter of this model"));
        }

        let mut values = BTreeMap::new();
        for spec in &self.specs {
            let value = match (params.get(&spec.key), &spec.default) {
                (Some(v), _) => spec.check(v.clone())?,
                (None, Some(d)) => d.clone(),
                (None, None) => {
                    return Err(ModelError::invalid(
                        &spec.key,
                        format!("required {} parameter is missing", spec.kind),
                    ));
                }
            };
            values.insert(spec.key.clone(), value);
        }
        Ok(ValidatedParams { values })
    }
}

// ── ParamSet ──────────────────────────────────────────────────────────────────

/// Raw parameter values supplied by a caller.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamSet(BTreeMap<String, Value>);

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ── ValidatedParams ───────────────────────────────────────────────────────────

/// A parameter set that passed [`ParamSchema::validate`].
///
/// Only the schema can construct one, so factories can rely on every declared
/// key being present with its declared type.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedParams {
    values: BTreeMap<String, Value>,
}

impl ValidatedParams {
    pub fn get(&self, key: &str) -> ModelResult<&Value> {
        self.values
            .get(key)
            .ok_or_else(|| ModelError::invalid(key, "not declared in the schema"))
    }

    pub fn f64(&self, key: &str) -> ModelResult<f64> {
        self.get(key)?.as_f64().map_err(|e| ModelError::invalid(key, e.to_string()))
    }

    pub fn i64(&self, key: &str) -> ModelResult<i64> {
        self.get(key)?.as_i64().map_err(|e| ModelError::invalid(key, e.to_string()))
    }

    /// Integer parameter narrowed to `u32`.
    pub fn u32(&self, key: &str) -> ModelResult<u32> {
        let n = self.i64(key)?;
        u32::try_from(n).map_err(|_| ModelError::invalid(key, format!("{n} does not fit in u32")))
    }

    pub fn bool(&self, key: &str) -> ModelResult<bool> {
        self.get(key)?.as_bool().map_err(|e| ModelError::invalid(key, e.to_string()))
    }

    pub fn str(&self, key: &str) -> ModelResult<&str> {
        self.get(key)?.as_str().map_err(|e| ModelError::invalid(key, e.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
