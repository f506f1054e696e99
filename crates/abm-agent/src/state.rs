//! Per-agent attribute bag.

use std::collections::BTreeMap;

use abm_core::{Heading, Value};

/// Attribute names used for an agent's heading in models with continuous
/// motion.
pub const HEADING_DX: &str = "dx";
pub const HEADING_DY: &str = "dy";

/// Mapping from attribute name to typed value.
///
/// Backed by a `BTreeMap` so iteration order (and therefore every export of
/// the bag) is stable across runs.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentState {
    attrs: BTreeMap<String, Value>,
}

impl AgentState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// Numeric attribute as `f64`; `None` if absent or not numeric.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.attrs.get(key).and_then(|v| v.as_f64().ok())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.attrs.get(key).and_then(|v| v.as_i64().ok())
    }

    /// Numeric attribute, or `default` when absent.
    #[inline]
    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.get_f64(key).unwrap_or(default)
    }

    /// Heading stored under `dx` / `dy`; zero when either is missing.
    pub fn heading(&self) -> Heading {
        match (self.get_f64(HEADING_DX), self.get_f64(HEADING_DY)) {
            (Some(dx), Some(dy)) => Heading::new(dx, dy),
            _ => Heading::ZERO,
        }
    }

    /// Insert or replace an attribute, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attrs.insert(key.into(), value.into())
    }

    pub fn set_heading(&mut self, heading: Heading) {
        self.set(HEADING_DX, heading.dx);
        self.set(HEADING_DY, heading.dy);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.attrs.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    /// Attributes in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AgentState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attrs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
