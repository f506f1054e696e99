//! Shared environment state: named per-cell fields and global values.
//!
//! A field is sparse: cells that were never written read as `None`, and
//! models supply their own default.  Field names are kept in a `BTreeMap` so
//! whole-store walks are ordered.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use abm_core::{Position, Value};

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldStore {
    cells:   BTreeMap<String, FxHashMap<Position, Value>>,
    globals: BTreeMap<String, Value>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, field: &str, pos: Position) -> Option<&Value> {
        self.cells.get(field).and_then(|m| m.get(&pos))
    }

    /// Numeric cell value, `0.0` when unset or non-numeric.
    pub fn get_f64(&self, field: &str, pos: Position) -> f64 {
        self.get(field, pos).and_then(|v| v.as_f64().ok()).unwrap_or(0.0)
    }

    pub fn set(&mut self, field: &str, pos: Position, value: Value) -> Option<Value> {
        match self.cells.get_mut(field) {
            Some(m) => m.insert(pos, value),
            None => {
                let mut m = FxHashMap::default();
                m.insert(pos, value);
                self.cells.insert(field.to_owned(), m);
                None
            }
        }
    }

    pub fn clear(&mut self, field: &str, pos: Position) -> Option<Value> {
        let m = self.cells.get_mut(field)?;
        let old = m.remove(&pos);
        if m.is_empty() {
            self.cells.remove(field);
        }
        old
    }

    #[inline]
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn set_global(&mut self, name: &str, value: Value) -> Option<Value> {
        self.globals.insert(name.to_owned(), value)
    }

    /// Cells with a value in `field`, row-major.
    pub fn cells_of(&self, field: &str) -> Vec<Position> {
        let mut out: Vec<Position> = self
            .cells
            .get(field)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        out.sort_unstable_by_key(|p| (p.y, p.x));
        out
    }

    /// `(cell, value)` pairs of `field`, row-major.
    pub fn entries(&self, field: &str) -> Vec<(Position, &Value)> {
        let mut out: Vec<(Position, &Value)> = self
            .cells
            .get(field)
            .map(|m| m.iter().map(|(p, v)| (*p, v)).collect())
            .unwrap_or_default();
        out.sort_unstable_by_key(|(p, _)| (p.y, p.x));
        out
    }

    /// Sum of every numeric value in `field`, accumulated in row-major order
    /// so the float result is reproducible.
    pub fn total(&self, field: &str) -> f64 {
        self.entries(field)
            .into_iter()
            .filter_map(|(_, v)| v.as_f64().ok())
            .sum()
    }
}
