//! Attributes: parallel value arrays with per-entry definedness

use crate::error::{SphynxError, SphynxResult};
use serde::{Deserialize, Serialize};

/// Values over a vertex set or edge bundle.
///
/// `defined[i] == false` means entry `i` is absent, whatever `values[i]` holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute<T> {
    pub values: Vec<T>,
    pub defined: Vec<bool>,
}

impl<T> Attribute<T> {
    pub fn new(values: Vec<T>, defined: Vec<bool>) -> SphynxResult<Self> {
        if values.len() != defined.len() {
            return Err(SphynxError::InvalidInput(format!(
                "attribute has {} values but {} defined flags",
                values.len(),
                defined.len()
            )));
        }
        Ok(Self { values, defined })
    }

    /// Every entry defined
    pub fn fully_defined(values: Vec<T>) -> Self {
        let defined = vec![true; values.len()];
        Self { values, defined }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        match self.defined.get(i) {
            Some(true) => self.values.get(i),
            _ => None,
        }
    }

    /// Check the attribute matches the size of its owning entity
    pub fn validate(&self, owner_size: usize) -> SphynxResult<()> {
        if self.values.len() != self.defined.len() || self.values.len() != owner_size {
            return Err(SphynxError::InvalidInput(format!(
                "attribute of {} values / {} flags does not match entity of size {}",
                self.values.len(),
                self.defined.len(),
                owner_size
            )));
        }
        Ok(())
    }
}

impl<T: Default> FromIterator<Option<T>> for Attribute<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        let mut values = Vec::new();
        let mut defined = Vec::new();
        for v in iter {
            defined.push(v.is_some());
            values.push(v.unwrap_or_default());
        }
        Self { values, defined }
    }
}

/// A pair of doubles, e.g. a geographic position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DoubleTuple2 {
    pub x: f64,
    pub y: f64,
}

pub type DoubleAttribute = Attribute<f64>;
pub type LongAttribute = Attribute<i64>;
pub type StringAttribute = Attribute<String>;
pub type DoubleTuple2Attribute = Attribute<DoubleTuple2>;
