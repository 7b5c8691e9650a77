//! Common types for the cogsim sampling layer.

use crate::error::SampleError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Values produced by one execution of a generative process, keyed by site name.
///
/// A sample set is ephemeral: it lives for one model run and is consumed by
/// whoever executed the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    values: BTreeMap<String, f64>,
}

impl SampleSet {
    /// Creates an empty sample set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the value of a site, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Returns the value of a site if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Returns the value of a site or a `MissingSite` error.
    pub fn value(&self, name: &str) -> Result<f64, SampleError> {
        self.get(name)
            .ok_or_else(|| SampleError::MissingSite(name.to_string()))
    }

    /// Returns true if the site was recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the number of recorded sites.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for SampleSet {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
