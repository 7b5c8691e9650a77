//! Pooled z-score normalization of attribution scores.
//!
//! Scores from every condition of an experiment are pooled to get one
//! global mean and (population) standard deviation. Each score is
//! z-transformed against them, and each condition is reported as the mean of
//! its z-scores with the standard error `std(z) / sqrt(n)`.

use serde::{Deserialize, Serialize};

/// Mean and population standard deviation.
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, var.sqrt()))
}

/// `(x - mean) / std` for every value; all zeros when `std == 0`.
pub fn z_transform(values: &[f64], mean: f64, std: f64) -> Vec<f64> {
    if std == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - mean) / std).collect()
}

/// Summary of one condition in z-units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub name: String,
    pub participants: usize,
    pub mean_z: f64,
    pub sem_z: f64,
}

/// Per-condition z-score summary plus the pooled statistics used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZSummary {
    pub pooled_mean: f64,
    pub pooled_std: f64,
    pub conditions: Vec<ConditionSummary>,
}

impl ZSummary {
    /// Builds the summary from `(condition name, scores)` groups.
    ///
    /// Returns `None` if no group has any score. A condition with no scores is
    /// reported with zero mean and error.
    pub fn from_groups<'a, I>(groups: I) -> Option<ZSummary>
    where
        I: IntoIterator<Item = (&'a str, &'a [f64])>,
    {
        let groups: Vec<(&str, &[f64])> = groups.into_iter().collect();
        let pooled: Vec<f64> = groups.iter().flat_map(|(_, s)| s.iter().copied()).collect();
        let (pooled_mean, pooled_std) = mean_std(&pooled)?;

        let conditions = groups
            .iter()
            .map(|(name, scores)| {
                let z = z_transform(scores, pooled_mean, pooled_std);
                let (mean_z, sem_z) = match mean_std(&z) {
                    Some((m, s)) => (m, s / (z.len() as f64).sqrt()),
                    None => (0.0, 0.0),
                };
                ConditionSummary {
                    name: name.to_string(),
                    participants: scores.len(),
                    mean_z,
                    sem_z,
                }
            })
            .collect();

        Some(ZSummary {
            pooled_mean,
            pooled_std,
            conditions,
        })
    }

    /// Looks up a condition by name.
    pub fn condition(&self, name: &str) -> Option<&ConditionSummary> {
        self.conditions.iter().find(|c| c.name == name)
    }
}
