//! Participant variables and per-participant snapshots.
//!
//! A [`Variable`] couples a named distribution with the value it last
//! produced. Variables are grouped into a [`VariableSet`], which experiments
//! use for defaults and conditions use for overrides. Each simulated
//! participant works on its own resampled copy of the set, so no value
//! leaks between participants.

use crate::error::VariableError;
use cogsim_env::{Distribution, DistributionKind, SampleError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Whether a cause is under the participant's own control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locus {
    /// Internal factor (skill, effort)
    Internal,
    /// External factor (task difficulty, luck)
    External,
}

impl Locus {
    /// Parses the 0/1 `internal` flag.
    pub fn from_flag(internal: i64) -> Result<Self, VariableError> {
        match internal {
            1 => Ok(Locus::Internal),
            0 => Ok(Locus::External),
            other => Err(VariableError::InvalidInternalFlag(other)),
        }
    }
}

/// A named random quantity with its most recent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Unique key of the variable and of its sample site
    name: String,

    /// Internal vs external cause
    locus: Locus,

    /// Distribution the variable is drawn from
    distribution: Distribution,

    /// Last sampled value (`None` until the first draw)
    current_value: Option<f64>,
}

impl Variable {
    /// Declares a variable from a kind name and an ordered parameter list.
    ///
    /// # Arguments
    /// * `internal` - 1 for an internal cause, 0 for an external one
    /// * `name` - unique variable name
    /// * `kind` - one of `Normal`, `Binomial`, `Exponential`, `Fixed`
    /// * `params` - parameters in constructor order, e.g. `[("mean", 0.0), ("std", 1.0)]`
    ///
    /// Validation happens here: a bad flag, unknown kind or malformed
    /// parameter list is rejected before anything is sampled.
    pub fn new(
        internal: i64,
        name: impl Into<String>,
        kind: &str,
        params: &[(&str, f64)],
    ) -> Result<Self, VariableError> {
        let locus = Locus::from_flag(internal)?;
        let kind: DistributionKind = kind.parse()?;
        let distribution = Distribution::from_params(kind, params)?;
        Ok(Self::with_locus(locus, name, distribution))
    }

    /// Declares a variable from an already-built distribution.
    pub fn from_distribution(
        internal: i64,
        name: impl Into<String>,
        distribution: Distribution,
    ) -> Result<Self, VariableError> {
        let locus = Locus::from_flag(internal)?;
        if distribution.kind().is_none() {
            return Err(SampleError::UnknownDistribution(format!("{:?}", distribution)).into());
        }
        Ok(Self::with_locus(locus, name, distribution))
    }

    /// Shorthand for a Normal(mean, std) variable.
    pub fn normal(internal: i64, name: impl Into<String>, mean: f64, std: f64) -> Result<Self, VariableError> {
        Self::from_distribution(internal, name, Distribution::normal(mean, std)?)
    }

    /// Shorthand for a variable pinned at `value`.
    pub fn fixed(internal: i64, name: impl Into<String>, value: f64) -> Result<Self, VariableError> {
        Self::from_distribution(internal, name, Distribution::fixed(value)?)
    }

    fn with_locus(locus: Locus, name: impl Into<String>, distribution: Distribution) -> Self {
        // A point mass has a value before any draw
        let current_value = match distribution {
            Distribution::Fixed { value } => Some(value),
            _ => None,
        };
        Self {
            name: name.into(),
            locus,
            distribution,
            current_value,
        }
    }

    /// Draws a new current value (Fixed variables keep their value).
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<f64, VariableError> {
        let value = self.distribution.sample(rng)?;
        self.current_value = Some(value);
        Ok(value)
    }

    /// Returns the latest sampled value.
    pub fn get_current_value(&self) -> Result<f64, VariableError> {
        self.current_value
            .ok_or_else(|| VariableError::NotSampled(self.name.clone()))
    }

    /// 1 if the current value is strictly greater than `threshold`, else 0.
    pub fn gt_indicator(&self, threshold: f64) -> Result<u8, VariableError> {
        Ok((self.get_current_value()? > threshold) as u8)
    }

    /// 1 if the current value equals `threshold`, else 0.
    pub fn eq_indicator(&self, threshold: f64) -> Result<u8, VariableError> {
        Ok((self.get_current_value()? == threshold) as u8)
    }

    /// Mean of the variable's distribution, used as the prior belief.
    pub fn prior_mean(&self) -> f64 {
        self.distribution.mean()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locus(&self) -> Locus {
        self.locus
    }

    pub fn is_internal(&self) -> bool {
        self.locus == Locus::Internal
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }
}

// Comparisons against a scalar read the current value; an unsampled
// variable compares false.
impl PartialEq<f64> for Variable {
    fn eq(&self, other: &f64) -> bool {
        self.current_value == Some(*other)
    }
}

impl PartialOrd<f64> for Variable {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.current_value?.partial_cmp(other)
    }
}

/// Variables keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableSet {
    variables: BTreeMap<String, Variable>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable under its own name, replacing any previous one.
    pub fn insert(&mut self, variable: Variable) -> Option<Variable> {
        self.variables.insert(variable.name().to_string(), variable)
    }

    /// Builder-style insert.
    pub fn with(mut self, variable: Variable) -> Self {
        self.insert(variable);
        self
    }

    pub fn get(&self, name: &str) -> Result<&Variable, VariableError> {
        self.variables
            .get(name)
            .ok_or_else(|| VariableError::Missing(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Variable, VariableError> {
        self.variables
            .get_mut(name)
            .ok_or_else(|| VariableError::Missing(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Returns a copy of `self` with every variable in `overrides` replacing
    /// the default of the same name.
    pub fn overlay(&self, overrides: &VariableSet) -> VariableSet {
        let mut merged = self.clone();
        for variable in overrides.iter() {
            merged.insert(variable.clone());
        }
        merged
    }

    /// Returns an owned copy with every variable freshly sampled.
    ///
    /// This is the per-participant snapshot: the source set is untouched.
    pub fn resampled<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<VariableSet, VariableError> {
        let mut snapshot = self.clone();
        for variable in snapshot.variables.values_mut() {
            variable.sample(rng)?;
        }
        Ok(snapshot)
    }
}

impl FromIterator<Variable> for VariableSet {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        let mut set = VariableSet::new();
        for variable in iter {
            set.insert(variable);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_internal_flag_validation() {
        assert!(Variable::normal(1, "skill", 0.0, 1.0).is_ok());
        assert!(Variable::normal(0, "luck", 0.0, 1.0).is_ok());
        assert_eq!(
            Variable::normal(2, "skill", 0.0, 1.0),
            Err(VariableError::InvalidInternalFlag(2))
        );
        assert_eq!(
            Variable::fixed(-1, "TI", 1.0),
            Err(VariableError::InvalidInternalFlag(-1))
        );
    }

    #[test]
    fn test_declaration_errors_surface_at_construction() {
        let err = Variable::new(1, "skill", "Lognormal", &[("mean", 0.0)]);
        assert!(matches!(err, Err(VariableError::Sample(SampleError::UnknownDistribution(_)))));

        let err = Variable::new(1, "skill", "Normal", &[("mean", 0.0)]);
        assert!(matches!(err, Err(VariableError::Sample(SampleError::MalformedParameters { .. }))));

        let err = Variable::from_distribution(1, "theta", Distribution::beta(1.0, 1.0).unwrap());
        assert!(matches!(err, Err(VariableError::Sample(SampleError::UnknownDistribution(_)))));
    }

    #[test]
    fn test_unsampled_value_fails() {
        let v = Variable::new(1, "skill", "Normal", &[("mean", 0.0), ("std", 1.0)]).unwrap();

        assert_eq!(v.get_current_value(), Err(VariableError::NotSampled("skill".to_string())));
        assert!(v.gt_indicator(0.0).is_err());
        assert!(!(v > 0.0));
        assert!(!(v <= 0.0));
    }

    #[test]
    fn test_comparisons_use_current_value() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut sa = Variable::fixed(0, "SA", 1.0).unwrap();
        sa.sample(&mut rng).unwrap();

        assert!(sa > 0.0);
        assert!(sa == 1.0);
        assert_eq!(sa.gt_indicator(0.0).unwrap(), 1);
        assert_eq!(sa.gt_indicator(1.0).unwrap(), 0);
        assert_eq!(sa.eq_indicator(1.0).unwrap(), 1);
    }

    #[test]
    fn test_non_fixed_sampling_varies() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let kinds = [
            Variable::new(1, "a", "Normal", &[("mean", 0.0), ("std", 1.0)]).unwrap(),
            Variable::new(1, "b", "Binomial", &[("trials", 20.0), ("prob", 0.5)]).unwrap(),
            Variable::new(1, "c", "Exponential", &[("rate", 1.0)]).unwrap(),
        ];

        for mut v in kinds {
            let draws: Vec<f64> = (0..50).map(|_| v.sample(&mut rng).unwrap()).collect();
            let mean = draws.iter().sum::<f64>() / draws.len() as f64;
            let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / draws.len() as f64;
            assert!(var > 0.0, "{} never changed", v.name());
            assert_eq!(v.get_current_value().unwrap(), *draws.last().unwrap());
        }
    }

    #[test]
    fn test_prior_mean() {
        assert_eq!(Variable::normal(1, "skill", 0.5, 1.0).unwrap().prior_mean(), 0.5);
        assert_eq!(Variable::fixed(1, "TI", 4.0).unwrap().prior_mean(), 4.0);
    }

    #[test]
    fn test_overlay_and_snapshot_isolation() {
        let defaults: VariableSet = [
            Variable::normal(1, "skill", 0.0, 1.0).unwrap(),
            Variable::fixed(1, "TI", 1.0).unwrap(),
        ]
        .into_iter()
        .collect();
        let overrides = VariableSet::new().with(Variable::fixed(1, "TI", 4.0).unwrap());

        let merged = defaults.overlay(&overrides);
        assert_eq!(merged.get("TI").unwrap().prior_mean(), 4.0);
        assert_eq!(defaults.get("TI").unwrap().prior_mean(), 1.0);

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let snapshot = merged.resampled(&mut rng).unwrap();
        assert!(snapshot.get("skill").unwrap().get_current_value().is_ok());
        // Source set was not touched
        assert!(merged.get("skill").unwrap().get_current_value().is_err());
        assert!(matches!(merged.get("luck"), Err(VariableError::Missing(_))));
    }

    proptest! {
        #[test]
        fn prop_fixed_never_changes(value in -100.0f64..100.0, seed in any::<u64>(), draws in 1usize..20) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut v = Variable::fixed(1, "x", value).unwrap();
            prop_assert_eq!(v.get_current_value().unwrap(), value);
            for _ in 0..draws {
                v.sample(&mut rng).unwrap();
                prop_assert_eq!(v.get_current_value().unwrap(), value);
            }
        }
    }
}
