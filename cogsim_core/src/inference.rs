//! Likelihood-Weighting inference.
//!
//! Estimates posterior expectations `E[f(X) | Y = y]` for an arbitrary
//! generative process `p(X, Y)` by self-normalized importance sampling with
//! the prior as proposal:
//!
//! ```text
//! for l in 1..=L:
//!     run the model; observed sites are forced to y, others drawn from the prior
//!     log w_l = Σ log p(y_i | parents)        (observed sites only)
//! w̃_l  = exp(log w_l - max log w) / Σ exp(log w_k - max log w)
//! E[f(X)] ≈ Σ w̃_l · f(x_l)
//! ```
//!
//! Each repetition is independent and produces a [`Particle`]; aggregation
//! is a pure reduction over the particles.

use crate::error::InferenceError;
use crate::model::GenerativeProcess;
use cogsim_env::{Distribution, SampleContext, SampleError, SampleSet};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Observed site values, keyed by site name.
pub type Observations = BTreeMap<String, f64>;

/// Latent name → statistic name → posterior expectation.
pub type EstimateSet = BTreeMap<String, BTreeMap<String, f64>>;

/// A scalar function whose posterior expectation is wanted.
pub type StatisticFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Name of the identity statistic.
pub const MEAN: &str = "mean";

/// Name of the square statistic.
pub const SECOND_MOMENT: &str = "2ndMoment";

/// Registered statistic functions, keyed by name.
#[derive(Clone, Default)]
pub struct StatisticSet {
    functions: BTreeMap<String, StatisticFn>,
}

impl StatisticSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{"mean": x, "2ndMoment": x²}`
    pub fn moments() -> Self {
        Self::new()
            .with(MEAN, |x| x)
            .with(SECOND_MOMENT, |x| x * x)
    }

    /// Registers a statistic, replacing any previous one of the same name.
    pub fn with<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(f));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &StatisticFn)> {
        self.functions.iter().map(|(k, f)| (k.as_str(), f))
    }
}

impl fmt::Debug for StatisticSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}

/// Context that conditions observed sites and records everything else.
pub struct WeightingContext<'a, R: Rng + ?Sized> {
    observations: &'a Observations,
    rng: &'a mut R,
    log_weight: f64,
    recorded: SampleSet,
    conditioned: BTreeSet<String>,
}

impl<'a, R: Rng + ?Sized> WeightingContext<'a, R> {
    pub fn new(observations: &'a Observations, rng: &'a mut R) -> Self {
        Self {
            observations,
            rng,
            log_weight: 0.0,
            recorded: SampleSet::new(),
            conditioned: BTreeSet::new(),
        }
    }

    /// Sites that were forced to an observed value during this run.
    pub fn conditioned(&self) -> &BTreeSet<String> {
        &self.conditioned
    }

    /// Finishes the run.
    pub fn into_particle(self) -> (Particle, BTreeSet<String>) {
        (
            Particle {
                log_weight: self.log_weight,
                values: self.recorded,
            },
            self.conditioned,
        )
    }
}

impl<R: Rng + ?Sized> SampleContext for WeightingContext<'_, R> {
    fn sample(&mut self, name: &str, dist: &Distribution) -> Result<f64, SampleError> {
        if self.recorded.contains(name) || self.conditioned.contains(name) {
            return Err(SampleError::DuplicateSite(name.to_string()));
        }
        match self.observations.get(name) {
            Some(&observed) => {
                self.log_weight += dist.log_prob(observed);
                self.conditioned.insert(name.to_string());
                Ok(observed)
            }
            None => {
                let value = dist.sample(&mut *self.rng)?;
                self.recorded.insert(name, value);
                Ok(value)
            }
        }
    }
}

/// One importance-sampling repetition.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Sum of log-likelihoods of the observed sites
    pub log_weight: f64,

    /// Realized values of every unobserved site
    pub values: SampleSet,
}

/// Result of one inference call.
#[derive(Debug, Clone)]
pub struct Posterior {
    estimates: EstimateSet,
    weights: Vec<f64>,
    log_weight_sum: f64,
}

impl Posterior {
    /// Estimated expectation of `statistic` for `latent`.
    pub fn estimate(&self, latent: &str, statistic: &str) -> Option<f64> {
        self.estimates.get(latent)?.get(statistic).copied()
    }

    /// Shorthand for the `"mean"` estimate.
    pub fn mean(&self, latent: &str) -> Option<f64> {
        self.estimate(latent, MEAN)
    }

    pub fn estimates(&self) -> &EstimateSet {
        &self.estimates
    }

    /// Normalized importance weights, one per repetition.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of the unnormalized linear-space weights.
    ///
    /// May underflow to 0 for very unlikely observations even though the
    /// normalized estimates are fine; use [`Self::log_weight_sum`] then.
    pub fn weight_sum(&self) -> f64 {
        self.log_weight_sum.exp()
    }

    /// Log of the sum of unnormalized weights.
    pub fn log_weight_sum(&self) -> f64 {
        self.log_weight_sum
    }

    /// Kish effective sample size `1 / Σ w̃²`.
    pub fn effective_sample_size(&self) -> f64 {
        1.0 / self.weights.iter().map(|w| w * w).sum::<f64>()
    }
}

/// Reduces a batch of particles into a posterior.
///
/// Order-independent: shuffling `particles` changes the result only by
/// floating-point rounding.
pub fn aggregate(particles: &[Particle], statistics: &StatisticSet) -> Result<Posterior, InferenceError> {
    if particles.is_empty() {
        return Err(InferenceError::InvalidSampleBudget(0));
    }
    if particles.iter().any(|p| p.log_weight.is_nan()) {
        return Err(InferenceError::ZeroWeight("a repetition has NaN log weight".to_string()));
    }

    let max_log = particles
        .iter()
        .map(|p| p.log_weight)
        .fold(f64::NEG_INFINITY, f64::max);
    if !max_log.is_finite() {
        return Err(InferenceError::ZeroWeight(format!(
            "all {} repetitions have log weight {}",
            particles.len(),
            max_log
        )));
    }

    let linear: Vec<f64> = particles.iter().map(|p| (p.log_weight - max_log).exp()).collect();
    let total: f64 = linear.iter().sum();
    let weights: Vec<f64> = linear.iter().map(|w| w / total).collect();

    let mut estimates = EstimateSet::new();
    for (particle, weight) in particles.iter().zip(&weights) {
        for (latent, value) in particle.values.iter() {
            let entry = estimates.entry(latent.to_string()).or_default();
            for (name, f) in statistics.iter() {
                *entry.entry(name.to_string()).or_insert(0.0) += weight * (**f)(value);
            }
        }
    }

    Ok(Posterior {
        estimates,
        weights,
        log_weight_sum: max_log + total.ln(),
    })
}

/// Likelihood-Weighting estimator for a fixed set of statistics.
#[derive(Debug, Clone)]
pub struct LikelihoodWeighting {
    statistics: StatisticSet,
}

impl LikelihoodWeighting {
    pub fn new(statistics: StatisticSet) -> Self {
        Self { statistics }
    }

    pub fn statistics(&self) -> &StatisticSet {
        &self.statistics
    }

    /// Runs `sample_budget` weighted repetitions of `model` and aggregates them.
    ///
    /// # Arguments
    /// * `model` - generative process (its arguments are captured by the value)
    /// * `sample_budget` - number of repetitions `L`
    /// * `observations` - site name → observed value
    /// * `rng` - randomness for the unobserved sites
    ///
    /// # Errors
    /// Fails if `L == 0`, if no statistics are registered, if an observation
    /// names a site the model never draws, or if every repetition has zero
    /// weight.
    pub fn infer<M, R>(
        &self,
        model: &M,
        sample_budget: usize,
        observations: &Observations,
        rng: &mut R,
    ) -> Result<Posterior, InferenceError>
    where
        M: GenerativeProcess + ?Sized,
        R: Rng + ?Sized,
    {
        if sample_budget == 0 {
            return Err(InferenceError::InvalidSampleBudget(sample_budget));
        }
        if self.statistics.is_empty() {
            return Err(InferenceError::NoStatistics);
        }

        let mut particles = Vec::with_capacity(sample_budget);
        let mut resolved = BTreeSet::new();
        for _ in 0..sample_budget {
            let mut ctx = WeightingContext::new(observations, &mut *rng);
            model.run(&mut ctx)?;
            let (particle, conditioned) = ctx.into_particle();
            resolved.extend(conditioned);
            particles.push(particle);
        }

        if let Some(missing) = observations.keys().find(|k| !resolved.contains(*k)) {
            return Err(InferenceError::UnresolvedObservation(missing.clone()));
        }

        let posterior = aggregate(&particles, &self.statistics)?;
        debug!(
            "LW: L={} observed={} log_weight_sum={:.4} ess={:.1}",
            sample_budget,
            observations.len(),
            posterior.log_weight_sum(),
            posterior.effective_sample_size()
        );
        Ok(posterior)
    }
}
