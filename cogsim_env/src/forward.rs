//! Forward (prior) implementation of SampleContext.

use crate::{Distribution, SampleContext, SampleError, SampleSet};
use rand::Rng;

/// Context that draws every site from its prior.
///
/// This is the "plain" way to run a generative process: nothing is
/// conditioned, every draw is recorded along with the joint log-probability
/// of the run.
pub struct ForwardSampler<R: Rng> {
    /// Randomness source for every draw
    rng: R,

    /// Values drawn so far in this run
    trace: SampleSet,

    /// Sum of log-probabilities of all draws
    log_joint: f64,
}

impl<R: Rng> ForwardSampler<R> {
    /// Creates a new forward sampler around an RNG.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            trace: SampleSet::new(),
            log_joint: 0.0,
        }
    }

    /// Returns the values drawn so far.
    pub fn trace(&self) -> &SampleSet {
        &self.trace
    }

    /// Returns the joint log-probability of the values drawn so far.
    pub fn log_joint(&self) -> f64 {
        self.log_joint
    }

    /// Clears the trace so the sampler can run the model again.
    pub fn reset(&mut self) {
        self.trace = SampleSet::new();
        self.log_joint = 0.0;
    }
}

impl<R: Rng> SampleContext for ForwardSampler<R> {
    fn sample(&mut self, name: &str, dist: &Distribution) -> Result<f64, SampleError> {
        if self.trace.contains(name) {
            return Err(SampleError::DuplicateSite(name.to_string()));
        }
        let value = dist.sample(&mut self.rng)?;
        self.log_joint += dist.log_prob(value);
        self.trace.insert(name, value);
        Ok(value)
    }
}
