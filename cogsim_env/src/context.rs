//! Core sampling context trait for generative processes.

use crate::distribution::Distribution;
use crate::error::SampleError;

/// The central interface between a generative process and whoever runs it.
///
/// A generative process never touches an RNG directly. Every random quantity
/// is requested through [`SampleContext::sample`] under a unique site name, and
/// the context decides what value comes back.
///
/// # Implementations
///
/// - **Forward**: `ForwardSampler` - draws every site from its prior
/// - **Weighting**: `cogsim_core::inference::WeightingContext` - forces observed
///   sites to their recorded values and accumulates their log-likelihood
///
/// # Determinism
///
/// All randomness comes from the RNG owned by the implementation, so a model
/// run is reproducible from that RNG's seed.
pub trait SampleContext {
    /// Draws (or substitutes) the value of the named site.
    ///
    /// Site names must be unique within one model execution; implementations
    /// return [`SampleError::DuplicateSite`] on reuse.
    fn sample(&mut self, name: &str, dist: &Distribution) -> Result<f64, SampleError>;
}

impl<C: SampleContext + ?Sized> SampleContext for &mut C {
    fn sample(&mut self, name: &str, dist: &Distribution) -> Result<f64, SampleError> {
        (**self).sample(name, dist)
    }
}
