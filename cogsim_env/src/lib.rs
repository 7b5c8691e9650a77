//! cogsim Sampling Abstraction Layer
//!
//! This crate provides the "effect handler" abstraction that lets a
//! generative process run unchanged under different sampling strategies.
//!
//! # Core Concept: Named Draws
//!
//! A generative process requests every random quantity from a
//! [`SampleContext`] under a unique site name:
//! - **Forward**: the context draws from the prior and records the value
//! - **Conditioned**: the context substitutes an observed value and reports
//!   its log-probability instead of drawing
//!
//! Because the model never owns an RNG, the same function serves prior
//! simulation and likelihood-weighted inference, and every run is
//! reproducible from the context's seed.
//!
//! # Example
//!
//! ```ignore
//! use cogsim_env::{Distribution, SampleContext, SampleError, SampleSet};
//!
//! fn coin(ctx: &mut dyn SampleContext) -> Result<SampleSet, SampleError> {
//!     let bias = ctx.sample("bias", &Distribution::beta(2.0, 2.0)?)?;
//!     let flip = ctx.sample("flip", &Distribution::bernoulli(bias)?)?;
//!     Ok([("bias", bias), ("flip", flip)].into_iter().collect())
//! }
//! ```

mod context;
mod distribution;
mod types;
mod error;
mod forward;

pub use context::SampleContext;
pub use distribution::{Distribution, DistributionKind, ln_gamma};
pub use types::SampleSet;
pub use error::SampleError;
pub use forward::ForwardSampler;
