//! Error types for variables, inference and the attribution policy.

use cogsim_env::SampleError;
use thiserror::Error;

/// Errors raised while declaring or sampling a participant variable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VariableError {
    /// `internal` flag was not 0 or 1
    #[error("Internal flag must be 0 or 1, got {0}")]
    InvalidInternalFlag(i64),

    /// Value requested before the first sample
    #[error("Variable `{0}` has not been sampled yet")]
    NotSampled(String),

    /// Variable name not present in the set
    #[error("Unknown variable: {0}")]
    Missing(String),

    /// Distribution construction or draw failed
    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Errors raised by the likelihood-weighting engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// Sample budget must be at least one repetition
    #[error("Sample budget must be positive, got {0}")]
    InvalidSampleBudget(usize),

    /// An observation key never matched a named draw in the model
    #[error("Observation `{0}` does not match any sample site in the model")]
    UnresolvedObservation(String),

    /// Every repetition was assigned zero (or non-finite) likelihood
    #[error("Total importance weight is degenerate: {0}")]
    ZeroWeight(String),

    /// No statistic functions were registered
    #[error("No statistics registered for estimation")]
    NoStatistics,

    /// Model execution failed
    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Errors raised while running the attribution procedure for one trial.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// Posterior lacks the estimate the policy needs
    #[error("Missing estimate `{statistic}` for `{latent}`")]
    MissingEstimate { latent: String, statistic: String },

    /// Policy produced NaN or an infinite score
    #[error("Attribution score is not finite: {0}")]
    NonFiniteScore(f64),

    #[error(transparent)]
    Variable(#[from] VariableError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Sample(#[from] SampleError),
}

impl PolicyError {
    /// Creates a missing-estimate error.
    pub fn missing_estimate(latent: impl Into<String>, statistic: impl Into<String>) -> Self {
        Self::MissingEstimate {
            latent: latent.into(),
            statistic: statistic.into(),
        }
    }
}
