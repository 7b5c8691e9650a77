//! Error types for the cogsim sampling layer.

use thiserror::Error;

/// Errors that can occur while building distributions or running named draws.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    /// A distribution parameter is outside its valid range
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Distribution kind name is not one of the supported kinds
    #[error("Unknown distribution kind: {0}")]
    UnknownDistribution(String),

    /// Parameter list does not match the kind's constructor signature
    #[error("Malformed parameters for {kind}: {reason}")]
    MalformedParameters { kind: String, reason: String },

    /// The same site name was drawn twice within one model execution
    #[error("Duplicate sample site: {0}")]
    DuplicateSite(String),

    /// A sample set was queried for a site the model never produced
    #[error("Missing sample site: {0}")]
    MissingSite(String),
}

impl SampleError {
    /// Creates an invalid-parameter error.
    pub fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter { name, value, reason }
    }

    /// Creates a malformed-parameters error.
    pub fn malformed(kind: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::MalformedParameters {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }
}
