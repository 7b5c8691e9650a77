//! Error types for experiment running, export and interactive setup.

use cogsim_core::{PolicyError, VariableError};
use thiserror::Error;

/// Errors that can occur while building, running or exporting an experiment.
#[derive(Debug, Error)]
pub enum SimError {
    /// A participant's attribution procedure failed
    #[error("Attribution failed in condition `{condition}` (participant {participant}): {source}")]
    Attribution {
        condition: String,
        participant: usize,
        #[source]
        source: PolicyError,
    },

    /// Variable declaration or snapshot failed
    #[error(transparent)]
    Variable(#[from] VariableError),

    /// Summary requested with no scores collected
    #[error("No attribution scores collected for experiment `{0}`")]
    EmptyResults(String),

    /// Experiment id did not parse
    #[error("Unknown experiment: {0}")]
    UnknownExperiment(String),

    /// Operator input rejected by the condition builder
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while reading operator input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// Text did not parse as an integer
    #[error("The value you entered is not an integer: {0:?}")]
    InvalidInteger(String),

    /// Integer outside the accepted range
    #[error("The value you entered is not between {min}-{max}: {value}")]
    OutOfRange { value: i64, min: i64, max: i64 },

    /// Variable name not in the library
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Level was not one of the accepted answers
    #[error("{level:?} is not a valid entry for {variable}")]
    InvalidLevel { variable: String, level: String },

    /// Input closed before the session finished
    #[error("Input ended before the experiment was complete")]
    EndOfInput,
}

impl SimError {
    /// Wraps a policy error with the trial it happened in.
    pub fn attribution(condition: impl Into<String>, participant: usize, source: PolicyError) -> Self {
        Self::Attribution {
            condition: condition.into(),
            participant,
            source,
        }
    }
}
