//! cogsim Core: a process model of the self-serving attribution bias.
//!
//! Synthetic participants observe a success or failure produced by their
//! intuitive theory of performance, explain it with approximate Bayesian
//! inference, and report how much they attribute it to themselves.
//!
//! # Modules
//!
//! - [`variable`]: named random quantities and per-participant snapshots
//! - [`model`]: the intuitive theory as a generative process over named draws
//! - [`inference`]: Likelihood-Weighting (self-normalized importance sampling)
//! - [`participant`]: the branching attribution policy

pub mod error;
pub mod variable;
pub mod model;
pub mod inference;
pub mod participant;

pub use error::{InferenceError, PolicyError, VariableError};
pub use variable::{Locus, Variable, VariableSet};
pub use model::{sigmoid, GenerativeProcess, IntuitiveTheory, SelfWorthModel, SELF_WORTH_SITE, SUCCESS_SITE};
pub use inference::{
    aggregate, EstimateSet, LikelihoodWeighting, Observations, Particle, Posterior, StatisticSet,
    WeightingContext, MEAN, SECOND_MOMENT,
};
pub use participant::{Attribution, Participant, ParticipantProfile, PolicyBranch, Trial};
