//! Experiment harness for the self-serving bias simulator.
//!
//! Conditions override an experiment's default variables; every simulated
//! participant gets its own resampled copy of those variables and its own
//! RNG stream, runs the attribution procedure from `cogsim_core` once, and
//! contributes one score. Scores are pooled, z-transformed and reported per
//! condition.
//!
//! ```text
//! ExperimentId / interactive builder
//!            │
//!            ▼
//!   Experiment ──run(seed)──► ExperimentResults ──► ZSummary
//!   (conditions)  │                                    │
//!                 │ SeedProvider: one ChaCha stream    ▼
//!                 │ per (condition, participant)   exporter: SVG + JSON
//!                 ▼
//!   Participant::attribute (cogsim_core)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cogsim_sim::{ExperimentId, ExperimentRunner, RunConfig};
//!
//! let runner = ExperimentRunner::new(RunConfig::default().with_seed(42));
//! let report = runner.run(ExperimentId::CognitiveLoad.build()?)?;
//! println!("{:?}", report.summary);
//! ```

mod error;
mod seeds;
mod stats;
mod experiment;
mod library;
mod runner;
pub mod exporter;
pub mod interactive;
pub mod scenarios;

pub use error::{InputError, SimError};
pub use seeds::SeedProvider;
pub use stats::{mean_std, z_transform, ConditionSummary, ZSummary};
pub use experiment::{Condition, ConditionResult, Experiment, ExperimentDefaults, ExperimentResults};
pub use library::{Level, VariableLibrary};
pub use runner::{ExperimentReport, ExperimentRunner, RunConfig};
pub use exporter::ResultsExport;
pub use scenarios::ExperimentId;
