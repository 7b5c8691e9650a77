//! Experiment runner - runs experiments, summarizes and exports them.

use crate::error::SimError;
use crate::experiment::{Experiment, ExperimentResults};
use crate::exporter::{output_path, write_svg, ResultsExport};
use crate::stats::ZSummary;

use std::path::PathBuf;
use tracing::{info, warn};

/// Run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Master seed
    pub seed: u64,

    /// Overrides every condition's sample budget
    pub sample_budget: Option<usize>,

    /// Overrides every condition's participant count
    pub participants: Option<usize>,

    /// Directory for chart and JSON output; `None` disables export
    pub output_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            sample_budget: None,
            participants: None,
            output_dir: Some(PathBuf::from("plots")),
        }
    }
}

impl RunConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sample_budget(mut self, sample_budget: usize) -> Self {
        self.sample_budget = Some(sample_budget);
        self
    }

    pub fn with_participants(mut self, participants: usize) -> Self {
        self.participants = Some(participants);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Keeps results in memory only.
    pub fn without_export(mut self) -> Self {
        self.output_dir = None;
        self
    }
}

/// Outcome of one experiment run.
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    pub results: ExperimentResults,
    pub summary: ZSummary,

    /// Files written, chart first
    pub files: Vec<PathBuf>,
}

/// Runs experiments under one configuration.
pub struct ExperimentRunner {
    config: RunConfig,
}

impl ExperimentRunner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Applies overrides, runs, summarizes and optionally exports.
    pub fn run(&self, mut experiment: Experiment) -> Result<ExperimentReport, SimError> {
        if let Some(participants) = self.config.participants {
            experiment.set_participants(participants);
        }
        if let Some(sample_budget) = self.config.sample_budget {
            experiment.set_sample_budget(sample_budget);
        }

        let results = experiment.run(self.config.seed)?;
        let summary = results.z_summary()?;
        for c in &summary.conditions {
            info!(
                "  {:<20} N={:<4} mean z={:+.3} ± {:.3}",
                c.name, c.participants, c.mean_z, c.sem_z
            );
        }
        if summary.pooled_std == 0.0 {
            warn!("All scores in {} are identical; z-scores are zero", results.experiment);
        }

        let files = match &self.config.output_dir {
            Some(dir) => self.export(dir, &results, &summary)?,
            None => Vec::new(),
        };

        Ok(ExperimentReport {
            results,
            summary,
            files,
        })
    }

    fn export(
        &self,
        dir: &std::path::Path,
        results: &ExperimentResults,
        summary: &ZSummary,
    ) -> Result<Vec<PathBuf>, SimError> {
        std::fs::create_dir_all(dir)?;

        let chart = output_path(dir, &results.experiment, "svg");
        write_svg(&chart, &results.experiment, summary)?;

        let json = output_path(dir, &results.experiment, "json");
        ResultsExport::new(results, summary).write_to_file(&json)?;

        info!("Exported {} and {}", chart.display(), json.display());
        Ok(vec![chart, json])
    }
}
