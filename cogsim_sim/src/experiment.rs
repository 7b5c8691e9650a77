//! Experiment - conditions, participants and collected attribution scores.

use crate::error::SimError;
use crate::seeds::SeedProvider;
use crate::stats::ZSummary;

use cogsim_core::{Participant, PolicyBranch, Trial, Variable, VariableSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::{debug, info};

/// Experiment-level values every condition starts from.
#[derive(Debug, Clone)]
pub struct ExperimentDefaults {
    /// Default variable for every name a condition may override
    pub variables: VariableSet,

    /// Observed outcome (1.0 = success, 0.0 = failure)
    pub success: f64,

    /// Repetitions per inference pass
    pub sample_budget: usize,
}

/// One experimental arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Condition name, used as the result key
    pub name: String,

    /// Number of simulated participants
    pub participants: usize,

    /// Variables replacing the experiment defaults
    pub overrides: VariableSet,

    /// Outcome override
    pub success: Option<f64>,

    /// Sample-budget override
    pub sample_budget: Option<usize>,
}

impl Condition {
    /// Creates a condition with no overrides.
    pub fn new(name: impl Into<String>, participants: usize) -> Self {
        Self {
            name: name.into(),
            participants,
            overrides: VariableSet::new(),
            success: None,
            sample_budget: None,
        }
    }

    /// Overrides one variable.
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.overrides.insert(variable);
        self
    }

    /// Overrides the observed outcome.
    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(if success { 1.0 } else { 0.0 });
        self
    }

    /// Overrides the sample budget.
    pub fn with_sample_budget(mut self, sample_budget: usize) -> Self {
        self.sample_budget = Some(sample_budget);
        self
    }
}

/// Scores collected for one condition, in participant order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    pub name: String,
    pub scores: Vec<f64>,

    /// How often each policy branch ended a trial
    pub branch_counts: BTreeMap<String, usize>,
}

impl ConditionResult {
    /// Mean raw attribution score.
    pub fn mean_score(&self) -> Option<f64> {
        crate::stats::mean_std(&self.scores).map(|(m, _)| m)
    }

    /// Count for one branch.
    pub fn branch_count(&self, branch: PolicyBranch) -> usize {
        self.branch_counts.get(branch.name()).copied().unwrap_or(0)
    }
}

/// Results of one experiment run, conditions in registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResults {
    pub experiment: String,
    pub seed: u64,
    pub conditions: Vec<ConditionResult>,
}

impl ExperimentResults {
    /// Looks up a condition by name.
    pub fn condition(&self, name: &str) -> Option<&ConditionResult> {
        self.conditions.iter().find(|c| c.name == name)
    }

    /// Pooled z-score summary across all conditions.
    pub fn z_summary(&self) -> Result<ZSummary, SimError> {
        ZSummary::from_groups(
            self.conditions
                .iter()
                .map(|c| (c.name.as_str(), c.scores.as_slice())),
        )
        .ok_or_else(|| SimError::EmptyResults(self.experiment.clone()))
    }
}

/// A simulated experiment.
#[derive(Debug, Clone)]
pub struct Experiment {
    name: String,
    participant: Participant,
    defaults: ExperimentDefaults,
    conditions: Vec<Condition>,
}

impl Experiment {
    /// Creates an experiment with no conditions.
    pub fn new(name: impl Into<String>, participant: Participant, defaults: ExperimentDefaults) -> Self {
        Self {
            name: name.into(),
            participant,
            defaults,
            conditions: Vec::new(),
        }
    }

    /// Registers a condition; conditions run in registration order.
    pub fn register_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn defaults(&self) -> &ExperimentDefaults {
        &self.defaults
    }

    /// Caps the participant count of every condition.
    pub fn set_participants(&mut self, participants: usize) {
        for condition in &mut self.conditions {
            condition.participants = participants;
        }
    }

    /// Sets the default sample budget and drops per-condition overrides.
    pub fn set_sample_budget(&mut self, sample_budget: usize) {
        self.defaults.sample_budget = sample_budget;
        for condition in &mut self.conditions {
            condition.sample_budget = None;
        }
    }

    /// Runs every condition and collects one attribution score per participant.
    ///
    /// Each participant gets its own RNG and its own resampled copy of the
    /// condition's variables, so results depend only on `seed`.
    pub fn run(&self, seed: u64) -> Result<ExperimentResults, SimError> {
        info!("Experiment {} starts (seed={})", self.name, seed);
        let seeds = SeedProvider::new(seed);
        let mut conditions = Vec::with_capacity(self.conditions.len());

        for (index, condition) in self.conditions.iter().enumerate() {
            let variables = self.defaults.variables.overlay(&condition.overrides);
            let success = condition.success.unwrap_or(self.defaults.success);
            let sample_budget = condition.sample_budget.unwrap_or(self.defaults.sample_budget);

            let mut result = ConditionResult {
                name: condition.name.clone(),
                ..Default::default()
            };

            for participant in 0..condition.participants {
                let mut rng = seeds.participant_rng(index, participant);
                let mut trial = Trial {
                    variables: variables.resampled(&mut rng)?,
                    success,
                    sample_budget,
                };
                let attribution = self
                    .participant
                    .attribute(&mut trial, &mut rng)
                    .map_err(|e| SimError::attribution(&condition.name, participant, e))?;

                debug!(
                    "  {} #{}: score={:.4} branch={}",
                    condition.name, participant, attribution.score, attribution.branch
                );
                result.scores.push(attribution.score);
                *result
                    .branch_counts
                    .entry(attribution.branch.name().to_string())
                    .or_insert(0) += 1;
            }

            info!(
                "Condition {}: {} participants, mean score {:.4}",
                condition.name,
                result.scores.len(),
                result.mean_score().unwrap_or(f64::NAN)
            );
            conditions.push(result);
        }

        Ok(ExperimentResults {
            experiment: self.name.clone(),
            seed,
            conditions,
        })
    }

    /// Human-readable description of the experiment and its conditions.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Experiment name: {}", self.name);
        let _ = writeln!(out, "Number of conditions: {}", self.conditions.len());
        let _ = writeln!(out, "The conditions are as follows");
        for (i, condition) in self.conditions.iter().enumerate() {
            let _ = writeln!(out, "Condition: {}", i);
            let _ = writeln!(out, "  name: {}", condition.name);
            let _ = writeln!(out, "  N: {}", condition.participants);
            if let Some(success) = condition.success {
                let _ = writeln!(out, "  success: {}", success);
            }
            if let Some(budget) = condition.sample_budget {
                let _ = writeln!(out, "  L: {}", budget);
            }
            for variable in condition.overrides.iter() {
                let _ = writeln!(out, "  {}: {:?}", variable.name(), variable.distribution());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::{default_defaults, default_participant};

    fn fixed_experiment() -> Experiment {
        let mut defaults = default_defaults(100).unwrap();
        for (flag, name) in [(1, "skill"), (1, "effort"), (0, "external"), (0, "luck")] {
            defaults.variables.insert(Variable::fixed(flag, name, 0.0).unwrap());
        }
        defaults.variables.insert(Variable::fixed(1, "TI", 1.0).unwrap());
        defaults.variables.insert(Variable::fixed(0, "SA", -1.0).unwrap());

        let mut experiment = Experiment::new("all fixed", default_participant(), defaults);
        experiment.register_condition(Condition::new("only", 10));
        experiment
    }

    #[test]
    fn test_all_fixed_scores_identical() {
        let results = fixed_experiment().run(42).unwrap();
        let scores = &results.condition("only").unwrap().scores;

        assert_eq!(scores.len(), 10);
        assert!(scores.iter().all(|s| *s == scores[0]));
        assert_eq!(results.conditions[0].branch_count(PolicyBranch::LowSelfAwareness), 10);
    }

    #[test]
    fn test_run_is_deterministic_per_seed() {
        let mut experiment = Experiment::new("det", default_participant(), default_defaults(30).unwrap());
        experiment.register_condition(Condition::new("a", 5));
        experiment.register_condition(Condition::new("b", 5).with_success(true));

        let r1 = experiment.run(7).unwrap();
        let r2 = experiment.run(7).unwrap();
        assert_eq!(r1, r2);
        assert_eq!(r1.conditions.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_defaults_untouched_by_run() {
        let experiment = fixed_experiment();
        let before = experiment.defaults().variables.clone();
        experiment.run(1).unwrap();
        assert_eq!(experiment.defaults().variables, before);
    }

    #[test]
    fn test_zero_budget_condition_surfaces_error() {
        let mut experiment = fixed_experiment();
        experiment.register_condition(Condition::new("broken", 1).with_sample_budget(0));

        let err = experiment.run(3).unwrap_err();
        assert!(matches!(err, SimError::Attribution { ref condition, participant: 0, .. } if condition == "broken"));
    }

    #[test]
    fn test_empty_results_summary_fails() {
        let mut experiment = fixed_experiment();
        experiment.set_participants(0);
        let results = experiment.run(3).unwrap();
        assert!(matches!(results.z_summary(), Err(SimError::EmptyResults(_))));
    }

    #[test]
    fn test_summary_lists_conditions() {
        let mut experiment = fixed_experiment();
        experiment.register_condition(
            Condition::new("load", 3).with_variable(Variable::fixed(0, "SA", 0.0).unwrap()),
        );
        let text = experiment.summary();
        assert!(text.contains("Number of conditions: 2"));
        assert!(text.contains("load"));
        assert!(text.contains("SA"));
    }
}
