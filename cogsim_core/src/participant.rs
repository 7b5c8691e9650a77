//! Participant - the process model of the self-serving bias.
//!
//! One call to [`Participant::attribute`] simulates one trial:
//!
//! ```text
//! observe outcome ──► automatic inference (external causes held fixed)
//!                          │
//!                  self-awareness > 0 ?
//!                  ├─ no  ─► attribution on automatic inference      (LowSelfAwareness)
//!                  └─ yes ─► discrepancy d = relevance · Σ(post - prior) over self-concept
//!                             ├─ d ≥ 0 ─► attribution, internal weight 1 + d (FavorableDiscrepancy)
//!                             └─ d < 0 ─► probability of improvement > 0 ?
//!                                         ├─ yes ─► attribution on automatic inference (ImprovementExpected)
//!                                         └─ no  ─► inference with self-worth held fixed,
//!                                                   internal - (1 + |d|) · external    (SelfWorthProtection)
//! ```

use crate::error::PolicyError;
use crate::inference::{LikelihoodWeighting, Observations, Posterior, StatisticSet, MEAN};
use crate::model::{IntuitiveTheory, SelfWorthModel, SELF_WORTH_SITE, SUCCESS_SITE};
use crate::variable::{Variable, VariableSet};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Which variables play which role in the attribution procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    /// Variables that make up the self-concept
    pub self_concept: Vec<String>,

    /// Variables whose current values sum to the task relevance
    pub relevance: Vec<String>,

    /// Latent causes of the intuitive theory, in draw order
    pub theory: Vec<String>,

    /// Self-awareness gate
    pub self_awareness: String,

    /// Probability-of-improvement gate
    pub improvement: String,
}

impl Default for ParticipantProfile {
    fn default() -> Self {
        Self {
            self_concept: vec!["skill".into(), "effort".into()],
            relevance: vec!["TI".into()],
            theory: vec!["skill".into(), "effort".into(), "external".into(), "luck".into()],
            self_awareness: "SA".into(),
            improvement: "PI".into(),
        }
    }
}

/// Everything one simulated participant sees on one trial.
///
/// The variables are the participant's own resampled copy; the policy
/// resamples the gate variables in place.
#[derive(Debug, Clone)]
pub struct Trial {
    /// Resampled snapshot of the condition's variables
    pub variables: VariableSet,

    /// Observed outcome (1.0 = success, 0.0 = failure)
    pub success: f64,

    /// Repetitions per inference pass
    pub sample_budget: usize,
}

/// Terminal branch of the attribution procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PolicyBranch {
    LowSelfAwareness,
    FavorableDiscrepancy,
    ImprovementExpected,
    SelfWorthProtection,
}

impl PolicyBranch {
    pub fn all() -> Vec<PolicyBranch> {
        vec![
            PolicyBranch::LowSelfAwareness,
            PolicyBranch::FavorableDiscrepancy,
            PolicyBranch::ImprovementExpected,
            PolicyBranch::SelfWorthProtection,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            PolicyBranch::LowSelfAwareness => "low_self_awareness",
            PolicyBranch::FavorableDiscrepancy => "favorable_discrepancy",
            PolicyBranch::ImprovementExpected => "improvement_expected",
            PolicyBranch::SelfWorthProtection => "self_worth_protection",
        }
    }
}

impl std::fmt::Display for PolicyBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// How strongly the outcome is attributed internally
    pub score: f64,

    /// Branch that produced the score
    pub branch: PolicyBranch,

    /// Relevance-scaled self-concept discrepancy, when it was computed
    pub discrepancy: Option<f64>,
}

/// A simulated participant.
#[derive(Debug, Clone)]
pub struct Participant {
    profile: ParticipantProfile,
    engine: LikelihoodWeighting,
}

impl Participant {
    pub fn new(profile: ParticipantProfile, statistics: StatisticSet) -> Self {
        Self {
            profile,
            engine: LikelihoodWeighting::new(statistics),
        }
    }

    pub fn profile(&self) -> &ParticipantProfile {
        &self.profile
    }

    /// Runs the attribution procedure for one trial.
    pub fn attribute<R: Rng + ?Sized>(&self, trial: &mut Trial, rng: &mut R) -> Result<Attribution, PolicyError> {
        if !self.engine.statistics().contains(MEAN) {
            return Err(PolicyError::missing_estimate("*", MEAN));
        }

        // Step 1: observe the outcome
        let mut observations = Observations::new();
        observations.insert(SUCCESS_SITE.to_string(), trial.success);

        // Step 2: automatic inference, external causes held at their current values
        let latents = self.latents(&trial.variables)?;
        let prior: BTreeMap<String, f64> = latents
            .iter()
            .map(|v| (v.name().to_string(), v.prior_mean()))
            .collect();
        for latent in latents.iter().filter(|v| !v.is_internal()) {
            observations.insert(latent.name().to_string(), latent.get_current_value()?);
        }

        let theory = IntuitiveTheory::from_latents(latents);
        let automatic = self
            .engine
            .infer(&theory, trial.sample_budget, &observations, rng)?;

        // Step 3: self-awareness gate
        let self_awareness = trial.variables.get_mut(&self.profile.self_awareness)?;
        self_awareness.sample(rng)?;
        if !(*self_awareness > 0.0) {
            let score = self.internal_shift(theory.latents(), &prior, &automatic)?;
            return finish(score, PolicyBranch::LowSelfAwareness, None);
        }

        // Step 4: discrepancy between inferred and believed self-concept
        let mut discrepancy = 0.0;
        for name in &self.profile.self_concept {
            discrepancy += posterior_mean(&automatic, name)? - trial.variables.get(name)?.prior_mean();
        }
        let mut relevance = 0.0;
        for name in &self.profile.relevance {
            relevance += trial.variables.get(name)?.get_current_value()?;
        }
        let discrepancy = relevance * discrepancy;

        // Step 5: favorable outcome for the self-concept
        if discrepancy >= 0.0 {
            let score = (1.0 + discrepancy) * self.internal_shift(theory.latents(), &prior, &automatic)?;
            return finish(score, PolicyBranch::FavorableDiscrepancy, Some(discrepancy));
        }

        // Step 6: probability-of-improvement gate
        let improvement = trial.variables.get_mut(&self.profile.improvement)?;
        improvement.sample(rng)?;
        if *improvement > 0.0 {
            let score = self.internal_shift(theory.latents(), &prior, &automatic)?;
            return finish(score, PolicyBranch::ImprovementExpected, Some(discrepancy));
        }

        // Step 7: protect self-worth by conditioning on its pre-event value
        let mut self_worth = 0.0;
        for name in &self.profile.self_concept {
            self_worth += trial.variables.get(name)?.prior_mean();
        }
        let model = SelfWorthModel::new(&theory, &self.profile.self_concept);
        let mut observations = Observations::new();
        observations.insert(SUCCESS_SITE.to_string(), trial.success);
        observations.insert(SELF_WORTH_SITE.to_string(), self_worth);
        let protected = self
            .engine
            .infer(&model, trial.sample_budget, &observations, rng)?;

        let alpha = 1.0;
        let beta = 1.0 + discrepancy.abs();
        let internal = self.internal_shift(theory.latents(), &prior, &protected)?;
        let external = self.external_shift(theory.latents(), &prior, &protected)?;
        finish(alpha * internal - beta * external, PolicyBranch::SelfWorthProtection, Some(discrepancy))
    }

    fn latents(&self, variables: &VariableSet) -> Result<Vec<Variable>, PolicyError> {
        self.profile
            .theory
            .iter()
            .map(|name| Ok(variables.get(name)?.clone()))
            .collect()
    }

    fn internal_shift(
        &self,
        latents: &[Variable],
        prior: &BTreeMap<String, f64>,
        posterior: &Posterior,
    ) -> Result<f64, PolicyError> {
        belief_shift(latents.iter().filter(|v| v.is_internal()), prior, posterior)
    }

    fn external_shift(
        &self,
        latents: &[Variable],
        prior: &BTreeMap<String, f64>,
        posterior: &Posterior,
    ) -> Result<f64, PolicyError> {
        belief_shift(latents.iter().filter(|v| !v.is_internal()), prior, posterior)
    }
}

/// Σ |posterior mean - prior mean| over the given latents.
fn belief_shift<'a>(
    latents: impl Iterator<Item = &'a Variable>,
    prior: &BTreeMap<String, f64>,
    posterior: &Posterior,
) -> Result<f64, PolicyError> {
    let mut total = 0.0;
    for latent in latents {
        let before = prior
            .get(latent.name())
            .copied()
            .ok_or_else(|| PolicyError::missing_estimate(latent.name(), "prior"))?;
        total += (posterior_mean(posterior, latent.name())? - before).abs();
    }
    Ok(total)
}

fn posterior_mean(posterior: &Posterior, latent: &str) -> Result<f64, PolicyError> {
    posterior
        .mean(latent)
        .ok_or_else(|| PolicyError::missing_estimate(latent, MEAN))
}

fn finish(score: f64, branch: PolicyBranch, discrepancy: Option<f64>) -> Result<Attribution, PolicyError> {
    if !score.is_finite() {
        return Err(PolicyError::NonFiniteScore(score));
    }
    debug!("attribution: branch={} score={:.4} discrepancy={:?}", branch, score, discrepancy);
    Ok(Attribution {
        score,
        branch,
        discrepancy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InferenceError, VariableError};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn variables(sa: f64, pi: f64, ti: f64) -> VariableSet {
        [
            Variable::normal(1, "skill", 0.0, 1.0).unwrap(),
            Variable::normal(1, "effort", 0.0, 1.0).unwrap(),
            Variable::fixed(0, "external", 0.0).unwrap(),
            Variable::fixed(0, "luck", 0.0).unwrap(),
            Variable::fixed(1, "TI", ti).unwrap(),
            Variable::fixed(0, "SA", sa).unwrap(),
            Variable::fixed(0, "PI", pi).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    fn trial(vars: VariableSet, success: f64, seed: u64) -> Trial {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Trial {
            variables: vars.resampled(&mut rng).unwrap(),
            success,
            sample_budget: 1000,
        }
    }

    fn participant() -> Participant {
        Participant::new(ParticipantProfile::default(), StatisticSet::moments())
    }

    #[test]
    fn test_low_self_awareness_branch() {
        let mut t = trial(variables(0.0, 1.0, 1.0), 0.0, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let a = participant().attribute(&mut t, &mut rng).unwrap();

        assert_eq!(a.branch, PolicyBranch::LowSelfAwareness);
        assert!(a.score >= 0.0);
        assert!(a.discrepancy.is_none());
    }

    #[test]
    fn test_zero_relevance_is_favorable() {
        // relevance 0 scales any discrepancy to 0
        let mut t = trial(variables(1.0, -1.0, 0.0), 0.0, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let a = participant().attribute(&mut t, &mut rng).unwrap();

        assert_eq!(a.branch, PolicyBranch::FavorableDiscrepancy);
        assert_eq!(a.discrepancy, Some(0.0));
    }

    #[test]
    fn test_failure_with_low_improvement_protects_self_worth() {
        let mut t = trial(variables(1.0, -1.0, 1.0), 0.0, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let a = participant().attribute(&mut t, &mut rng).unwrap();

        assert_eq!(a.branch, PolicyBranch::SelfWorthProtection);
        assert!(a.discrepancy.unwrap() < 0.0);
    }

    #[test]
    fn test_failure_with_high_improvement() {
        let mut t = trial(variables(1.0, 1.0, 1.0), 0.0, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let a = participant().attribute(&mut t, &mut rng).unwrap();

        assert_eq!(a.branch, PolicyBranch::ImprovementExpected);
        assert!(a.score >= 0.0);
    }

    #[test]
    fn test_success_boosts_internal_weight() {
        // Success raises the inferred self-concept, so d > 0
        let mut t = trial(variables(1.0, -1.0, 1.0), 1.0, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let a = participant().attribute(&mut t, &mut rng).unwrap();

        assert_eq!(a.branch, PolicyBranch::FavorableDiscrepancy);
        assert!(a.discrepancy.unwrap() > 0.0);
    }

    #[test]
    fn test_all_fixed_trials_are_identical() {
        let vars: VariableSet = [
            Variable::fixed(1, "skill", 0.0).unwrap(),
            Variable::fixed(1, "effort", 0.0).unwrap(),
            Variable::fixed(0, "external", 0.0).unwrap(),
            Variable::fixed(0, "luck", 0.0).unwrap(),
            Variable::fixed(1, "TI", 1.0).unwrap(),
            Variable::fixed(0, "SA", -1.0).unwrap(),
            Variable::fixed(0, "PI", 0.0).unwrap(),
        ]
        .into_iter()
        .collect();

        let scores: Vec<f64> = (0..10)
            .map(|i| {
                let mut t = trial(vars.clone(), 0.0, i);
                let mut rng = ChaCha8Rng::seed_from_u64(1000 + i);
                participant().attribute(&mut t, &mut rng).unwrap().score
            })
            .collect();

        assert!(scores.iter().all(|s| *s == scores[0]));
        assert_eq!(scores[0], 0.0);
    }

    #[test]
    fn test_missing_gate_variable() {
        let mut vars = variables(1.0, 1.0, 1.0);
        vars = vars.iter().filter(|v| v.name() != "SA").cloned().collect();
        let mut t = trial(vars, 0.0, 6);
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        let err = participant().attribute(&mut t, &mut rng).unwrap_err();
        assert_eq!(err, PolicyError::Variable(VariableError::Missing("SA".to_string())));
    }

    #[test]
    fn test_zero_budget_surfaces() {
        let mut t = trial(variables(1.0, 1.0, 1.0), 0.0, 7);
        t.sample_budget = 0;
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let err = participant().attribute(&mut t, &mut rng).unwrap_err();
        assert_eq!(err, PolicyError::Inference(InferenceError::InvalidSampleBudget(0)));
    }

    #[test]
    fn test_mean_statistic_required() {
        let p = Participant::new(ParticipantProfile::default(), StatisticSet::new().with("sq", |x| x * x));
        let mut t = trial(variables(1.0, 1.0, 1.0), 0.0, 8);
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        assert!(matches!(p.attribute(&mut t, &mut rng), Err(PolicyError::MissingEstimate { .. })));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_branches_exclusive_and_exhaustive(
            sa in -2.0f64..2.0,
            pi in -2.0f64..2.0,
            ti in -2.0f64..4.0,
            success in 0u8..2,
            seed in any::<u64>(),
        ) {
            let mut t = trial(variables(sa, pi, ti), success as f64, seed);
            t.sample_budget = 50;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let a = participant().attribute(&mut t, &mut rng).unwrap();

            prop_assert!(a.score.is_finite());
            match a.branch {
                PolicyBranch::LowSelfAwareness => prop_assert!(sa <= 0.0),
                PolicyBranch::FavorableDiscrepancy => {
                    prop_assert!(sa > 0.0);
                    prop_assert!(a.discrepancy.unwrap() >= 0.0);
                }
                PolicyBranch::ImprovementExpected => {
                    prop_assert!(sa > 0.0 && pi > 0.0);
                    prop_assert!(a.discrepancy.unwrap() < 0.0);
                }
                PolicyBranch::SelfWorthProtection => {
                    prop_assert!(sa > 0.0 && pi <= 0.0);
                    prop_assert!(a.discrepancy.unwrap() < 0.0);
                }
            }
        }
    }
}
