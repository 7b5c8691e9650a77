//! Generative processes: the participant's intuitive theory of performance.
//!
//! A generative process is a plain function of its latent variables whose
//! every random draw goes through a [`SampleContext`]. The same process is
//! run forward for simulation and under a weighting context for inference.

use crate::variable::Variable;
use cogsim_env::{Distribution, SampleContext, SampleError, SampleSet};

/// Site name of the observable outcome.
pub const SUCCESS_SITE: &str = "success";

/// Site name of the self-worth latent added by [`SelfWorthModel`].
pub const SELF_WORTH_SITE: &str = "self-worth";

/// A stochastic model expressed as a sequence of named draws.
pub trait GenerativeProcess {
    /// Runs the model once, drawing every random quantity through `ctx`.
    ///
    /// Returns the value of every site the model considers part of its
    /// output.
    fn run(&self, ctx: &mut dyn SampleContext) -> Result<SampleSet, SampleError>;
}

impl<F> GenerativeProcess for F
where
    F: Fn(&mut dyn SampleContext) -> Result<SampleSet, SampleError>,
{
    fn run(&self, ctx: &mut dyn SampleContext) -> Result<SampleSet, SampleError> {
        self(ctx)
    }
}

/// Logistic function.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Intuitive theory of performance.
///
/// ```text
/// skill, effort, external, luck ~ their own distributions
/// p       = sigmoid(skill + effort + external + luck)
/// success ~ Bernoulli(p)
/// ```
#[derive(Debug, Clone)]
pub struct IntuitiveTheory {
    latents: Vec<Variable>,
}

impl IntuitiveTheory {
    /// Creates the four-cause theory.
    pub fn new(skill: Variable, effort: Variable, external: Variable, luck: Variable) -> Self {
        Self::from_latents(vec![skill, effort, external, luck])
    }

    /// Creates a theory over any set of additive causes.
    pub fn from_latents(latents: Vec<Variable>) -> Self {
        Self { latents }
    }

    pub fn latents(&self) -> &[Variable] {
        &self.latents
    }
}

impl GenerativeProcess for IntuitiveTheory {
    fn run(&self, ctx: &mut dyn SampleContext) -> Result<SampleSet, SampleError> {
        let mut out = SampleSet::new();
        let mut drive = 0.0;

        for latent in &self.latents {
            let value = ctx.sample(latent.name(), latent.distribution())?;
            drive += value;
            out.insert(latent.name(), value);
        }

        let success = ctx.sample(SUCCESS_SITE, &Distribution::bernoulli(sigmoid(drive))?)?;
        out.insert(SUCCESS_SITE, success);
        Ok(out)
    }
}

/// Extends a process with a self-worth latent tied to the self-concept.
///
/// `self-worth ~ Normal(sum of self-concept values, 1)`
pub struct SelfWorthModel<'a, M: ?Sized> {
    inner: &'a M,
    self_concept: &'a [String],
}

impl<'a, M: GenerativeProcess + ?Sized> SelfWorthModel<'a, M> {
    pub fn new(inner: &'a M, self_concept: &'a [String]) -> Self {
        Self { inner, self_concept }
    }
}

impl<M: GenerativeProcess + ?Sized> GenerativeProcess for SelfWorthModel<'_, M> {
    fn run(&self, ctx: &mut dyn SampleContext) -> Result<SampleSet, SampleError> {
        let mut out = self.inner.run(ctx)?;
        let mut worth = 0.0;
        for name in self.self_concept {
            worth += out.value(name)?;
        }
        let sampled = ctx.sample(SELF_WORTH_SITE, &Distribution::normal(worth, 1.0)?)?;
        out.insert(SELF_WORTH_SITE, sampled);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cogsim_env::ForwardSampler;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fixed_theory(values: [f64; 4]) -> IntuitiveTheory {
        IntuitiveTheory::new(
            Variable::fixed(1, "skill", values[0]).unwrap(),
            Variable::fixed(1, "effort", values[1]).unwrap(),
            Variable::fixed(0, "external", values[2]).unwrap(),
            Variable::fixed(0, "luck", values[3]).unwrap(),
        )
    }

    #[test]
    fn test_sigmoid() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn test_theory_returns_every_site() {
        let theory = fixed_theory([0.1, 0.2, 0.3, 0.4]);
        let mut ctx = ForwardSampler::new(ChaCha8Rng::seed_from_u64(42));
        let out = theory.run(&mut ctx).unwrap();

        for name in ["skill", "effort", "external", "luck", SUCCESS_SITE] {
            assert!(out.contains(name), "missing {}", name);
        }
        let success = out.get(SUCCESS_SITE).unwrap();
        assert!(success == 0.0 || success == 1.0);
        assert_eq!(ctx.trace(), &out);
    }

    #[test]
    fn test_success_rate_follows_sigmoid() {
        // sigmoid(2) ≈ 0.881
        let theory = fixed_theory([0.5, 0.5, 0.5, 0.5]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let runs = 4000;
        let mut hits = 0.0;
        for _ in 0..runs {
            let mut ctx = ForwardSampler::new(&mut rng);
            hits += theory.run(&mut ctx).unwrap().get(SUCCESS_SITE).unwrap();
        }
        assert_relative_eq!(hits / runs as f64, sigmoid(2.0), epsilon = 0.03);
    }

    #[test]
    fn test_self_worth_extension() {
        let theory = fixed_theory([1.0, 2.0, 0.0, 0.0]);
        let concept = vec!["skill".to_string(), "effort".to_string()];
        let model = SelfWorthModel::new(&theory, &concept);

        let mut ctx = ForwardSampler::new(ChaCha8Rng::seed_from_u64(8));
        let out = model.run(&mut ctx).unwrap();
        assert!(out.contains(SELF_WORTH_SITE));
        assert!(out.contains(SUCCESS_SITE));

        let unknown = vec!["charisma".to_string()];
        let model = SelfWorthModel::new(&theory, &unknown);
        let mut ctx = ForwardSampler::new(ChaCha8Rng::seed_from_u64(8));
        assert_eq!(model.run(&mut ctx), Err(SampleError::MissingSite("charisma".to_string())));
    }

    #[test]
    fn test_closure_is_a_process() {
        let model = |ctx: &mut dyn SampleContext| -> Result<SampleSet, SampleError> {
            let x = ctx.sample("x", &Distribution::fixed(3.0)?)?;
            Ok([("x", x)].into_iter().collect())
        };
        let mut ctx = ForwardSampler::new(ChaCha8Rng::seed_from_u64(0));
        assert_eq!(model.run(&mut ctx).unwrap().get("x"), Some(3.0));
    }
}
