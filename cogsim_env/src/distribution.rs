//! Closed set of probability distributions used by generative processes.
//!
//! Every variant carries its own parameter shape and is validated on
//! construction, so sampling and density evaluation never see an invalid
//! parameter.

use crate::error::SampleError;
use rand::Rng;
use rand_distr::Distribution as _;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Distribution kinds a participant variable may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributionKind {
    Normal,
    Binomial,
    Exponential,
    Fixed,
}

impl DistributionKind {
    /// Returns all declarable kinds.
    pub fn all() -> Vec<DistributionKind> {
        vec![
            DistributionKind::Normal,
            DistributionKind::Binomial,
            DistributionKind::Exponential,
            DistributionKind::Fixed,
        ]
    }

    /// Returns the canonical kind name.
    pub fn name(&self) -> &'static str {
        match self {
            DistributionKind::Normal => "Normal",
            DistributionKind::Binomial => "Binomial",
            DistributionKind::Exponential => "Exponential",
            DistributionKind::Fixed => "Fixed",
        }
    }

    /// Returns the constructor signature, in order.
    ///
    /// `Fixed` also accepts `value` in place of `fixed`.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            DistributionKind::Normal => &["mean", "std"],
            DistributionKind::Binomial => &["trials", "prob"],
            DistributionKind::Exponential => &["rate"],
            DistributionKind::Fixed => &["fixed"],
        }
    }
}

impl std::fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DistributionKind {
    type Err = SampleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "gaussian" => Ok(DistributionKind::Normal),
            "binomial" => Ok(DistributionKind::Binomial),
            "exponential" | "exp" => Ok(DistributionKind::Exponential),
            "fixed" | "constant" => Ok(DistributionKind::Fixed),
            _ => Err(SampleError::UnknownDistribution(s.to_string())),
        }
    }
}

/// A validated probability distribution over `f64` values.
///
/// Discrete outcomes (Binomial counts, Bernoulli 0/1) are reported as `f64`
/// so every site in a trace shares one value type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Distribution {
    Normal { mean: f64, std: f64 },
    Binomial { trials: u64, prob: f64 },
    Exponential { rate: f64 },
    Fixed { value: f64 },
    Bernoulli { prob: f64 },
    Beta { alpha: f64, beta: f64 },
}

fn finite(name: &'static str, value: f64) -> Result<f64, SampleError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SampleError::invalid(name, value, "must be finite"))
    }
}

fn probability(value: f64) -> Result<f64, SampleError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SampleError::invalid("prob", value, "must lie in [0, 1]"))
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, SampleError> {
    if finite(name, value)? > 0.0 {
        Ok(value)
    } else {
        Err(SampleError::invalid(name, value, "must be > 0"))
    }
}

impl Distribution {
    /// Normal(mean, std) with `std > 0`.
    pub fn normal(mean: f64, std: f64) -> Result<Self, SampleError> {
        Ok(Self::Normal {
            mean: finite("mean", mean)?,
            std: positive("std", std)?,
        })
    }

    /// Binomial(trials, prob).
    pub fn binomial(trials: u64, prob: f64) -> Result<Self, SampleError> {
        Ok(Self::Binomial {
            trials,
            prob: probability(prob)?,
        })
    }

    /// Exponential(rate) with `rate > 0`.
    pub fn exponential(rate: f64) -> Result<Self, SampleError> {
        Ok(Self::Exponential {
            rate: positive("rate", rate)?,
        })
    }

    /// Point mass at `value`.
    pub fn fixed(value: f64) -> Result<Self, SampleError> {
        Ok(Self::Fixed {
            value: finite("fixed", value)?,
        })
    }

    /// Bernoulli(prob), yielding 0.0 or 1.0.
    pub fn bernoulli(prob: f64) -> Result<Self, SampleError> {
        Ok(Self::Bernoulli {
            prob: probability(prob)?,
        })
    }

    /// Beta(alpha, beta).
    pub fn beta(alpha: f64, beta: f64) -> Result<Self, SampleError> {
        Ok(Self::Beta {
            alpha: positive("alpha", alpha)?,
            beta: positive("beta", beta)?,
        })
    }

    /// Builds a declarable distribution from an ordered parameter list.
    ///
    /// The list must match [`DistributionKind::parameter_names`] exactly, in
    /// count, order and name.
    pub fn from_params(kind: DistributionKind, params: &[(&str, f64)]) -> Result<Self, SampleError> {
        let expected = kind.parameter_names();
        if params.len() != expected.len() {
            return Err(SampleError::malformed(
                kind,
                format!("expected {} parameter(s) {:?}, got {}", expected.len(), expected, params.len()),
            ));
        }
        for ((given, _), wanted) in params.iter().zip(expected) {
            let alias_ok = kind == DistributionKind::Fixed && *given == "value";
            if given != wanted && !alias_ok {
                return Err(SampleError::malformed(
                    kind,
                    format!("expected parameter `{}`, got `{}`", wanted, given),
                ));
            }
        }

        match kind {
            DistributionKind::Normal => Self::normal(params[0].1, params[1].1),
            DistributionKind::Binomial => {
                let trials = params[0].1;
                if !trials.is_finite() || trials < 0.0 || trials.fract() != 0.0 {
                    return Err(SampleError::invalid("trials", trials, "must be a non-negative integer"));
                }
                Self::binomial(trials as u64, params[1].1)
            }
            DistributionKind::Exponential => Self::exponential(params[0].1),
            DistributionKind::Fixed => Self::fixed(params[0].1),
        }
    }

    /// Returns the declarable kind, or `None` for model-internal distributions.
    pub fn kind(&self) -> Option<DistributionKind> {
        match self {
            Self::Normal { .. } => Some(DistributionKind::Normal),
            Self::Binomial { .. } => Some(DistributionKind::Binomial),
            Self::Exponential { .. } => Some(DistributionKind::Exponential),
            Self::Fixed { .. } => Some(DistributionKind::Fixed),
            Self::Bernoulli { .. } | Self::Beta { .. } => None,
        }
    }

    /// Returns the mean of the distribution.
    pub fn mean(&self) -> f64 {
        match *self {
            Self::Normal { mean, .. } => mean,
            Self::Binomial { trials, prob } => trials as f64 * prob,
            Self::Exponential { rate } => 1.0 / rate,
            Self::Fixed { value } => value,
            Self::Bernoulli { prob } => prob,
            Self::Beta { alpha, beta } => alpha / (alpha + beta),
        }
    }

    /// Draws one value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, SampleError> {
        let value = match *self {
            Self::Normal { mean, std } => rand_distr::Normal::new(mean, std)
                .map_err(|_| SampleError::invalid("std", std, "rejected by sampler"))?
                .sample(rng),
            Self::Binomial { trials, prob } => rand_distr::Binomial::new(trials, prob)
                .map_err(|_| SampleError::invalid("prob", prob, "rejected by sampler"))?
                .sample(rng) as f64,
            Self::Exponential { rate } => rand_distr::Exp::new(rate)
                .map_err(|_| SampleError::invalid("rate", rate, "rejected by sampler"))?
                .sample(rng),
            Self::Fixed { value } => value,
            Self::Bernoulli { prob } => {
                let hit = rand_distr::Bernoulli::new(prob)
                    .map_err(|_| SampleError::invalid("prob", prob, "rejected by sampler"))?
                    .sample(rng);
                if hit { 1.0 } else { 0.0 }
            }
            Self::Beta { alpha, beta } => rand_distr::Beta::new(alpha, beta)
                .map_err(|_| SampleError::invalid("alpha", alpha, "rejected by sampler"))?
                .sample(rng),
        };
        Ok(value)
    }

    /// Log density (continuous) or log mass (discrete) at `x`.
    ///
    /// Returns `-inf` outside the support.
    pub fn log_prob(&self, x: f64) -> f64 {
        match *self {
            Self::Normal { mean, std } => {
                let z = (x - mean) / std;
                -0.5 * z * z - std.ln() - 0.5 * (2.0 * PI).ln()
            }
            Self::Binomial { trials, prob } => {
                let n = trials as f64;
                if x < 0.0 || x > n || x.fract() != 0.0 {
                    return f64::NEG_INFINITY;
                }
                ln_choose(n, x) + xlogy(x, prob) + xlogy(n - x, 1.0 - prob)
            }
            Self::Exponential { rate } => {
                if x < 0.0 {
                    f64::NEG_INFINITY
                } else {
                    rate.ln() - rate * x
                }
            }
            Self::Fixed { value } => {
                if x == value { 0.0 } else { f64::NEG_INFINITY }
            }
            Self::Bernoulli { prob } => {
                if x == 1.0 {
                    prob.ln()
                } else if x == 0.0 {
                    (1.0 - prob).ln()
                } else {
                    f64::NEG_INFINITY
                }
            }
            Self::Beta { alpha, beta } => {
                if x <= 0.0 || x >= 1.0 {
                    return f64::NEG_INFINITY;
                }
                let log_beta_fn = ln_gamma(alpha) + ln_gamma(beta) - ln_gamma(alpha + beta);
                (alpha - 1.0) * x.ln() + (beta - 1.0) * (1.0 - x).ln() - log_beta_fn
            }
        }
    }
}

/// `x * ln(y)` with the convention `0 * ln(0) = 0`.
fn xlogy(x: f64, y: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x * y.ln() }
}

/// Exact `ln C(n, k)` for integral `0 <= k <= n`, summed over the shorter side.
fn ln_choose(n: f64, k: f64) -> f64 {
    let k = k.min(n - k);
    (1..=k as u64)
        .map(|i| ((n - k + i as f64) / i as f64).ln())
        .sum()
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEF: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function (Lanczos approximation, g = 7).
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection formula
        (PI / (PI * x).sin().abs()).ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let t = x + LANCZOS_G + 0.5;
        let series = LANCZOS_COEF
            .iter()
            .enumerate()
            .skip(1)
            .fold(LANCZOS_COEF[0], |acc, (i, c)| acc + c / (x + i as f64));
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
    }
}
