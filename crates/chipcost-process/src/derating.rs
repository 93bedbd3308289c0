//! Stochastic derating of test cost.
//!
//! Test cost is scaled by a random factor drawn around the true yield of the
//! part under test. The random source is always supplied by the caller so
//! that evaluations are reproducible when seeded and independent when run
//! concurrently.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Distribution, Exp, LogNormal, Normal};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Relative spread of the normal and log-normal derating draws.
pub const DERATING_SIGMA: f64 = 0.05;

/// Distribution of test failures, selecting how test cost is derated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestDistribution {
    /// Normal around the true yield with a 5% standard deviation.
    #[serde(alias = "gaussian")]
    Normal,
    /// No derating.
    #[default]
    Uniform,
    /// Exponential with rate `1 / true_yield`.
    Exponential,
    /// Log-normal centred at `ln(true_yield)` with sigma 0.05.
    #[serde(alias = "log-normal")]
    LogNormal,
}

impl TestDistribution {
    /// Map the numeric selector used by legacy test definitions
    /// (1 normal, 2 uniform, 3 exponential, 4 log-normal).
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::Uniform),
            3 => Some(Self::Exponential),
            4 => Some(Self::LogNormal),
            _ => None,
        }
    }

    /// Draw a derating factor for a part with the given true yield.
    pub fn derating_factor<R: Rng + ?Sized>(&self, true_yield: f64, rng: &mut R) -> f64 {
        if *self == Self::Uniform {
            return 1.0;
        }
        if true_yield <= 0.0 {
            // Every draw is centred on zero.
            return 0.0;
        }
        match self {
            Self::Normal => match Normal::new(true_yield, true_yield * DERATING_SIGMA) {
                Ok(dist) => dist.sample(rng),
                Err(_) => true_yield,
            },
            Self::Exponential => match Exp::new(1.0 / true_yield) {
                Ok(dist) => dist.sample(rng),
                Err(_) => true_yield,
            },
            Self::LogNormal => match LogNormal::new(true_yield.ln(), DERATING_SIGMA) {
                Ok(dist) => dist.sample(rng),
                Err(_) => true_yield,
            },
            Self::Uniform => 1.0,
        }
    }

    /// Expected derating factor for a part with the given true yield.
    pub fn mean_factor(&self, true_yield: f64) -> f64 {
        match self {
            Self::Uniform => 1.0,
            Self::Normal | Self::Exponential => true_yield,
            Self::LogNormal => true_yield * (DERATING_SIGMA * DERATING_SIGMA / 2.0).exp(),
        }
    }
}

impl FromStr for TestDistribution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "normal" | "gaussian" => Ok(Self::Normal),
            "uniform" => Ok(Self::Uniform),
            "exponential" => Ok(Self::Exponential),
            "lognormal" | "log-normal" => Ok(Self::LogNormal),
            other => other
                .parse::<u32>()
                .ok()
                .and_then(Self::from_code)
                .ok_or_else(|| Error::UnknownDistribution(s.to_string())),
        }
    }
}

impl fmt::Display for TestDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Uniform => "uniform",
            Self::Exponential => "exponential",
            Self::LogNormal => "lognormal",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_parse_names_and_codes() {
        assert_eq!("Gaussian".parse::<TestDistribution>().unwrap(), TestDistribution::Normal);
        assert_eq!("log-normal".parse::<TestDistribution>().unwrap(), TestDistribution::LogNormal);
        assert_eq!("3".parse::<TestDistribution>().unwrap(), TestDistribution::Exponential);
        assert!("weibull".parse::<TestDistribution>().is_err());
        assert!("7".parse::<TestDistribution>().is_err());
    }

    #[test]
    fn test_uniform_is_identity() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(TestDistribution::Uniform.derating_factor(0.8, &mut rng), 1.0);
    }

    #[test]
    fn test_seeded_draws_repeat() {
        for dist in [TestDistribution::Normal, TestDistribution::Exponential, TestDistribution::LogNormal] {
            let a = dist.derating_factor(0.9, &mut StdRng::seed_from_u64(7));
            let b = dist.derating_factor(0.9, &mut StdRng::seed_from_u64(7));
            assert_eq!(a, b);
            assert!(a > 0.0 || dist == TestDistribution::Normal);
        }
    }

    #[test]
    fn test_sample_means() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20000;
        for dist in [TestDistribution::Normal, TestDistribution::Exponential, TestDistribution::LogNormal] {
            let mean: f64 = (0..n).map(|_| dist.derating_factor(0.8, &mut rng)).sum::<f64>() / n as f64;
            let expected = dist.mean_factor(0.8);
            assert!((mean - expected).abs() < 0.05 * expected, "{}: {} vs {}", dist, mean, expected);
        }
    }

    #[test]
    fn test_normal_spread() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let x = TestDistribution::Normal.derating_factor(0.9, &mut rng);
            // 0.9 +- 8 sigma
            assert!((x - 0.9).abs() < 8.0 * 0.045);
        }
    }

    #[test]
    fn test_zero_yield() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(TestDistribution::Exponential.derating_factor(0.0, &mut rng), 0.0);
    }

    #[test]
    fn test_dyn_rng() {
        let mut boxed: Box<dyn rand::RngCore> = Box::new(StdRng::seed_from_u64(5));
        let x = TestDistribution::LogNormal.derating_factor(0.5, boxed.as_mut());
        assert!(x > 0.0);
    }
}
