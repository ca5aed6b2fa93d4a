use amrpic_concepts::RngError;
use serde::{Deserialize, Serialize};

/// Initial momentum `u = gamma * v` (m/s) of injected particles.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub enum MomentumDistribution {
    /// Every particle obtains the same momentum.
    Constant([f64; 3]),
    /// Each component is drawn from a normal distribution
    /// $\mathcal{N}(\text{mean}_i, \text{spread}_i)$.
    Gaussian {
        /// Mean momentum
        mean: [f64; 3],
        /// Standard deviation along each axis
        spread: [f64; 3],
    },
}

impl Default for MomentumDistribution {
    fn default() -> Self {
        MomentumDistribution::Constant([0.0; 3])
    }
}

impl MomentumDistribution {
    /// Checks that all spreads are finite and non-negative.
    pub fn validate(&self) -> Result<(), RngError> {
        if let MomentumDistribution::Gaussian { spread, .. } = self {
            if spread.iter().any(|s| !s.is_finite() || *s < 0.0) {
                return Err(RngError(format!(
                    "Spread of gaussian momentum distribution must be finite and non-negative \
                    but got {spread:?}"
                )));
            }
        }
        Ok(())
    }

    /// Draws a single momentum.
    pub fn sample<R>(&self, rng: &mut R) -> Result<[f64; 3], RngError>
    where
        R: rand::Rng + ?Sized,
    {
        match self {
            MomentumDistribution::Constant(u) => Ok(*u),
            MomentumDistribution::Gaussian { mean, spread } => {
                let mut u = [0.0; 3];
                for i in 0..3 {
                    let distr = rand_distr::Normal::new(mean[i], spread[i])
                        .map_err(|e| RngError(format!("{e}")))?;
                    u[i] = rng.sample(distr);
                }
                Ok(u)
            }
        }
    }
}
