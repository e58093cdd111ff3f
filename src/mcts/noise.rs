//! Dirichlet exploration noise for root priors.
//!
//! Gamma variates use the Marsaglia–Tsang squeeze method, with the
//! `alpha < 1` case boosted through `Gamma(alpha + 1) * U^(1/alpha)`.
//! Standard normals come from the Box–Muller transform.

use crate::{IsmctsError, Result};
use rand::Rng;
use rand_distr::Distribution;
use std::f64::consts::PI;

/// One standard-normal draw via Box–Muller.
pub fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - U keeps u1 in (0, 1], so ln(u1) is finite
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Gamma(alpha, 1) sampler.
#[derive(Debug, Clone, Copy)]
pub struct Gamma {
    alpha: f64,
}

impl Gamma {
    pub fn new(alpha: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(IsmctsError::InvalidConfiguration(format!(
                "gamma shape must be finite and > 0, got {}",
                alpha
            )));
        }
        Ok(Self { alpha })
    }

    fn sample_marsaglia_tsang<R: Rng + ?Sized>(alpha: f64, rng: &mut R) -> f64 {
        let d = alpha - 1.0 / 3.0;
        let c = 1.0 / (9.0 * d).sqrt();
        loop {
            let x = sample_standard_normal(rng);
            let v = 1.0 + c * x;
            if v <= 0.0 {
                continue;
            }
            let v = v * v * v;
            let u: f64 = rng.random::<f64>();
            if u < 1.0 - 0.0331 * x.powi(4) {
                return d * v;
            }
            if u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
                return d * v;
            }
        }
    }
}

impl Distribution<f64> for Gamma {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.alpha >= 1.0 {
            Self::sample_marsaglia_tsang(self.alpha, rng)
        } else {
            let boosted = Self::sample_marsaglia_tsang(self.alpha + 1.0, rng);
            let u: f64 = 1.0 - rng.random::<f64>();
            boosted * u.powf(1.0 / self.alpha)
        }
    }
}

/// Symmetric Dirichlet(alpha) over `dimension` components.
#[derive(Debug, Clone, Copy)]
pub struct SymmetricDirichlet {
    gamma: Gamma,
    dimension: usize,
}

impl SymmetricDirichlet {
    pub fn new(alpha: f64, dimension: usize) -> Result<Self> {
        Ok(Self {
            gamma: Gamma::new(alpha)?,
            dimension,
        })
    }
}

impl Distribution<Vec<f64>> for SymmetricDirichlet {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        if self.dimension == 0 {
            return Vec::new();
        }
        let draws: Vec<f64> = (0..self.dimension).map(|_| self.gamma.sample(rng)).collect();
        let sum: f64 = draws.iter().sum();
        // Tiny alphas can underflow every component
        if sum <= 0.0 || !sum.is_finite() {
            return vec![1.0 / self.dimension as f64; self.dimension];
        }
        draws.into_iter().map(|g| g / sum).collect()
    }
}

/// `(1 - epsilon) * prior + epsilon * noise`
pub fn blend_prior(prior: f64, noise: f64, epsilon: f64) -> f64 {
    (1.0 - epsilon) * prior + epsilon * noise
}
