//! Posterior sampling for Bayesian logistic regression
//!
//! The log posterior is strictly concave under Normal priors, so sampling
//! starts from the MAP estimate (Newton iterations) and uses random-walk
//! Metropolis proposals shaped by the Laplace covariance at the mode.
//! Chains are seeded independently and run in parallel.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::linalg::{back_substitute_transpose, cholesky, dot, solve_spd, Matrix};
use super::posterior::Chain;
use crate::error::{PipelineError, Result};

const NEWTON_MAX_ITERS: usize = 100;
const NEWTON_TOL: f64 = 1e-8;
const TARGET_ACCEPTANCE: f64 = 0.234;
const ADAPT_INTERVAL: usize = 50;

/// Number of chains, tuning and kept draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub chains: usize,
    pub tune: usize,
    pub draws: usize,
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            chains: 4,
            tune: 1000,
            draws: 1000,
            seed: 42,
        }
    }
}

/// Numerically stable logistic function
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// ln(1 + e^x) without overflow
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Log posterior of `theta = [alpha, betas..]` given standardized data
///
/// `prior_mu` / `prior_sigma` hold one entry per parameter.
pub struct LogPosterior<'a> {
    pub x: &'a [Vec<f64>],
    pub y: &'a [f64],
    pub prior_mu: Vec<f64>,
    pub prior_sigma: Vec<f64>,
}

impl<'a> LogPosterior<'a> {
    pub fn dim(&self) -> usize {
        self.prior_mu.len()
    }

    fn linear(&self, theta: &[f64], row: &[f64]) -> f64 {
        theta[0] + dot(&theta[1..], row)
    }

    pub fn value(&self, theta: &[f64]) -> f64 {
        let likelihood: f64 = self
            .x
            .iter()
            .zip(self.y)
            .map(|(row, &y)| {
                let eta = self.linear(theta, row);
                y * eta - softplus(eta)
            })
            .sum();
        let prior: f64 = theta
            .iter()
            .zip(self.prior_mu.iter().zip(&self.prior_sigma))
            .map(|(&t, (&m, &s))| -0.5 * ((t - m) / s).powi(2))
            .sum();
        likelihood + prior
    }

    /// Gradient and negative Hessian (the precision matrix)
    fn gradient_and_precision(&self, theta: &[f64]) -> (Vec<f64>, Matrix) {
        let d = self.dim();
        let mut grad = vec![0.0; d];
        let mut precision = vec![vec![0.0; d]; d];

        for (row, &y) in self.x.iter().zip(self.y) {
            let p = sigmoid(self.linear(theta, row));
            let w = p * (1.0 - p);
            let residual = y - p;

            // Augmented row [1, x..]
            let feature = |k: usize| if k == 0 { 1.0 } else { row[k - 1] };
            for a in 0..d {
                let fa = feature(a);
                grad[a] += residual * fa;
                for b in 0..=a {
                    precision[a][b] += w * fa * feature(b);
                }
            }
        }

        for a in 0..d {
            let var = self.prior_sigma[a].powi(2);
            grad[a] -= (theta[a] - self.prior_mu[a]) / var;
            precision[a][a] += 1.0 / var;
            for b in 0..a {
                precision[b][a] = precision[a][b];
            }
        }
        (grad, precision)
    }

    /// Posterior mode and the precision matrix at the mode
    pub fn find_mode(&self) -> Result<(Vec<f64>, Matrix)> {
        let mut theta = self.prior_mu.clone();
        let mut current = self.value(&theta);

        for iter in 0..NEWTON_MAX_ITERS {
            let (grad, precision) = self.gradient_and_precision(&theta);
            let step = solve_spd(&precision, &grad)?;

            // Backtrack until the posterior does not decrease
            let mut scale = 1.0;
            let mut candidate: Vec<f64>;
            let mut value;
            loop {
                candidate = theta.iter().zip(&step).map(|(t, s)| t + scale * s).collect();
                value = self.value(&candidate);
                if value >= current || scale < 1e-6 {
                    break;
                }
                scale *= 0.5;
            }

            let max_step = step.iter().map(|s| (s * scale).abs()).fold(0.0, f64::max);
            theta = candidate;
            current = value;
            if max_step < NEWTON_TOL {
                debug!("Newton converged after {} iterations", iter + 1);
                break;
            }
        }

        if theta.iter().any(|t| !t.is_finite()) {
            return Err(PipelineError::Validation(
                "Posterior mode search diverged".to_string(),
            ));
        }
        let (_, precision) = self.gradient_and_precision(&theta);
        Ok((theta, precision))
    }
}

/// Draw from N(0, precision^-1) given the Cholesky factor of the precision
fn correlated_normal(rng: &mut StdRng, precision_chol: &Matrix) -> Vec<f64> {
    let z: Vec<f64> = (0..precision_chol.len())
        .map(|_| rng.sample::<f64, _>(StandardNormal))
        .collect();
    back_substitute_transpose(precision_chol, &z)
}

fn run_chain(
    target: &LogPosterior<'_>,
    mode: &[f64],
    precision_chol: &Matrix,
    config: &SamplerConfig,
    chain_index: usize,
) -> Chain {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(chain_index as u64));
    let d = mode.len();

    // Dispersed start around the mode
    let jitter = correlated_normal(&mut rng, precision_chol);
    let mut theta: Vec<f64> = mode.iter().zip(&jitter).map(|(m, j)| m + j).collect();
    let mut log_p = target.value(&theta);

    let mut step_scale = 2.38 / (d as f64).sqrt();
    let mut batch_accepted = 0usize;
    let mut accepted = 0usize;

    let mut alpha = Vec::with_capacity(config.draws);
    let mut betas = Vec::with_capacity(config.draws);

    for iter in 0..config.tune + config.draws {
        let noise = correlated_normal(&mut rng, precision_chol);
        let proposal: Vec<f64> = theta
            .iter()
            .zip(&noise)
            .map(|(t, n)| t + step_scale * n)
            .collect();
        let proposal_log_p = target.value(&proposal);

        let log_u: f64 = rng.gen::<f64>().ln();
        let accept = log_u < proposal_log_p - log_p;
        if accept {
            theta = proposal;
            log_p = proposal_log_p;
        }

        if iter < config.tune {
            if accept {
                batch_accepted += 1;
            }
            if (iter + 1) % ADAPT_INTERVAL == 0 {
                let rate = batch_accepted as f64 / ADAPT_INTERVAL as f64;
                step_scale *= (rate - TARGET_ACCEPTANCE).exp();
                batch_accepted = 0;
            }
        } else {
            if accept {
                accepted += 1;
            }
            alpha.push(theta[0]);
            betas.push(theta[1..].to_vec());
        }
    }

    let acceptance_rate = if config.draws > 0 {
        accepted as f64 / config.draws as f64
    } else {
        0.0
    };
    debug!(
        "Chain {} finished: acceptance {:.3}, step scale {:.3}",
        chain_index, acceptance_rate, step_scale
    );

    Chain {
        alpha,
        betas,
        acceptance_rate,
    }
}

/// Sample all chains in parallel
pub fn sample(target: &LogPosterior<'_>, config: &SamplerConfig) -> Result<Vec<Chain>> {
    if config.chains == 0 || config.draws == 0 {
        return Err(PipelineError::Validation(
            "Sampler needs at least one chain and one draw".to_string(),
        ));
    }

    let (mode, precision) = target.find_mode()?;
    let precision_chol = cholesky(&precision)?;

    let chains = (0..config.chains)
        .into_par_iter()
        .map(|c| run_chain(target, &mode, &precision_chol, config, c))
        .collect();
    Ok(chains)
}
