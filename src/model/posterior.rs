//! Posterior sample collection and posterior-predictive inference

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::linalg::dot;
use super::sampler::sigmoid;

/// Draws from one sampling chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub alpha: Vec<f64>,
    /// One coefficient vector per draw
    pub betas: Vec<Vec<f64>>,
    pub acceptance_rate: f64,
}

/// Posterior mean and standard deviation of one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub name: String,
    pub mean: f64,
    pub sd: f64,
}

/// All chains, all draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posterior {
    pub chains: Vec<Chain>,
}

impl Posterior {
    pub fn num_samples(&self) -> usize {
        self.chains.iter().map(|c| c.alpha.len()).sum()
    }

    fn samples(&self) -> impl Iterator<Item = (f64, &[f64])> + '_ {
        self.chains.iter().flat_map(|c| {
            c.alpha
                .iter()
                .zip(&c.betas)
                .map(|(&a, b)| (a, b.as_slice()))
        })
    }

    /// Posterior-predictive mean of P(y = 1) for each standardized row
    pub fn predict_from_posterior(&self, x: &[Vec<f64>]) -> Vec<f64> {
        let n = self.num_samples().max(1) as f64;
        x.par_iter()
            .map(|row| {
                self.samples()
                    .map(|(alpha, betas)| sigmoid(alpha + dot(betas, row)))
                    .sum::<f64>()
                    / n
            })
            .collect()
    }

    pub fn mean_acceptance_rate(&self) -> f64 {
        if self.chains.is_empty() {
            return 0.0;
        }
        self.chains.iter().map(|c| c.acceptance_rate).sum::<f64>() / self.chains.len() as f64
    }

    /// Per-parameter mean and sd; `feature_names` label the betas
    pub fn summary(&self, feature_names: &[String]) -> Vec<ParameterSummary> {
        let n = self.num_samples();
        if n == 0 {
            return Vec::new();
        }

        let mut names = vec!["alpha".to_string()];
        names.extend(feature_names.iter().map(|f| format!("beta[{}]", f)));

        names
            .into_iter()
            .enumerate()
            .map(|(k, name)| {
                let values: Vec<f64> = self
                    .samples()
                    .map(|(a, b)| if k == 0 { a } else { b[k - 1] })
                    .collect();
                let mean = values.iter().sum::<f64>() / n as f64;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
                ParameterSummary {
                    name,
                    mean,
                    sd: var.sqrt(),
                }
            })
            .collect()
    }
}
