//! Model specification
//!
//! Built once from the feature-column contract and priors. The same value is
//! used to fit and is stored inside the fitted model, so inference never
//! re-declares the model structure.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::artifact::FittedModel;
use super::posterior::Posterior;
use super::preprocess::{check_width, Preprocessor};
use super::sampler::{sample, LogPosterior, SamplerConfig};
use crate::error::{PipelineError, Result};
use crate::features::TrainingSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalPrior {
    pub mu: f64,
    pub sigma: f64,
}

impl Default for NormalPrior {
    /// Weakly informative N(0, 1)
    fn default() -> Self {
        Self { mu: 0.0, sigma: 1.0 }
    }
}

/// Bayesian logistic regression: `y ~ Bernoulli(sigmoid(alpha + betas . x))`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub feature_columns: Vec<String>,
    pub target_column: String,
    pub intercept_prior: NormalPrior,
    pub coefficient_prior: NormalPrior,
}

impl ModelSpec {
    pub fn new(feature_columns: Vec<String>, target_column: impl Into<String>) -> Self {
        Self {
            feature_columns,
            target_column: target_column.into(),
            intercept_prior: NormalPrior::default(),
            coefficient_prior: NormalPrior::default(),
        }
    }

    pub fn n_features(&self) -> usize {
        self.feature_columns.len()
    }

    /// Sample the posterior given a standardized matrix and 0/1 outcomes
    pub fn fit(&self, x: &[Vec<f64>], y: &[f64], sampler: &SamplerConfig) -> Result<Posterior> {
        if x.is_empty() {
            return Err(PipelineError::Validation(
                "Cannot fit a model on an empty training set".to_string(),
            ));
        }
        if x.len() != y.len() {
            return Err(PipelineError::Validation(format!(
                "Feature rows ({}) and targets ({}) differ in length",
                x.len(),
                y.len()
            )));
        }
        check_width(x, self.n_features())?;
        if x.iter().flatten().any(|v| !v.is_finite()) {
            return Err(PipelineError::Validation(
                "Feature matrix must be imputed and finite before fitting".to_string(),
            ));
        }
        if self.intercept_prior.sigma <= 0.0 || self.coefficient_prior.sigma <= 0.0 {
            return Err(PipelineError::Validation(
                "Prior standard deviations must be positive".to_string(),
            ));
        }

        let d = self.n_features();
        let mut prior_mu = vec![self.intercept_prior.mu];
        prior_mu.extend(std::iter::repeat(self.coefficient_prior.mu).take(d));
        let mut prior_sigma = vec![self.intercept_prior.sigma];
        prior_sigma.extend(std::iter::repeat(self.coefficient_prior.sigma).take(d));

        let target = LogPosterior {
            x,
            y,
            prior_mu,
            prior_sigma,
        };
        let chains = sample(&target, sampler)?;
        Ok(Posterior { chains })
    }

    /// Impute, standardize, sample, and bundle everything into a fitted model
    pub fn train(self, set: &TrainingSet, sampler: &SamplerConfig) -> Result<FittedModel> {
        let raw = set.feature_matrix(&self.feature_columns)?;
        let y = set.target(&self.target_column)?;
        let (preprocessor, x) = Preprocessor::fit_transform(&raw, self.n_features())?;

        info!(
            "Sampling posterior: {} rows, {} features, {} chains x {} draws (tune {})",
            x.len(),
            self.n_features(),
            sampler.chains,
            sampler.draws,
            sampler.tune
        );
        let posterior = self.fit(&x, &y, sampler)?;
        info!(
            "Sampling finished: {} draws, mean acceptance {:.3}",
            posterior.num_samples(),
            posterior.mean_acceptance_rate()
        );

        Ok(FittedModel {
            spec: self,
            window: set.window,
            encoding: set.encoding.clone(),
            preprocessor,
            posterior,
        })
    }
}
