//! Path-bound model store
//!
//! `train` fits and persists; `predict` uses the in-memory fit, falling back
//! to the artifact on disk.

use std::path::{Path, PathBuf};
use tracing::info;

use super::artifact::FittedModel;
use super::sampler::SamplerConfig;
use super::spec::ModelSpec;
use crate::error::{PipelineError, Result};
use crate::features::TrainingSet;

pub struct BettingModel {
    model_path: PathBuf,
    fitted: Option<FittedModel>,
}

impl BettingModel {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
            fitted: None,
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn fitted(&self) -> Option<&FittedModel> {
        self.fitted.as_ref()
    }

    /// Fit on a finalized training set and write the artifact
    pub fn train(
        &mut self,
        set: &TrainingSet,
        feature_columns: &[String],
        target_column: &str,
        sampler: &SamplerConfig,
    ) -> Result<&FittedModel> {
        let spec = ModelSpec::new(feature_columns.to_vec(), target_column);
        let fitted = spec.train(set, sampler)?;
        fitted.save(&self.model_path)?;
        let fitted: &FittedModel = self.fitted.insert(fitted);
        Ok(fitted)
    }

    /// Load the artifact unless a fit is already held
    pub fn load(&mut self) -> Result<&FittedModel> {
        if self.fitted.is_none() {
            info!("Loading model from {:?}", self.model_path);
            self.fitted = Some(FittedModel::load(&self.model_path)?);
        }
        self.fitted
            .as_ref()
            .ok_or_else(|| PipelineError::ModelNotFound(self.model_path.clone()))
    }

    pub fn predict(&mut self, set: &TrainingSet, feature_columns: &[String]) -> Result<Vec<f64>> {
        self.load()?.predict(set, feature_columns)
    }
}
