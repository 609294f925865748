//! Fitted model artifact
//!
//! Specification, preprocessing state, team encoding and the full posterior
//! travel together and are persisted as one JSON document.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use super::posterior::{ParameterSummary, Posterior};
use super::preprocess::Preprocessor;
use super::spec::ModelSpec;
use crate::error::{PipelineError, Result};
use crate::features::{TeamEncoding, TrainingSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub spec: ModelSpec,
    /// Rolling window the features were built with
    pub window: usize,
    pub encoding: TeamEncoding,
    pub preprocessor: Preprocessor,
    pub posterior: Posterior,
}

impl FittedModel {
    /// Posterior-predictive win probability per row
    ///
    /// `feature_columns` must equal the training list, order included.
    pub fn predict(&self, set: &TrainingSet, feature_columns: &[String]) -> Result<Vec<f64>> {
        if feature_columns != self.spec.feature_columns.as_slice() {
            return Err(PipelineError::ContractMismatch {
                expected: self.spec.feature_columns.clone(),
                actual: feature_columns.to_vec(),
            });
        }
        if set.window != self.window {
            return Err(PipelineError::Validation(format!(
                "Model was trained on window {} features, got window {}",
                self.window, set.window
            )));
        }
        if set.encoding != self.encoding {
            return Err(PipelineError::Validation(
                "Rows were encoded with a different team table than the model".to_string(),
            ));
        }

        let raw = set.feature_matrix(feature_columns)?;
        let x = self.preprocessor.transform(&raw)?;
        Ok(self.posterior.predict_from_posterior(&x))
    }

    pub fn summary(&self) -> Vec<ParameterSummary> {
        self.posterior.summary(&self.spec.feature_columns)
    }

    /// Write the artifact, creating parent directories
    ///
    /// Data goes to a sibling temp file that is renamed into place, so a
    /// failed write never leaves a partial artifact at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = temp_path(path);
        let written = self.write_to(&tmp_path);
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        fs::rename(&tmp_path, path)?;

        info!(
            "Saved model ({} posterior draws) to {:?}",
            self.posterior.num_samples(),
            path
        );
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Read an artifact; never re-runs sampling
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::ModelNotFound(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        let model: FittedModel = serde_json::from_reader(reader)?;
        info!("Loaded model from {:?}", path);
        Ok(model)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
