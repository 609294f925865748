//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::backtesting::BettingConfig;
use crate::error::{validate_window, PipelineError, Result};
use crate::features::{default_feature_columns, parse_columns, Column, DEFAULT_REST_DAYS};
use crate::model::SamplerConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rolling window in games
    pub window: usize,
    /// Rest days assigned to a team's first game
    pub rest_days_default: f64,
    /// Model inputs; `None` means the default contract for `window`
    pub feature_columns: Option<Vec<String>>,
    pub target_column: String,
    pub model_path: PathBuf,
    pub log_level: String,
    pub sampler: SamplerConfig,
    pub betting: BettingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: 10,
            rest_days_default: DEFAULT_REST_DAYS,
            feature_columns: None,
            target_column: "result".to_string(),
            model_path: PathBuf::from("data/models/bayesian_v1.json"),
            log_level: "info".to_string(),
            sampler: SamplerConfig::default(),
            betting: BettingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a TOML file; missing keys take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn feature_columns(&self) -> Vec<String> {
        self.feature_columns
            .clone()
            .unwrap_or_else(|| default_feature_columns(self.window))
    }

    pub fn validate(&self) -> Result<()> {
        validate_window(self.window)?;

        if !self.rest_days_default.is_finite() || self.rest_days_default < 0.0 {
            return Err(PipelineError::Validation(format!(
                "rest_days_default must be a non-negative number, got {}",
                self.rest_days_default
            )));
        }
        if !self.betting.threshold.is_finite() {
            return Err(PipelineError::Validation(
                "Betting threshold must be finite".to_string(),
            ));
        }
        if self.betting.stake.is_nan() || self.betting.stake <= 0.0 {
            return Err(PipelineError::Validation(format!(
                "Stake must be positive, got {}",
                self.betting.stake
            )));
        }

        let columns = self.feature_columns();
        if columns.is_empty() {
            return Err(PipelineError::Validation(
                "At least one feature column is required".to_string(),
            ));
        }
        let parsed = parse_columns(&columns, self.window)?;
        if parsed.iter().any(|c| *c == Column::Result) {
            return Err(PipelineError::Validation(
                "The target column cannot be used as a feature".to_string(),
            ));
        }
        Column::parse(&self.target_column, self.window)?;
        Ok(())
    }
}
