use std::path::PathBuf;
use thiserror::Error;

/// Pipeline error types
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or incomplete upstream record
    #[error("Validation error: {0}")]
    Validation(String),

    /// No fitted model in memory and no artifact at the configured path
    #[error("No trained model found at {0:?}; train first")]
    ModelNotFound(PathBuf),

    /// Feature columns at predict time differ from those used at train time
    #[error("Feature column mismatch: model expects {expected:?}, got {actual:?}")]
    ContractMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Column name not produced by the training-set finalizer
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] polars::prelude::PolarsError),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// American odds live outside (-100, 100)
pub fn validate_moneyline(odds: i32) -> Result<()> {
    if odds.abs() < 100 {
        return Err(PipelineError::Validation(format!(
            "Moneyline must be <= -100 or >= 100, got {}",
            odds
        )));
    }
    Ok(())
}

pub fn validate_probability(prob: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(PipelineError::Validation(format!(
            "Probability must be between 0 and 1, got {}",
            prob
        )));
    }
    Ok(())
}

pub fn validate_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(PipelineError::Validation(
            "Rolling window must be at least 1 game".to_string(),
        ));
    }
    Ok(())
}
