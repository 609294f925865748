//! MLB Betting - moneyline prediction and betting backtests
//!
//! This library provides:
//! - Leakage-safe team features (rolling form, Pythagorean expectation, Log5)
//! - Bayesian logistic regression with posterior-predictive win probabilities
//! - American odds conversion and an edge-threshold betting simulator
//! - CSV game loading and team name resolution
//!
//! # Example
//!
//! ```no_run
//! use mlb_betting::backtesting::SyntheticSeason;
//! use mlb_betting::config::PipelineConfig;
//! use mlb_betting::pipeline;
//!
//! let games = SyntheticSeason::default().generate();
//! let config = PipelineConfig::default();
//! let run = pipeline::run(&games, &config).unwrap();
//! println!("ROI: {:.2}%", run.betting.roi());
//! ```

pub mod backtesting;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod features;
pub mod model;
pub mod models;
pub mod pipeline;

// Re-export commonly used types
pub use backtesting::{BettingConfig, BettingResult, BettingSimulator};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use features::{TeamEncoding, TrainingSet};
pub use model::{BettingModel, FittedModel, ModelSpec, SamplerConfig};
pub use models::{
    BettingDecision, FeatureRow, GameRecord, MatchupFeatures, RollingForm, TeamObservation,
    TrainingRow,
};
