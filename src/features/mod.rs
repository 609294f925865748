//! Leakage-safe feature pipeline
//!
//! games -> team observations -> rolling form -> matchup features -> training set

pub mod columns;
pub mod finalize;
pub mod matchup;
pub mod rolling;
pub mod team_centric;

// Re-export commonly used types
pub use columns::{default_feature_columns, parse_columns, Column};
pub use finalize::{finalize_training_data, finalize_with_encoding, TeamEncoding, TrainingSet};
pub use matchup::{calculate_matchup_features, log5_probability, DEFAULT_REST_DAYS};
pub use rolling::{calculate_rolling_features, pythagorean_win_pct};
pub use team_centric::create_team_centric;
