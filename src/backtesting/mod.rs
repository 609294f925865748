//! Backtesting engine for the edge-threshold betting strategy

pub mod metrics;
pub mod simulator;
pub mod synthetic;

pub use metrics::{
    analyze_by_odds_range, analyze_by_team, calculate_metrics, BacktestMetrics, DimensionAnalysis,
};
pub use simulator::{BettingConfig, BettingResult, BettingSimulator};
pub use synthetic::SyntheticSeason;
