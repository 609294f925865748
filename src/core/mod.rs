//! Core betting arithmetic

pub mod odds;

// Re-export commonly used types
pub use odds::{
    american_to_decimal, american_to_implied_prob, calculate_edge, implied_prob_checked, settle,
    should_bet,
};
