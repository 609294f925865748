//! Game data loading and team name resolution

pub mod csv_loader;
pub mod teams;

// Re-export commonly used types
pub use csv_loader::{dataframe_to_games, load_games};
pub use teams::{require_team, resolve_team, TEAM_CODES};
