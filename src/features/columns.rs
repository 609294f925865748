//! Named columns of a finalized training row
//!
//! Feature vectors are addressed by name. The ordered name list used for
//! training is stored with the fitted model and must match at predict time.

use crate::error::{PipelineError, Result};
use crate::models::TrainingRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    IsHome,
    RestDays,
    Log5Prob,
    RollingRunsScored,
    RollingRunsAllowed,
    RollingHits,
    RollingErrors,
    RollingPythagWinPct,
    OppPythagWinPct,
    TeamCode,
    OpponentCode,
    MoneylineClosing,
    Result,
}

impl Column {
    /// Parse a column name; rolling means are named `rolling_{window}_{metric}`
    pub fn parse(name: &str, window: usize) -> Result<Self> {
        let column = match name {
            "is_home" => Column::IsHome,
            "rest_days" => Column::RestDays,
            "log5_prob" => Column::Log5Prob,
            "rolling_pythag_win_pct" => Column::RollingPythagWinPct,
            "opp_pythag_win_pct" => Column::OppPythagWinPct,
            "team_code" => Column::TeamCode,
            "opponent_code" => Column::OpponentCode,
            "moneyline_closing" => Column::MoneylineClosing,
            "result" => Column::Result,
            other => {
                let prefix = format!("rolling_{}_", window);
                match other.strip_prefix(prefix.as_str()) {
                    Some("runs_scored") => Column::RollingRunsScored,
                    Some("runs_allowed") => Column::RollingRunsAllowed,
                    Some("hits") => Column::RollingHits,
                    Some("errors") => Column::RollingErrors,
                    _ => return Err(PipelineError::UnknownColumn(name.to_string())),
                }
            }
        };
        Ok(column)
    }

    /// Numeric value of this column; missing values are NaN
    pub fn extract(&self, row: &TrainingRow) -> f64 {
        let obs = &row.observation;
        match self {
            Column::IsHome => f64::from(u8::from(obs.is_home)),
            Column::RestDays => row.matchup.rest_days,
            Column::Log5Prob => row.matchup.log5_prob,
            Column::RollingRunsScored => row.form.runs_scored,
            Column::RollingRunsAllowed => row.form.runs_allowed,
            Column::RollingHits => row.form.hits,
            Column::RollingErrors => row.form.errors,
            Column::RollingPythagWinPct => row.form.pythag_win_pct,
            Column::OppPythagWinPct => row.matchup.opp_pythag_win_pct,
            Column::TeamCode => row.team_code.map_or(f64::NAN, f64::from),
            Column::OpponentCode => row.opponent_code.map_or(f64::NAN, f64::from),
            Column::MoneylineClosing => obs.moneyline_closing.map_or(f64::NAN, f64::from),
            Column::Result => f64::from(obs.result),
        }
    }
}

/// Default model feature columns for a rolling window
///
/// Order: venue/rest, Log5, rolling means (4), pythag pair, team identities.
pub fn default_feature_columns(window: usize) -> Vec<String> {
    vec![
        "is_home".to_string(),
        "rest_days".to_string(),
        "log5_prob".to_string(),
        format!("rolling_{}_runs_scored", window),
        format!("rolling_{}_runs_allowed", window),
        format!("rolling_{}_hits", window),
        format!("rolling_{}_errors", window),
        "rolling_pythag_win_pct".to_string(),
        "opp_pythag_win_pct".to_string(),
        "team_code".to_string(),
        "opponent_code".to_string(),
    ]
}

/// Resolve a list of column names
pub fn parse_columns(names: &[String], window: usize) -> Result<Vec<Column>> {
    names.iter().map(|n| Column::parse(n, window)).collect()
}
