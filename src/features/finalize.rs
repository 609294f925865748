//! Training-set finalizer
//!
//! Drops warm-up rows and rows with undefined features, then attaches integer
//! team codes from an encoding table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::features::columns::{parse_columns, Column};
use crate::models::{FeatureRow, TrainingRow};

/// Team identity -> integer code
///
/// Codes follow the sorted order of the distinct team names, so the same set
/// of teams always produces the same table. The table is persisted with the
/// fitted model and reused at inference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEncoding {
    codes: BTreeMap<String, u32>,
}

impl TeamEncoding {
    pub fn fit<'a, I>(teams: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut codes: BTreeMap<String, u32> =
            teams.into_iter().map(|t| (t.to_string(), 0)).collect();
        for (i, code) in codes.values_mut().enumerate() {
            *code = i as u32;
        }
        Self { codes }
    }

    pub fn code(&self, team: &str) -> Option<u32> {
        self.codes.get(team).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(|t| t.as_str())
    }
}

/// Finalized rows plus the context needed to read them as features
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub window: usize,
    pub rows: Vec<TrainingRow>,
    pub encoding: TeamEncoding,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-major feature matrix in the given column order
    pub fn feature_matrix(&self, columns: &[String]) -> Result<Vec<Vec<f64>>> {
        let parsed = parse_columns(columns, self.window)?;
        Ok(self
            .rows
            .iter()
            .map(|row| parsed.iter().map(|c| c.extract(row)).collect())
            .collect())
    }

    /// Binary target vector
    pub fn target(&self, column: &str) -> Result<Vec<f64>> {
        let parsed = Column::parse(column, self.window)?;
        self.rows
            .iter()
            .map(|row| {
                let y = parsed.extract(row);
                if y == 0.0 || y == 1.0 {
                    Ok(y)
                } else {
                    Err(PipelineError::Validation(format!(
                        "Target column {} must be 0 or 1, got {}",
                        column, y
                    )))
                }
            })
            .collect()
    }
}

/// A row survives once its window is full and every engineered feature is defined
fn is_ready(row: &FeatureRow, window: usize) -> bool {
    let form = &row.form;
    form.is_complete(window)
        && [
            form.runs_scored,
            form.runs_allowed,
            form.hits,
            form.errors,
            form.pythag_win_pct,
            row.matchup.opp_pythag_win_pct,
            row.matchup.log5_prob,
        ]
        .iter()
        .all(|v| !v.is_nan())
}

fn encode(rows: Vec<&FeatureRow>, window: usize, encoding: TeamEncoding) -> TrainingSet {
    let mut unknown = 0usize;
    let rows: Vec<TrainingRow> = rows
        .into_iter()
        .map(|row| {
            let team_code = encoding.code(&row.observation.team);
            let opponent_code = encoding.code(&row.observation.opponent);
            if team_code.is_none() || opponent_code.is_none() {
                unknown += 1;
            }
            TrainingRow {
                observation: row.observation.clone(),
                form: row.form,
                matchup: row.matchup,
                team_code,
                opponent_code,
            }
        })
        .collect();

    if unknown > 0 {
        warn!(
            "{} rows reference teams missing from the encoding table; codes left undefined",
            unknown
        );
    }

    TrainingSet {
        window,
        rows,
        encoding,
    }
}

/// Drop warm-up rows and fit a fresh team encoding on what remains
pub fn finalize_training_data(rows: &[FeatureRow], window: usize) -> TrainingSet {
    let ready: Vec<&FeatureRow> = rows.iter().filter(|r| is_ready(r, window)).collect();
    let encoding = TeamEncoding::fit(ready.iter().flat_map(|r| {
        [
            r.observation.team.as_str(),
            r.observation.opponent.as_str(),
        ]
    }));

    info!(
        "Finalized training set: {} of {} rows kept, {} teams encoded",
        ready.len(),
        rows.len(),
        encoding.len()
    );
    encode(ready, window, encoding)
}

/// Drop warm-up rows and encode teams with an existing table
pub fn finalize_with_encoding(
    rows: &[FeatureRow],
    window: usize,
    encoding: &TeamEncoding,
) -> TrainingSet {
    let ready: Vec<&FeatureRow> = rows.iter().filter(|r| is_ready(r, window)).collect();
    info!(
        "Finalized inference set: {} of {} rows kept",
        ready.len(),
        rows.len()
    );
    encode(ready, window, encoding.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::columns::default_feature_columns;
    use crate::features::{
        calculate_matchup_features, calculate_rolling_features, create_team_centric,
        DEFAULT_REST_DAYS,
    };
    use crate::models::{GameRecord, MatchupFeatures, RollingForm, TeamObservation};
    use chrono::NaiveDate;

    fn feature_row(team: &str, opponent: &str, day: u32, games: usize, log5: f64) -> FeatureRow {
        FeatureRow {
            observation: TeamObservation {
                date: NaiveDate::from_ymd_opt(2023, 6, day).unwrap(),
                game_number: 1,
                team: team.to_string(),
                opponent: opponent.to_string(),
                is_home: day % 2 == 0,
                result: 1,
                runs_scored: 5,
                runs_allowed: 2,
                hits: 9,
                errors: 1,
                moneyline_closing: Some(-120),
            },
            form: RollingForm {
                games,
                runs_scored: 4.5,
                runs_allowed: 3.5,
                hits: 8.0,
                errors: 0.5,
                pythag_win_pct: 0.62,
            },
            matchup: MatchupFeatures {
                rest_days: 1.0,
                opp_pythag_win_pct: 0.48,
                log5_prob: log5,
            },
        }
    }

    #[test]
    fn test_drops_incomplete_windows() {
        let rows = vec![
            feature_row("NYY", "BOS", 1, 1, 0.6),
            feature_row("NYY", "BOS", 2, 2, 0.6),
            feature_row("NYY", "BOS", 3, 3, 0.6),
            feature_row("NYY", "BOS", 4, 3, 0.6),
        ];
        let set = finalize_training_data(&rows, 3);
        assert_eq!(set.len(), 2);
        assert!(set.rows.iter().all(|r| r.form.games == 3));
    }

    #[test]
    fn test_drops_nan_log5() {
        let rows = vec![
            feature_row("NYY", "BOS", 1, 3, f64::NAN),
            feature_row("NYY", "BOS", 2, 3, 0.6),
        ];
        let set = finalize_training_data(&rows, 3);
        assert_eq!(set.len(), 1);
        assert_eq!(set.rows[0].observation.date.to_string(), "2023-06-02");
    }

    #[test]
    fn test_team_codes_are_sorted_and_stable() {
        let rows = vec![
            feature_row("TB", "NYY", 1, 3, 0.6),
            feature_row("BOS", "TB", 2, 3, 0.6),
        ];
        let set = finalize_training_data(&rows, 3);

        assert_eq!(set.encoding.code("BOS"), Some(0));
        assert_eq!(set.encoding.code("NYY"), Some(1));
        assert_eq!(set.encoding.code("TB"), Some(2));
        assert_eq!(set.rows[0].team_code, Some(2));
        assert_eq!(set.rows[0].opponent_code, Some(1));

        let again = finalize_training_data(&rows, 3);
        assert_eq!(set.encoding, again.encoding);
    }

    #[test]
    fn test_existing_encoding_is_reused() {
        let encoding = TeamEncoding::fit(["BOS", "NYY"]);
        let rows = vec![feature_row("NYY", "SEA", 1, 3, 0.6)];
        let set = finalize_with_encoding(&rows, 3, &encoding);

        assert_eq!(set.rows[0].team_code, Some(1));
        assert_eq!(set.rows[0].opponent_code, None);
        assert_eq!(set.encoding, encoding);
    }

    #[test]
    fn test_feature_matrix_order() {
        let rows = vec![feature_row("NYY", "BOS", 2, 3, 0.6)];
        let set = finalize_training_data(&rows, 3);
        let columns = default_feature_columns(3);
        let x = set.feature_matrix(&columns).unwrap();

        assert_eq!(x.len(), 1);
        assert_eq!(x[0].len(), 11);
        assert_eq!(x[0][0], 1.0); // is_home (day 2)
        assert_eq!(x[0][1], 1.0); // rest_days
        assert_eq!(x[0][2], 0.6); // log5_prob
        assert_eq!(x[0][3], 4.5); // rolling runs scored
        assert_eq!(x[0][7], 0.62); // pythag
        assert_eq!(x[0][8], 0.48); // opponent pythag
        assert_eq!(x[0][9], 1.0); // NYY
        assert_eq!(x[0][10], 0.0); // BOS
    }

    #[test]
    fn test_target() {
        let rows = vec![feature_row("NYY", "BOS", 2, 3, 0.6)];
        let set = finalize_training_data(&rows, 3);
        assert_eq!(set.target("result").unwrap(), vec![1.0]);
        assert!(set.target("rest_days").is_ok());
        assert!(set.target("log5_prob").is_err());
        assert!(set.target("nope").is_err());
    }

    fn game(day: u32, home: &str, away: &str, home_score: u32, away_score: u32) -> GameRecord {
        GameRecord {
            date: NaiveDate::from_ymd_opt(2023, 4, day).unwrap(),
            game_number: 1,
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_score,
            away_score,
            home_hits: 8,
            home_errors: 0,
            away_hits: 6,
            away_errors: 1,
            home_moneyline: Some(-120),
            away_moneyline: Some(110),
        }
    }

    fn finalize_games(games: &[GameRecord], window: usize) -> TrainingSet {
        let observations = create_team_centric(games).unwrap();
        let form = calculate_rolling_features(&observations, window).unwrap();
        let features = calculate_matchup_features(&form, window, DEFAULT_REST_DAYS);
        finalize_training_data(&features, window)
    }

    #[test]
    fn test_drops_rows_whose_opponent_is_in_warmup() {
        // NYY has two prior games on day 3, BOS only one
        let games = vec![
            game(1, "NYY", "TB", 4, 1),
            game(1, "BOS", "SEA", 3, 2),
            game(2, "NYY", "TB", 5, 3),
            game(3, "NYY", "BOS", 2, 6),
        ];
        let set = finalize_games(&games, 2);
        assert!(set.rows.is_empty());
    }

    #[test]
    fn test_keeps_rows_once_both_windows_are_full() {
        let games = vec![
            game(1, "NYY", "TB", 4, 1),
            game(1, "BOS", "SEA", 3, 2),
            game(2, "NYY", "TB", 5, 3),
            game(2, "BOS", "SEA", 1, 7),
            game(3, "NYY", "BOS", 2, 6),
        ];
        let set = finalize_games(&games, 2);

        assert_eq!(set.len(), 2);
        let teams: Vec<&str> = set.rows.iter().map(|r| r.observation.team.as_str()).collect();
        assert_eq!(teams, vec!["BOS", "NYY"]);
        assert!(set.rows.iter().all(|r| !r.matchup.opp_pythag_win_pct.is_nan()));
    }
}
