//! Matchup feature composer
//!
//! Rest days, opponent Pythagorean form from a same-date self-join, and the
//! Log5 head-to-head probability.

use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::models::{FeatureRow, FormRow, MatchupFeatures};

/// Rest assumed before a team's first observed game
pub const DEFAULT_REST_DAYS: f64 = 5.0;

/// Log5 probability that A beats B given their win percentages
///
/// NaN when either input is NaN or the denominator is zero.
pub fn log5_probability(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    let numerator = a * (1.0 - b);
    let denominator = numerator + b * (1.0 - a);
    if denominator == 0.0 {
        return f64::NAN;
    }
    numerator / denominator
}

type JoinKey<'a> = (NaiveDate, u8, &'a str);

/// Attach matchup features to rolling rows
///
/// Rows must keep the `(team, date)` order of the rolling engine. An opponent
/// still inside its first `window` games contributes a NaN pythag.
pub fn calculate_matchup_features(
    rows: &[FormRow],
    window: usize,
    rest_days_default: f64,
) -> Vec<FeatureRow> {
    // Lookup table: (date, game_number, team) -> that team's full-window pythag
    let mut pythag_by_team: HashMap<JoinKey<'_>, f64> = HashMap::with_capacity(rows.len());
    for row in rows {
        let obs = &row.observation;
        let key = (obs.date, obs.game_number, obs.team.as_str());
        let pythag = if row.form.is_complete(window) {
            row.form.pythag_win_pct
        } else {
            f64::NAN
        };
        if pythag_by_team.insert(key, pythag).is_some() {
            warn!(
                "Duplicate observation for {} on {} game {}; later row wins the join",
                obs.team, obs.date, obs.game_number
            );
        }
    }

    let mut missing_opponent = 0usize;
    let mut out = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obs = &row.observation;

        let rest_days = match i.checked_sub(1).map(|p| &rows[p].observation) {
            Some(prev) if prev.team == obs.team => (obs.date - prev.date).num_days() as f64,
            _ => rest_days_default,
        };

        let opp_pythag_win_pct = match pythag_by_team.get(&(
            obs.date,
            obs.game_number,
            obs.opponent.as_str(),
        )) {
            Some(&p) => p,
            None => {
                missing_opponent += 1;
                f64::NAN
            }
        };

        let log5_prob = log5_probability(row.form.pythag_win_pct, opp_pythag_win_pct);

        out.push(FeatureRow {
            observation: obs.clone(),
            form: row.form,
            matchup: MatchupFeatures {
                rest_days,
                opp_pythag_win_pct,
                log5_prob,
            },
        });
    }

    if missing_opponent > 0 {
        debug!("{} rows had no opponent row to join", missing_opponent);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RollingForm, TeamObservation};

    fn row(team: &str, opponent: &str, day: u32, pythag: f64) -> FormRow {
        FormRow {
            observation: TeamObservation {
                date: NaiveDate::from_ymd_opt(2023, 5, day).unwrap(),
                game_number: 1,
                team: team.to_string(),
                opponent: opponent.to_string(),
                is_home: true,
                result: 1,
                runs_scored: 4,
                runs_allowed: 2,
                hits: 8,
                errors: 0,
                moneyline_closing: None,
            },
            form: RollingForm {
                games: 3,
                runs_scored: 4.0,
                runs_allowed: 3.0,
                hits: 8.0,
                errors: 1.0,
                pythag_win_pct: pythag,
            },
        }
    }

    #[test]
    fn test_log5_formula() {
        // Equal teams are a coin flip
        assert!((log5_probability(0.6, 0.6) - 0.5).abs() < 1e-12);
        // .600 vs .400
        let p = log5_probability(0.6, 0.4);
        let expected = (0.6 * 0.6) / (0.6 * 0.6 + 0.4 * 0.4);
        assert!((p - expected).abs() < 1e-12);
        // Against a .500 team, Log5 returns the team's own pct
        assert!((log5_probability(0.7, 0.5) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_log5_degenerate() {
        assert!(log5_probability(f64::NAN, 0.5).is_nan());
        assert!(log5_probability(0.5, f64::NAN).is_nan());
        // Both perfect: 1*(0) / (0 + 0)
        assert!(log5_probability(1.0, 1.0).is_nan());
        assert!(log5_probability(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_rest_days() {
        let rows = vec![
            row("BOS", "NYY", 1, 0.5),
            row("BOS", "NYY", 2, 0.5),
            row("BOS", "NYY", 6, 0.5),
            row("NYY", "BOS", 1, 0.5),
        ];
        let out = calculate_matchup_features(&rows, 3, DEFAULT_REST_DAYS);

        assert_eq!(out[0].matchup.rest_days, 5.0);
        assert_eq!(out[1].matchup.rest_days, 1.0);
        assert_eq!(out[2].matchup.rest_days, 4.0);
        // First game of a new team falls back to the default
        assert_eq!(out[3].matchup.rest_days, 5.0);
    }

    #[test]
    fn test_opponent_join() {
        let rows = vec![row("BOS", "NYY", 1, 0.6), row("NYY", "BOS", 1, 0.4)];
        let out = calculate_matchup_features(&rows, 3, DEFAULT_REST_DAYS);

        assert_eq!(out[0].matchup.opp_pythag_win_pct, 0.4);
        assert_eq!(out[1].matchup.opp_pythag_win_pct, 0.6);
        // The two Log5 values of one game sum to one
        assert!((out[0].matchup.log5_prob + out[1].matchup.log5_prob - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_opponent_missing_is_nan() {
        let rows = vec![row("BOS", "TB", 1, 0.6)];
        let out = calculate_matchup_features(&rows, 3, DEFAULT_REST_DAYS);
        assert!(out[0].matchup.opp_pythag_win_pct.is_nan());
        assert!(out[0].matchup.log5_prob.is_nan());
    }

    #[test]
    fn test_doubleheader_joins_by_game_number() {
        let mut g1_bos = row("BOS", "NYY", 1, 0.6);
        let mut g2_bos = row("BOS", "NYY", 1, 0.7);
        let mut g1_nyy = row("NYY", "BOS", 1, 0.3);
        let mut g2_nyy = row("NYY", "BOS", 1, 0.2);
        g2_bos.observation.game_number = 2;
        g2_nyy.observation.game_number = 2;
        g1_bos.observation.game_number = 1;
        g1_nyy.observation.game_number = 1;

        let rows = vec![g1_bos, g2_bos, g1_nyy, g2_nyy];
        let out = calculate_matchup_features(&rows, 3, DEFAULT_REST_DAYS);

        assert_eq!(out[0].matchup.opp_pythag_win_pct, 0.3);
        assert_eq!(out[1].matchup.opp_pythag_win_pct, 0.2);
        assert_eq!(out[1].matchup.rest_days, 0.0);
        assert_eq!(out[3].matchup.opp_pythag_win_pct, 0.7);
    }

    #[test]
    fn test_opponent_in_warmup_is_nan() {
        let mut nyy = row("NYY", "BOS", 1, 0.4);
        nyy.form.games = 2;
        let rows = vec![row("BOS", "NYY", 1, 0.6), nyy];
        let out = calculate_matchup_features(&rows, 3, DEFAULT_REST_DAYS);

        assert!(out[0].matchup.opp_pythag_win_pct.is_nan());
        assert!(out[0].matchup.log5_prob.is_nan());
        assert_eq!(out[1].matchup.opp_pythag_win_pct, 0.6);
    }
}
