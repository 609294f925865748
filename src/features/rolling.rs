//! Rolling feature engine
//!
//! For each team's date-ordered observations, the form attached to game `i`
//! is computed only from games `[i - W, i - 1]`. Game `i` never contributes
//! to its own features.

use std::collections::VecDeque;
use tracing::debug;

use crate::error::{validate_window, PipelineError, Result};
use crate::features::team_centric::is_team_date_sorted;
use crate::models::{FormRow, RollingForm, TeamObservation};

/// Keeps the denominator positive when a team has no runs on either side
pub const PYTHAG_EPSILON: f64 = 1e-9;

/// Pythagorean expectation from summed runs
pub fn pythagorean_win_pct(runs_for: f64, runs_against: f64) -> f64 {
    let rf2 = runs_for.powi(2);
    let ra2 = runs_against.powi(2);
    rf2 / (rf2 + ra2 + PYTHAG_EPSILON)
}

/// Running sums over the trailing window
#[derive(Debug, Default)]
struct WindowSums {
    games: VecDeque<[f64; 4]>,
    runs_scored: f64,
    runs_allowed: f64,
    hits: f64,
    errors: f64,
}

impl WindowSums {
    fn form(&self) -> RollingForm {
        let n = self.games.len();
        if n == 0 {
            return RollingForm::empty();
        }
        let count = n as f64;
        RollingForm {
            games: n,
            runs_scored: self.runs_scored / count,
            runs_allowed: self.runs_allowed / count,
            hits: self.hits / count,
            errors: self.errors / count,
            pythag_win_pct: pythagorean_win_pct(self.runs_scored, self.runs_allowed),
        }
    }

    fn push(&mut self, obs: &TeamObservation, window: usize) {
        let entry = [
            obs.runs_scored as f64,
            obs.runs_allowed as f64,
            obs.hits as f64,
            obs.errors as f64,
        ];
        self.add(&entry, 1.0);
        self.games.push_back(entry);

        if self.games.len() > window {
            if let Some(old) = self.games.pop_front() {
                self.add(&old, -1.0);
            }
        }
    }

    fn add(&mut self, entry: &[f64; 4], sign: f64) {
        self.runs_scored += sign * entry[0];
        self.runs_allowed += sign * entry[1];
        self.hits += sign * entry[2];
        self.errors += sign * entry[3];
    }
}

/// Attach strictly-lagged rolling form to every observation
///
/// Input must be sorted by `(team, date)` as produced by
/// [`create_team_centric`](crate::features::create_team_centric).
pub fn calculate_rolling_features(
    observations: &[TeamObservation],
    window: usize,
) -> Result<Vec<FormRow>> {
    validate_window(window)?;
    if !is_team_date_sorted(observations) {
        return Err(PipelineError::Validation(
            "Observations must be sorted by (team, date) before rolling".to_string(),
        ));
    }

    let mut rows = Vec::with_capacity(observations.len());
    let mut sums = WindowSums::default();
    let mut current_team: Option<&str> = None;

    for obs in observations {
        if current_team != Some(obs.team.as_str()) {
            current_team = Some(obs.team.as_str());
            sums = WindowSums::default();
        }

        // Form is read before the current game enters the window
        let form = sums.form();
        sums.push(obs, window);

        rows.push(FormRow {
            observation: obs.clone(),
            form,
        });
    }

    debug!("Rolling features (window {}): {} rows", window, rows.len());
    Ok(rows)
}
