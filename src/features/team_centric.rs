//! Team-centric transform
//!
//! Turns one game row (home vs away) into two team rows (team vs opponent),
//! sorted by `(team, date, game_number)`. Every later stage relies on that order.

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{GameRecord, TeamObservation};

fn home_view(game: &GameRecord) -> TeamObservation {
    TeamObservation {
        date: game.date,
        game_number: game.game_number,
        team: game.home_team.clone(),
        opponent: game.away_team.clone(),
        is_home: true,
        result: u8::from(game.home_score > game.away_score),
        runs_scored: game.home_score,
        runs_allowed: game.away_score,
        hits: game.home_hits,
        errors: game.home_errors,
        moneyline_closing: game.home_moneyline,
    }
}

fn away_view(game: &GameRecord) -> TeamObservation {
    TeamObservation {
        date: game.date,
        game_number: game.game_number,
        team: game.away_team.clone(),
        opponent: game.home_team.clone(),
        is_home: false,
        result: u8::from(game.away_score > game.home_score),
        runs_scored: game.away_score,
        runs_allowed: game.home_score,
        hits: game.away_hits,
        errors: game.away_errors,
        moneyline_closing: game.away_moneyline,
    }
}

/// Expand games into team observations
///
/// Tied games carry no winner and are skipped.
pub fn create_team_centric(games: &[GameRecord]) -> Result<Vec<TeamObservation>> {
    let mut observations = Vec::with_capacity(games.len() * 2);
    let mut ties = 0usize;

    for game in games {
        game.validate()?;
        if game.is_tie() {
            ties += 1;
            continue;
        }
        observations.push(home_view(game));
        observations.push(away_view(game));
    }

    if ties > 0 {
        warn!("Excluded {} tied games", ties);
    }

    observations.sort_by(|a, b| {
        a.team
            .cmp(&b.team)
            .then(a.date.cmp(&b.date))
            .then(a.game_number.cmp(&b.game_number))
    });

    debug!(
        "Team-centric transform: {} games -> {} observations",
        games.len(),
        observations.len()
    );
    Ok(observations)
}

/// True when observations are ordered by `(team, date, game_number)`
pub fn is_team_date_sorted(observations: &[TeamObservation]) -> bool {
    observations.windows(2).all(|w| {
        (&w[0].team, w[0].date, w[0].game_number) <= (&w[1].team, w[1].date, w[1].game_number)
    })
}
