use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{validate_moneyline, PipelineError, Result};

/// One contest as supplied by the game data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: NaiveDate,
    /// 1 for a single game, 2 for the second game of a doubleheader
    #[serde(default = "default_game_number")]
    pub game_number: u8,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub home_hits: u32,
    pub home_errors: u32,
    pub away_hits: u32,
    pub away_errors: u32,
    pub home_moneyline: Option<i32>,
    pub away_moneyline: Option<i32>,
}

fn default_game_number() -> u8 {
    1
}

impl GameRecord {
    pub fn validate(&self) -> Result<()> {
        if self.home_team.trim().is_empty() || self.away_team.trim().is_empty() {
            return Err(PipelineError::Validation(format!(
                "Game on {} is missing a team",
                self.date
            )));
        }
        if self.home_team == self.away_team {
            return Err(PipelineError::Validation(format!(
                "Game on {} has {} playing itself",
                self.date, self.home_team
            )));
        }
        if self.game_number == 0 {
            return Err(PipelineError::Validation(format!(
                "Game on {} has game_number 0",
                self.date
            )));
        }
        for odds in [self.home_moneyline, self.away_moneyline].into_iter().flatten() {
            validate_moneyline(odds)?;
        }
        Ok(())
    }

    pub fn is_tie(&self) -> bool {
        self.home_score == self.away_score
    }
}

/// One team's view of one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamObservation {
    pub date: NaiveDate,
    pub game_number: u8,
    pub team: String,
    pub opponent: String,
    pub is_home: bool,
    /// 1 = win, 0 = loss
    pub result: u8,
    pub runs_scored: u32,
    pub runs_allowed: u32,
    pub hits: u32,
    pub errors: u32,
    /// This team's own closing price (American odds)
    pub moneyline_closing: Option<i32>,
}

/// Trailing form over strictly prior games
///
/// `games` is the number of prior games the window covered. Every value is
/// NaN when `games == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingForm {
    pub games: usize,
    pub runs_scored: f64,
    pub runs_allowed: f64,
    pub hits: f64,
    pub errors: f64,
    pub pythag_win_pct: f64,
}

impl RollingForm {
    pub fn empty() -> Self {
        Self {
            games: 0,
            runs_scored: f64::NAN,
            runs_allowed: f64::NAN,
            hits: f64::NAN,
            errors: f64::NAN,
            pythag_win_pct: f64::NAN,
        }
    }

    /// True once the window is filled with `window` prior games
    pub fn is_complete(&self, window: usize) -> bool {
        self.games >= window
    }
}

/// Observation with its rolling form attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRow {
    pub observation: TeamObservation,
    pub form: RollingForm,
}

/// Matchup-relative features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchupFeatures {
    pub rest_days: f64,
    pub opp_pythag_win_pct: f64,
    pub log5_prob: f64,
}

/// Observation with rolling form and matchup features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub observation: TeamObservation,
    pub form: RollingForm,
    pub matchup: MatchupFeatures,
}

/// Post warm-up row ready for the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRow {
    pub observation: TeamObservation,
    pub form: RollingForm,
    pub matchup: MatchupFeatures,
    /// None when the team is missing from the encoding table
    pub team_code: Option<u32>,
    pub opponent_code: Option<u32>,
}

/// Betting outcome for a single row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingDecision {
    pub date: NaiveDate,
    pub team: String,
    pub opponent: String,
    pub predicted_prob: f64,
    pub moneyline: Option<i32>,
    pub vegas_prob: Option<f64>,
    pub edge: Option<f64>,
    pub bet_placed: bool,
    pub won: bool,
    pub stake: f64,
    pub pnl: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_game() -> GameRecord {
        GameRecord {
            date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            game_number: 1,
            home_team: "NYY".to_string(),
            away_team: "BOS".to_string(),
            home_score: 5,
            away_score: 3,
            home_hits: 9,
            home_errors: 0,
            away_hits: 7,
            away_errors: 1,
            home_moneyline: Some(-150),
            away_moneyline: Some(130),
        }
    }

    #[test]
    fn test_game_validate_ok() {
        assert!(sample_game().validate().is_ok());
    }

    #[test]
    fn test_game_validate_same_team() {
        let mut game = sample_game();
        game.away_team = "NYY".to_string();
        assert!(game.validate().is_err());
    }

    #[test]
    fn test_game_validate_missing_team() {
        let mut game = sample_game();
        game.home_team = "  ".to_string();
        assert!(game.validate().is_err());
    }

    #[test]
    fn test_game_validate_bad_moneyline() {
        let mut game = sample_game();
        game.home_moneyline = Some(20);
        assert!(game.validate().is_err());
    }

    #[test]
    fn test_game_record_default_game_number() {
        let json = r#"{
            "date": "2023-04-01",
            "home_team": "NYY",
            "away_team": "BOS",
            "home_score": 5,
            "away_score": 3,
            "home_hits": 9,
            "home_errors": 0,
            "away_hits": 7,
            "away_errors": 1,
            "home_moneyline": -150,
            "away_moneyline": null
        }"#;
        let game: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(game.game_number, 1);
        assert_eq!(game.away_moneyline, None);
    }

    #[test]
    fn test_rolling_form_empty() {
        let form = RollingForm::empty();
        assert_eq!(form.games, 0);
        assert!(form.runs_scored.is_nan());
        assert!(form.pythag_win_pct.is_nan());
        assert!(!form.is_complete(1));
    }
}
