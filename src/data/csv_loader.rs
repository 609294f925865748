//! CSV loading for completed games
//!
//! Expected columns: `date, home_team, away_team, home_score, away_score,
//! home_hits, home_errors, away_hits, away_errors, home_moneyline,
//! away_moneyline` and optionally `game_number`.

use chrono::NaiveDate;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

use crate::data::teams::require_team;
use crate::error::{PipelineError, Result};
use crate::models::GameRecord;

/// Read a column as nullable integers, whatever dtype polars inferred
///
/// Fractional numbers and non-numeric text are rejected, not truncated or nulled.
fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = df.column(name)?;
    if series.dtype().is_float() {
        let values = series.cast(&DataType::Float64)?;
        for (i, v) in values.f64()?.into_iter().enumerate() {
            if let Some(v) = v.filter(|v| v.fract() != 0.0 || !v.is_finite()) {
                return Err(PipelineError::Validation(format!(
                    "row {}: {} must be a whole number, got {}",
                    i, name, v
                )));
            }
        }
    }
    let series = series.strict_cast(&DataType::Int64).map_err(|e| {
        PipelineError::Validation(format!("column {}: expected integers: {}", name, e))
    })?;
    Ok(series.i64()?.into_iter().collect())
}

fn str_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let series = df.column(name)?.cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

fn required<T>(value: Option<T>, row: usize, column: &str) -> Result<T> {
    value.ok_or_else(|| PipelineError::Validation(format!("row {}: missing {}", row, column)))
}

fn count(value: Option<i64>, row: usize, column: &str) -> Result<u32> {
    let v = required(value, row, column)?;
    u32::try_from(v).map_err(|_| {
        PipelineError::Validation(format!("row {}: {} must be non-negative, got {}", row, column, v))
    })
}

fn moneyline(value: Option<i64>, row: usize, column: &str) -> Result<Option<i32>> {
    value
        .map(|v| {
            i32::try_from(v).map_err(|_| {
                PipelineError::Validation(format!("row {}: {} out of range: {}", row, column, v))
            })
        })
        .transpose()
}

/// Load all games from a CSV file, resolving team names to canonical codes
pub fn load_games<P: AsRef<Path>>(csv_path: P) -> Result<Vec<GameRecord>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(csv_path.as_ref().to_path_buf()))?
        .finish()?;

    let games = dataframe_to_games(&df)?;
    info!(
        "Loaded {} games from {:?}",
        games.len(),
        csv_path.as_ref()
    );
    Ok(games)
}

/// Convert a DataFrame to GameRecords
pub fn dataframe_to_games(df: &DataFrame) -> Result<Vec<GameRecord>> {
    let dates = str_column(df, "date")?;
    let home_teams = str_column(df, "home_team")?;
    let away_teams = str_column(df, "away_team")?;
    let home_scores = int_column(df, "home_score")?;
    let away_scores = int_column(df, "away_score")?;
    let home_hits = int_column(df, "home_hits")?;
    let home_errors = int_column(df, "home_errors")?;
    let away_hits = int_column(df, "away_hits")?;
    let away_errors = int_column(df, "away_errors")?;
    let home_moneylines = int_column(df, "home_moneyline")?;
    let away_moneylines = int_column(df, "away_moneyline")?;
    let game_numbers = match df.column("game_number") {
        Ok(_) => Some(int_column(df, "game_number")?),
        Err(_) => None,
    };

    let mut games = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let raw_date = required(dates[i].as_deref(), i, "date")?;
        let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d").map_err(|e| {
            PipelineError::Validation(format!("row {}: bad date {:?}: {}", i, raw_date, e))
        })?;

        let game_number = match &game_numbers {
            Some(col) => match col[i] {
                Some(n) => u8::try_from(n).map_err(|_| {
                    PipelineError::Validation(format!("row {}: bad game_number {}", i, n))
                })?,
                None => 1,
            },
            None => 1,
        };

        let game = GameRecord {
            date,
            game_number,
            home_team: require_team(required(home_teams[i].as_deref(), i, "home_team")?)?
                .to_string(),
            away_team: require_team(required(away_teams[i].as_deref(), i, "away_team")?)?
                .to_string(),
            home_score: count(home_scores[i], i, "home_score")?,
            away_score: count(away_scores[i], i, "away_score")?,
            home_hits: count(home_hits[i], i, "home_hits")?,
            home_errors: count(home_errors[i], i, "home_errors")?,
            away_hits: count(away_hits[i], i, "away_hits")?,
            away_errors: count(away_errors[i], i, "away_errors")?,
            home_moneyline: moneyline(home_moneylines[i], i, "home_moneyline")?,
            away_moneyline: moneyline(away_moneylines[i], i, "away_moneyline")?,
        };
        game.validate()?;
        games.push(game);
    }

    Ok(games)
}
