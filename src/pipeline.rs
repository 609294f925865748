//! End-to-end runs
//!
//! games -> team-centric -> rolling form -> matchup -> finalize -> model -> simulator

use tracing::info;

use crate::backtesting::{BettingResult, BettingSimulator};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::{
    calculate_matchup_features, calculate_rolling_features, create_team_centric,
    finalize_training_data, finalize_with_encoding, TeamEncoding, TrainingSet,
};
use crate::model::{BettingModel, FittedModel, ParameterSummary};
use crate::models::{FeatureRow, GameRecord};

/// Output of one scored and simulated run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub training: TrainingSet,
    /// Posterior-predictive win probability per training row
    pub probabilities: Vec<f64>,
    pub betting: BettingResult,
    pub summary: Vec<ParameterSummary>,
}

fn engineer(games: &[GameRecord], config: &PipelineConfig) -> Result<Vec<FeatureRow>> {
    let observations = create_team_centric(games)?;
    let form = calculate_rolling_features(&observations, config.window)?;
    Ok(calculate_matchup_features(&form, config.window, config.rest_days_default))
}

/// Feature pipeline with a freshly fitted team encoding
pub fn build_features(games: &[GameRecord], config: &PipelineConfig) -> Result<TrainingSet> {
    let features = engineer(games, config)?;
    Ok(finalize_training_data(&features, config.window))
}

/// Feature pipeline reusing an existing team encoding
pub fn build_features_with_encoding(
    games: &[GameRecord],
    config: &PipelineConfig,
    encoding: &TeamEncoding,
) -> Result<TrainingSet> {
    let features = engineer(games, config)?;
    Ok(finalize_with_encoding(&features, config.window, encoding))
}

/// Build features, fit the model and write the artifact to `config.model_path`
pub fn train(games: &[GameRecord], config: &PipelineConfig) -> Result<(TrainingSet, FittedModel)> {
    config.validate()?;
    let training = build_features(games, config)?;

    let mut model = BettingModel::new(&config.model_path);
    let fitted = model
        .train(
            &training,
            &config.feature_columns(),
            &config.target_column,
            &config.sampler,
        )?
        .clone();

    for p in fitted.summary() {
        info!("{:<32} mean {:+.4}  sd {:.4}", p.name, p.mean, p.sd);
    }
    Ok((training, fitted))
}

/// Train, score the training rows in-sample and simulate betting on them
pub fn run(games: &[GameRecord], config: &PipelineConfig) -> Result<PipelineRun> {
    let (training, fitted) = train(games, config)?;
    let columns = config.feature_columns();
    let probabilities = fitted.predict(&training, &columns)?;

    let betting = BettingSimulator::new(config.betting.clone()).run(&training.rows, &probabilities)?;
    Ok(PipelineRun {
        summary: fitted.summary(),
        training,
        probabilities,
        betting,
    })
}

/// Score games with the artifact at `config.model_path` and simulate betting
pub fn predict_with_saved_model(
    games: &[GameRecord],
    config: &PipelineConfig,
) -> Result<PipelineRun> {
    config.validate()?;
    let mut model = BettingModel::new(&config.model_path);
    let fitted = model.load()?;

    let scored = build_features_with_encoding(games, config, &fitted.encoding)?;
    let columns = config.feature_columns();
    let probabilities = fitted.predict(&scored, &columns)?;
    let summary = fitted.summary();

    let betting = BettingSimulator::new(config.betting.clone()).run(&scored.rows, &probabilities)?;
    Ok(PipelineRun {
        training: scored,
        probabilities,
        betting,
        summary,
    })
}
