//! Betting Decision Simulator
//!
//! Flat-stake strategy: bet a row's team whenever the model's win probability
//! beats the closing-line implied probability by more than the threshold.

use super::metrics::{calculate_metrics, BacktestMetrics};
use crate::core::odds::{calculate_edge, implied_prob_checked, settle, should_bet};
use crate::error::{validate_probability, PipelineError, Result};
use crate::models::{BettingDecision, TrainingRow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BettingConfig {
    /// Minimum edge; a bet needs edge strictly above it
    pub threshold: f64,
    /// Flat stake per bet
    pub stake: f64,
}

impl Default for BettingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            stake: 100.0,
        }
    }
}

/// Simulation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BettingResult {
    /// One decision per input row, bet or not
    pub decisions: Vec<BettingDecision>,
    pub total_rows: usize,
    pub rows_with_odds: usize,
    pub total_bets: usize,
    pub total_stake: f64,
    pub total_profit: f64,
    pub metrics: Option<BacktestMetrics>,
}

impl BettingResult {
    pub fn new() -> Self {
        Self {
            decisions: Vec::new(),
            total_rows: 0,
            rows_with_odds: 0,
            total_bets: 0,
            total_stake: 0.0,
            total_profit: 0.0,
            metrics: None,
        }
    }

    /// Return on investment in percent; 0 when nothing was staked
    pub fn roi(&self) -> f64 {
        if self.total_bets == 0 || self.total_stake == 0.0 {
            0.0
        } else {
            self.total_profit / self.total_stake * 100.0
        }
    }

    /// Decisions where a wager was placed, in input order
    pub fn bets(&self) -> impl Iterator<Item = &BettingDecision> {
        self.decisions.iter().filter(|d| d.bet_placed)
    }

    pub fn finalize(&mut self) {
        let bets: Vec<BettingDecision> = self.bets().cloned().collect();
        self.metrics = Some(calculate_metrics(&bets));
    }

    pub fn print_summary(&self) {
        println!("{}", "=".repeat(60));
        println!("Betting Simulation Summary");
        println!("{}", "=".repeat(60));
        println!("Rows evaluated:    {}", self.total_rows);
        println!("Rows with odds:    {}", self.rows_with_odds);
        println!("Bets placed:       {}", self.total_bets);
        println!("Total staked:      {:.2}", self.total_stake);
        println!("Total profit:      {:+.2}", self.total_profit);
        println!("ROI:               {:+.2}%", self.roi());
        if let Some(ref m) = self.metrics {
            if m.total_bets > 0 {
                println!("{}", "-".repeat(60));
                println!("Hit rate:          {:.1}%", m.hit_rate * 100.0);
                println!("Average edge:      {:.3}", m.avg_edge);
                println!("Average odds:      {:.2}", m.avg_odds);
                println!("Profit factor:     {:.2}", m.profit_factor);
                println!("Max drawdown:      {:.2}", m.max_drawdown);
            }
        }
        println!("{}", "=".repeat(60));
    }
}

impl Default for BettingResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Betting simulator
pub struct BettingSimulator {
    pub config: BettingConfig,
}

impl BettingSimulator {
    pub fn new(config: BettingConfig) -> Self {
        Self { config }
    }

    /// Decide and settle a single row
    pub fn decide(&self, row: &TrainingRow, predicted_prob: f64) -> Result<BettingDecision> {
        validate_probability(predicted_prob)?;
        let obs = &row.observation;

        let vegas_prob = implied_prob_checked(obs.moneyline_closing)?;
        let edge = vegas_prob.map(|v| calculate_edge(predicted_prob, v));
        let won = obs.result == 1;

        let (bet_placed, stake, pnl) = match (obs.moneyline_closing, edge) {
            (Some(odds), Some(e)) if should_bet(e, self.config.threshold) => {
                (true, self.config.stake, settle(odds, self.config.stake, won))
            }
            _ => (false, 0.0, 0.0),
        };

        Ok(BettingDecision {
            date: obs.date,
            team: obs.team.clone(),
            opponent: obs.opponent.clone(),
            predicted_prob,
            moneyline: obs.moneyline_closing,
            vegas_prob,
            edge,
            bet_placed,
            won,
            stake,
            pnl,
        })
    }

    /// Run the strategy over rows paired with their predicted probabilities
    pub fn run(&self, rows: &[TrainingRow], probabilities: &[f64]) -> Result<BettingResult> {
        if rows.len() != probabilities.len() {
            return Err(PipelineError::Validation(format!(
                "Got {} predictions for {} rows",
                probabilities.len(),
                rows.len()
            )));
        }
        if self.config.stake.is_nan() || self.config.stake <= 0.0 {
            return Err(PipelineError::Validation(format!(
                "Stake must be positive, got {}",
                self.config.stake
            )));
        }

        let mut result = BettingResult::new();
        for (row, &prob) in rows.iter().zip(probabilities) {
            let decision = self.decide(row, prob)?;

            result.total_rows += 1;
            if decision.vegas_prob.is_some() {
                result.rows_with_odds += 1;
            }
            if decision.bet_placed {
                debug!(
                    "Bet {} vs {} on {}: edge {:.3}, pnl {:+.2}",
                    decision.team,
                    decision.opponent,
                    decision.date,
                    decision.edge.unwrap_or(f64::NAN),
                    decision.pnl
                );
                result.total_bets += 1;
                result.total_stake += decision.stake;
                result.total_profit += decision.pnl;
            }
            result.decisions.push(decision);
        }

        result.finalize();
        info!(
            "Simulated {} rows: {} bets, profit {:+.2}, ROI {:+.2}%",
            result.total_rows,
            result.total_bets,
            result.total_profit,
            result.roi()
        );
        Ok(result)
    }
}
