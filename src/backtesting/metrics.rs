//! Backtest Metrics
//!
//! Hit rate, profit factor, drawdown and per-dimension breakdowns of placed bets.

use crate::core::odds::american_to_decimal;
use crate::models::BettingDecision;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Backtest evaluation metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestMetrics {
    // Basic metrics
    pub total_bets: usize,
    pub winning_bets: usize,
    pub hit_rate: f64,
    /// Percent
    pub roi: f64,

    // Edge related
    pub avg_edge: f64,
    /// Decimal odds
    pub avg_odds: f64,
    pub avg_probability: f64,

    // Risk metrics
    pub profit_factor: f64,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,

    // Win/Loss
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub net_profit: f64,
}

impl Default for BacktestMetrics {
    fn default() -> Self {
        Self {
            total_bets: 0,
            winning_bets: 0,
            hit_rate: 0.0,
            roi: 0.0,
            avg_edge: 0.0,
            avg_odds: 0.0,
            avg_probability: 0.0,
            profit_factor: 0.0,
            max_drawdown: 0.0,
            max_drawdown_pct: 0.0,
            gross_profit: 0.0,
            gross_loss: 0.0,
            net_profit: 0.0,
        }
    }
}

fn decimal_odds(bet: &BettingDecision) -> f64 {
    bet.moneyline.map(american_to_decimal).unwrap_or(f64::NAN)
}

/// Calculate metrics from placed bets, in settlement order
pub fn calculate_metrics(bets: &[BettingDecision]) -> BacktestMetrics {
    if bets.is_empty() {
        return BacktestMetrics::default();
    }

    let total_bets = bets.len();
    let n = total_bets as f64;
    let winning_bets = bets.iter().filter(|b| b.won).count();
    let hit_rate = winning_bets as f64 / n;

    let avg_edge = bets.iter().filter_map(|b| b.edge).sum::<f64>() / n;
    let avg_odds = bets.iter().map(decimal_odds).sum::<f64>() / n;
    let avg_probability = bets.iter().map(|b| b.predicted_prob).sum::<f64>() / n;

    // Profit/Loss calculation
    let gross_profit: f64 = bets.iter().map(|b| b.pnl).filter(|&p| p > 0.0).sum();
    let gross_loss: f64 = bets.iter().map(|b| b.pnl).filter(|&p| p < 0.0).map(f64::abs).sum();
    let net_profit: f64 = bets.iter().map(|b| b.pnl).sum();
    let total_stake: f64 = bets.iter().map(|b| b.stake).sum();

    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    // Drawdown from the running peak of cumulative profit
    let mut cumulative = 0.0;
    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0f64;
    for bet in bets {
        cumulative += bet.pnl;
        peak = peak.max(cumulative);
        max_drawdown = max_drawdown.max(peak - cumulative);
    }

    let max_drawdown_pct = if total_stake > 0.0 {
        max_drawdown / total_stake
    } else {
        0.0
    };

    let roi = if total_stake > 0.0 {
        net_profit / total_stake * 100.0
    } else {
        0.0
    };

    BacktestMetrics {
        total_bets,
        winning_bets,
        hit_rate,
        roi,
        avg_edge,
        avg_odds,
        avg_probability,
        profit_factor,
        max_drawdown,
        max_drawdown_pct,
        gross_profit,
        gross_loss,
        net_profit,
    }
}

/// Analysis results by dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionAnalysis {
    pub key: String,
    pub bets: usize,
    pub wins: usize,
    pub hit_rate: f64,
    pub stake: f64,
    pub profit: f64,
    /// Percent
    pub roi: f64,
}

fn analyze_groups(grouped: BTreeMap<String, Vec<&BettingDecision>>) -> Vec<DimensionAnalysis> {
    grouped
        .into_iter()
        .map(|(key, group)| {
            let total = group.len();
            let wins = group.iter().filter(|b| b.won).count();
            let stake: f64 = group.iter().map(|b| b.stake).sum();
            let profit: f64 = group.iter().map(|b| b.pnl).sum();

            DimensionAnalysis {
                key,
                bets: total,
                wins,
                hit_rate: if total > 0 {
                    wins as f64 / total as f64
                } else {
                    0.0
                },
                stake,
                profit,
                roi: if stake > 0.0 {
                    profit / stake * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect()
}

/// Analyze bet results by the team backed
pub fn analyze_by_team(bets: &[BettingDecision]) -> Vec<DimensionAnalysis> {
    let mut grouped: BTreeMap<String, Vec<&BettingDecision>> = BTreeMap::new();
    for bet in bets {
        grouped.entry(bet.team.clone()).or_default().push(bet);
    }
    analyze_groups(grouped)
}

/// Bucket a moneyline into favorite / short underdog / long underdog
pub fn odds_range(moneyline: i32) -> &'static str {
    if moneyline < 0 {
        "favorite (<0)"
    } else if moneyline <= 150 {
        "short dog (+100 to +150)"
    } else {
        "long dog (>+150)"
    }
}

/// Analyze bet results by odds range
pub fn analyze_by_odds_range(bets: &[BettingDecision]) -> Vec<DimensionAnalysis> {
    let mut grouped: BTreeMap<String, Vec<&BettingDecision>> = BTreeMap::new();
    for bet in bets {
        if let Some(ml) = bet.moneyline {
            grouped.entry(odds_range(ml).to_string()).or_default().push(bet);
        }
    }
    analyze_groups(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bet(team: &str, moneyline: i32, won: bool, pnl: f64) -> BettingDecision {
        BettingDecision {
            date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            team: team.to_string(),
            opponent: "TEX".to_string(),
            predicted_prob: 0.6,
            moneyline: Some(moneyline),
            vegas_prob: Some(0.5),
            edge: Some(0.1),
            bet_placed: true,
            won,
            stake: 100.0,
            pnl,
        }
    }

    fn create_test_bets() -> Vec<BettingDecision> {
        vec![
            bet("HOU", 150, true, 150.0),
            bet("HOU", -120, false, -100.0),
            bet("SEA", 200, true, 200.0),
        ]
    }

    #[test]
    fn test_calculate_metrics() {
        let metrics = calculate_metrics(&create_test_bets());

        assert_eq!(metrics.total_bets, 3);
        assert_eq!(metrics.winning_bets, 2);
        assert!((metrics.hit_rate - 0.6667).abs() < 0.01);
        assert_eq!(metrics.gross_profit, 350.0);
        assert_eq!(metrics.gross_loss, 100.0);
        assert_eq!(metrics.net_profit, 250.0);
        assert!((metrics.profit_factor - 3.5).abs() < 1e-12);
        assert!((metrics.roi - 250.0 / 300.0 * 100.0).abs() < 1e-9);
        assert!((metrics.avg_edge - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_calculate_metrics_empty() {
        let metrics = calculate_metrics(&[]);

        assert_eq!(metrics.total_bets, 0);
        assert_eq!(metrics.winning_bets, 0);
        assert_eq!(metrics.hit_rate, 0.0);
        assert_eq!(metrics.roi, 0.0);
    }

    #[test]
    fn test_analyze_by_team() {
        let analysis = analyze_by_team(&create_test_bets());

        assert_eq!(analysis.len(), 2);
        let hou = analysis.iter().find(|a| a.key == "HOU").unwrap();
        assert_eq!(hou.bets, 2);
        assert_eq!(hou.wins, 1);
        assert_eq!(hou.profit, 50.0);

        let sea = analysis.iter().find(|a| a.key == "SEA").unwrap();
        assert_eq!(sea.bets, 1);
        assert_eq!(sea.roi, 200.0);
    }

    #[test]
    fn test_analyze_by_odds_range() {
        let analysis = analyze_by_odds_range(&create_test_bets());

        assert_eq!(analysis.len(), 3);
        assert!(analysis.iter().any(|a| a.key == "favorite (<0)" && a.bets == 1));
        assert!(analysis.iter().any(|a| a.key == "short dog (+100 to +150)" && a.wins == 1));
        assert!(analysis.iter().any(|a| a.key == "long dog (>+150)" && a.wins == 1));
    }

    #[test]
    fn test_max_drawdown() {
        let bets = vec![
            bet("NYM", 100, true, 100.0),
            bet("NYM", -150, false, -100.0),
            bet("NYM", -150, false, -100.0),
            bet("NYM", 120, true, 120.0),
        ];
        let metrics = calculate_metrics(&bets);

        // Cumulative: 100, 0, -100, 20 -> peak 100, deepest -100
        assert_eq!(metrics.max_drawdown, 200.0);
    }
}
