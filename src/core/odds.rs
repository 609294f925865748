//! American Odds Conversion
//!
//! Moneylines quote the profit on a 100 stake (positive, underdog) or the
//! stake needed to win 100 (negative, favorite).
//!
//! Implied probability:
//!     +o  ->  100 / (o + 100)
//!     -o  ->  o / (o + 100)
//!
//! Decimal payout multiplier (stake included):
//!     +o  ->  1 + o / 100
//!     -o  ->  1 + 100 / o

use crate::error::{validate_moneyline, Result};

/// Market-implied win probability of an American moneyline
///
/// # Examples
/// ```
/// use mlb_betting::core::odds::american_to_implied_prob;
/// assert!((american_to_implied_prob(150) - 0.40).abs() < 1e-12);
/// ```
pub fn american_to_implied_prob(odds: i32) -> f64 {
    let odds = f64::from(odds);
    if odds > 0.0 {
        100.0 / (odds + 100.0)
    } else {
        -odds / (-odds + 100.0)
    }
}

/// Decimal odds (total return per unit staked)
pub fn american_to_decimal(odds: i32) -> f64 {
    let odds = f64::from(odds);
    if odds > 0.0 {
        1.0 + odds / 100.0
    } else {
        1.0 + 100.0 / -odds
    }
}

/// Implied probability of an optional moneyline, rejecting values inside (-100, 100)
pub fn implied_prob_checked(odds: Option<i32>) -> Result<Option<f64>> {
    match odds {
        Some(o) => {
            validate_moneyline(o)?;
            Ok(Some(american_to_implied_prob(o)))
        }
        None => Ok(None),
    }
}

/// Model probability minus market probability
pub fn calculate_edge(predicted_prob: f64, implied_prob: f64) -> f64 {
    predicted_prob - implied_prob
}

/// Strictly greater than; an edge equal to the threshold is not a bet
pub fn should_bet(edge: f64, threshold: f64) -> bool {
    edge > threshold
}

/// Realized profit of one wager
pub fn settle(odds: i32, stake: f64, won: bool) -> f64 {
    if won {
        stake * (american_to_decimal(odds) - 1.0)
    } else {
        -stake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underdog_conversion() {
        assert!((american_to_implied_prob(150) - 0.40).abs() < 1e-12);
        assert!((american_to_decimal(150) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_favorite_conversion() {
        assert!((american_to_implied_prob(-200) - 200.0 / 300.0).abs() < 1e-12);
        assert!((american_to_decimal(-200) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_even_money() {
        assert!((american_to_implied_prob(100) - 0.5).abs() < 1e-12);
        assert!((american_to_implied_prob(-100) - 0.5).abs() < 1e-12);
        assert!((american_to_decimal(100) - 2.0).abs() < 1e-12);
        assert!((american_to_decimal(-100) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_implied_prob_checked() {
        assert_eq!(implied_prob_checked(None).unwrap(), None);
        assert!(implied_prob_checked(Some(50)).is_err());
        let p = implied_prob_checked(Some(300)).unwrap().unwrap();
        assert!((p - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_should_bet_is_strict() {
        assert!(!should_bet(0.25, 0.25));
        assert!(should_bet(0.25 + 1e-9, 0.25));
        assert!(!should_bet(-0.1, 0.05));
    }

    #[test]
    fn test_settle() {
        assert!((settle(150, 100.0, true) - 150.0).abs() < 1e-9);
        assert!((settle(-200, 100.0, true) - 50.0).abs() < 1e-9);
        assert_eq!(settle(-200, 100.0, false), -100.0);
    }
}
