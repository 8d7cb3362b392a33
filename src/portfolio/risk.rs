//! Portfolio risk scoring and metric tier classification.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{RiskTable, DEFAULT_RISK_SCORE};

use super::models::{Holding, TierRating};

/// Named bucket for the allocation-weighted portfolio risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskBand {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskBand::VeryLow => "Very Low",
            RiskBand::Low => "Low",
            RiskBand::Medium => "Medium",
            RiskBand::High => "High",
            RiskBand::VeryHigh => "Very High",
        };
        write!(f, "{label}")
    }
}

/// Allocation-weighted average of per-symbol risk scores.
///
/// Symbols absent from the table score [`DEFAULT_RISK_SCORE`]. With no
/// holdings, or with no risk table configured at all, the portfolio reads as
/// low risk with a zero score.
pub fn portfolio_risk(holdings: &[Holding], table: &RiskTable) -> (RiskBand, Decimal) {
    if holdings.is_empty() || table.is_empty() {
        return (RiskBand::Low, Decimal::ZERO);
    }

    let mut weighted_risk = Decimal::ZERO;
    let mut total_weight = Decimal::ZERO;
    for holding in holdings {
        weighted_risk += table.score(&holding.symbol) * holding.allocation;
        total_weight += holding.allocation;
    }

    let avg_score = if total_weight > Decimal::ZERO {
        weighted_risk / total_weight
    } else {
        Decimal::from(DEFAULT_RISK_SCORE)
    };

    (band_for_score(avg_score), avg_score.round_dp(1))
}

fn band_for_score(score: Decimal) -> RiskBand {
    if score < Decimal::from(60) {
        RiskBand::VeryLow
    } else if score < Decimal::from(70) {
        RiskBand::Low
    } else if score < Decimal::from(80) {
        RiskBand::Medium
    } else if score < Decimal::from(90) {
        RiskBand::High
    } else {
        RiskBand::VeryHigh
    }
}

/// Allocation-weighted annualized volatility estimate, in percent.
///
/// Uses `|7d change| * 3.7` per holding as a rough weekly-to-annual
/// conversion.
pub fn portfolio_volatility(holdings: &[Holding]) -> Decimal {
    if holdings.is_empty() {
        return Decimal::ZERO;
    }

    let weekly_to_annual = Decimal::new(37, 1);
    let mut weighted_volatility = Decimal::ZERO;
    let mut total_allocation = Decimal::ZERO;
    for holding in holdings {
        let annualized = holding.week_change.abs() * weekly_to_annual;
        weighted_volatility += annualized * holding.allocation;
        total_allocation += holding.allocation;
    }

    if total_allocation > Decimal::ZERO {
        (weighted_volatility / total_allocation).round_dp(1)
    } else {
        Decimal::ZERO
    }
}

/// The four headline metrics the risk analysis panel classifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskMetric {
    Volatility,
    Diversity,
    MaxDrawdown,
    SharpeRatio,
}

impl RiskMetric {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "volatility" => Some(RiskMetric::Volatility),
            "diversity" => Some(RiskMetric::Diversity),
            "max_drawdown" => Some(RiskMetric::MaxDrawdown),
            "sharpe_ratio" => Some(RiskMetric::SharpeRatio),
            _ => None,
        }
    }
}

/// Map a metric value to its named tier with the gauge styling.
///
/// Thresholds are inclusive of the upper bucket: a volatility of exactly 30
/// classifies as High.
pub fn classify_metric(value: f64, metric: RiskMetric) -> TierRating {
    match metric {
        RiskMetric::Volatility => {
            if value < 15.0 {
                TierRating::new("Low", "green", "40%")
            } else if value < 30.0 {
                TierRating::new("Medium", "yellow", "65%")
            } else {
                TierRating::new("High", "red", "80%")
            }
        }
        RiskMetric::Diversity => {
            if value < 4.0 {
                TierRating::new("Poor", "red", "35%")
            } else if value < 7.0 {
                TierRating::new("Medium", "yellow", "60%")
            } else {
                TierRating::new("Good", "green", "74%")
            }
        }
        RiskMetric::MaxDrawdown => {
            if value < 15.0 {
                TierRating::new("Low", "green", "40%")
            } else if value < 25.0 {
                TierRating::new("Medium", "yellow", "65%")
            } else {
                TierRating::new("High", "red", "80%")
            }
        }
        RiskMetric::SharpeRatio => {
            if value < 0.5 {
                TierRating::new("Poor", "red", "35%")
            } else if value < 1.0 {
                TierRating::new("Medium", "yellow", "50%")
            } else {
                TierRating::new("Good", "green", "68%")
            }
        }
    }
}

/// By-name variant of [`classify_metric`]; an unrecognized metric name gets
/// the neutral bucket instead of an error.
pub fn classify_metric_named(value: f64, metric: &str) -> TierRating {
    match RiskMetric::from_name(metric) {
        Some(metric) => classify_metric(value, metric),
        None => TierRating::new("Unknown", "gray", "50%"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CoinInfo;
    use rust_decimal_macros::dec;

    fn holding(symbol: &str, allocation: Decimal, week_change: Decimal) -> Holding {
        Holding {
            asset: symbol.to_string(),
            symbol: symbol.to_string(),
            holdings: Decimal::ONE,
            exchange: "Binance".to_string(),
            avg_price: Decimal::ONE,
            current_price: Decimal::ONE,
            value: Decimal::ONE,
            day_change: Decimal::ZERO,
            week_change,
            pnl_amount: Decimal::ZERO,
            pnl_percentage: Decimal::ZERO,
            allocation,
            coin_info: CoinInfo::fallback(symbol),
        }
    }

    fn risk_table(entries: &[(&str, Decimal)]) -> RiskTable {
        let mut table = RiskTable::default();
        for (symbol, score) in entries {
            table.0.insert(symbol.to_string(), *score);
        }
        table
    }

    #[test]
    fn empty_holdings_read_as_low_risk() {
        let table = risk_table(&[("BTC", dec!(70))]);
        assert_eq!(portfolio_risk(&[], &table), (RiskBand::Low, dec!(0)));
    }

    #[test]
    fn missing_risk_table_reads_as_low_risk() {
        let holdings = [holding("BTC", dec!(100), dec!(0))];
        assert_eq!(
            portfolio_risk(&holdings, &RiskTable::default()),
            (RiskBand::Low, dec!(0))
        );
    }

    #[test]
    fn risk_is_the_allocation_weighted_mean() {
        let table = risk_table(&[("BTC", dec!(60)), ("SHIB", dec!(95))]);
        let holdings = [
            holding("BTC", dec!(75), dec!(0)),
            holding("SHIB", dec!(25), dec!(0)),
        ];
        // 60*0.75 + 95*0.25 = 68.75
        let (band, score) = portfolio_risk(&holdings, &table);
        assert_eq!(score, dec!(68.8));
        assert_eq!(band, RiskBand::Low);
    }

    #[test]
    fn unknown_symbols_fall_back_to_default_score() {
        let table = risk_table(&[("BTC", dec!(60))]);
        let holdings = [holding("NEWCOIN", dec!(100), dec!(0))];
        let (band, score) = portfolio_risk(&holdings, &table);
        assert_eq!(score, dec!(85.0));
        assert_eq!(band, RiskBand::High);
    }

    #[test]
    fn band_thresholds() {
        assert_eq!(band_for_score(dec!(59.9)), RiskBand::VeryLow);
        assert_eq!(band_for_score(dec!(60)), RiskBand::Low);
        assert_eq!(band_for_score(dec!(79.9)), RiskBand::Medium);
        assert_eq!(band_for_score(dec!(90)), RiskBand::VeryHigh);
    }

    #[test]
    fn volatility_weights_absolute_week_change() {
        let holdings = [
            holding("BTC", dec!(50), dec!(-4)),
            holding("ETH", dec!(50), dec!(6)),
        ];
        // (4*3.7*50 + 6*3.7*50) / 100 = 18.5
        assert_eq!(portfolio_volatility(&holdings), dec!(18.5));
    }

    #[test]
    fn volatility_of_empty_portfolio_is_zero() {
        assert_eq!(portfolio_volatility(&[]), dec!(0));
    }

    #[test]
    fn volatility_threshold_is_inclusive_of_the_upper_bucket() {
        assert_eq!(classify_metric(29.0, RiskMetric::Volatility).level, "Medium");
        assert_eq!(classify_metric(30.0, RiskMetric::Volatility).level, "High");
    }

    #[test]
    fn sharpe_tiers() {
        assert_eq!(classify_metric(0.4, RiskMetric::SharpeRatio).level, "Poor");
        assert_eq!(classify_metric(0.5, RiskMetric::SharpeRatio).level, "Medium");
        assert_eq!(classify_metric(1.0, RiskMetric::SharpeRatio).level, "Good");
    }

    #[test]
    fn diversity_tiers_carry_gauge_styling() {
        let rating = classify_metric(8.2, RiskMetric::Diversity);
        assert_eq!(rating.level, "Good");
        assert_eq!(rating.color, "green");
        assert_eq!(rating.width, "74%");
    }

    #[test]
    fn unrecognized_metric_name_is_neutral() {
        let rating = classify_metric_named(50.0, "beta");
        assert_eq!(rating.level, "Unknown");
        assert_eq!(rating.color, "gray");
        assert_eq!(rating.width, "50%");
    }

    #[test]
    fn named_lookup_matches_enum_classification() {
        assert_eq!(
            classify_metric_named(12.0, "volatility"),
            classify_metric(12.0, RiskMetric::Volatility)
        );
        assert_eq!(
            classify_metric_named(20.0, "max_drawdown"),
            classify_metric(20.0, RiskMetric::MaxDrawdown)
        );
    }
}
