//! Profit/loss, diversification, and period-over-period change analytics.
//!
//! Pure functions over holdings and history snapshots; no I/O here.

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::warn;

use crate::models::HistorySnapshot;

use super::models::{Holding, PeriodChange, PeriodChanges, ProfitLoss};

/// How far a history entry may sit from the period target and still count.
const PERIOD_TOLERANCE_SECS: i64 = 86_400;

/// Sentinel all-time low reported when no history exists yet.
const ATL_SENTINEL: u32 = 99_999_999;

/// Overall profit/loss against the recorded cost basis, both fields 2dp.
pub fn profit_loss(current_value: Decimal, initial_investment: Decimal) -> ProfitLoss {
    let amount = current_value - initial_investment;
    let percentage = if initial_investment > Decimal::ZERO {
        amount / initial_investment * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    ProfitLoss {
        amount: amount.round_dp(2),
        percentage: percentage.round_dp(2),
    }
}

/// Diversity score on a 0-10 scale, higher meaning better spread.
///
/// Based on the Herfindahl-Hirschman concentration index over allocation
/// shares, normalized so that n equal allocations score 10.0 and a single
/// dominant asset trends toward 0. A one-asset portfolio scores 0.
pub fn diversity_score(holdings: &[Holding]) -> Decimal {
    let n = holdings.len();
    if n <= 1 {
        return Decimal::ZERO;
    }

    let hhi: Decimal = holdings
        .iter()
        .map(|h| {
            let share = h.allocation / Decimal::ONE_HUNDRED;
            share * share
        })
        .sum();

    let min_hhi = Decimal::ONE / Decimal::from(n);
    let normalized = (Decimal::ONE - hhi) / (Decimal::ONE - min_hhi);
    (normalized * Decimal::TEN).round_dp(1)
}

/// Min/max of history `total_value`, 2dp, with `(99999999, 0)` sentinels when
/// no snapshots exist yet.
pub fn all_time_low_high(history: &[HistorySnapshot]) -> (Decimal, Decimal) {
    let mut low = Decimal::from(ATL_SENTINEL);
    let mut high = Decimal::ZERO;
    for entry in history {
        if entry.total_value > high {
            high = entry.total_value;
        }
        if entry.total_value < low {
            low = entry.total_value;
        }
    }
    (low.round_dp(2), high.round_dp(2))
}

/// Value change over the 24h/7d/30d windows, measured against the history
/// entry closest to each window's target time.
///
/// The reference point is the newest snapshot, not the wall clock; `now` is
/// only the fallback timestamp for entries with an unparseable datetime.
pub fn period_changes(history: &[HistorySnapshot], now: NaiveDateTime) -> PeriodChanges {
    let mut entries = normalize_history(history, now);
    if entries.is_empty() {
        return PeriodChanges::default();
    }
    entries.sort_by(|a, b| b.0.cmp(&a.0));

    let (current_time, current_value) = entries[0];
    PeriodChanges {
        day: change_for_period(&entries, current_value, current_time, Duration::days(1)),
        week: change_for_period(&entries, current_value, current_time, Duration::days(7)),
        month: change_for_period(&entries, current_value, current_time, Duration::days(30)),
    }
}

/// Parse snapshot timestamps, substituting `now` for malformed ones.
fn normalize_history(history: &[HistorySnapshot], now: NaiveDateTime) -> Vec<(NaiveDateTime, Decimal)> {
    history
        .iter()
        .map(|entry| {
            let timestamp = entry.parsed_datetime().unwrap_or_else(|| {
                warn!(datetime = %entry.datetime, "Malformed history timestamp; using current time");
                now
            });
            (timestamp, entry.total_value)
        })
        .collect()
}

fn change_for_period(
    entries: &[(NaiveDateTime, Decimal)],
    current_value: Decimal,
    current_time: NaiveDateTime,
    delta: Duration,
) -> PeriodChange {
    let target = current_time - delta;

    let closest = entries
        .iter()
        .map(|(timestamp, value)| {
            let diff = (*timestamp - target).num_seconds().abs();
            (diff, *value)
        })
        .min_by_key(|(diff, _)| *diff);

    match closest {
        Some((diff, past_value)) if diff <= PERIOD_TOLERANCE_SECS => {
            let amount = current_value - past_value;
            let percentage = if !past_value.is_zero() {
                amount / past_value * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            };
            PeriodChange {
                amount: amount.round_dp(2),
                percentage: percentage.round_dp(2),
                is_positive: amount >= Decimal::ZERO,
            }
        }
        _ => PeriodChange::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CoinInfo;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn holding_with_allocation(symbol: &str, allocation: Decimal) -> Holding {
        Holding {
            asset: symbol.to_string(),
            symbol: symbol.to_string(),
            holdings: Decimal::ONE,
            exchange: "Binance".to_string(),
            avg_price: Decimal::ONE,
            current_price: Decimal::ONE,
            value: Decimal::ONE,
            day_change: Decimal::ZERO,
            week_change: Decimal::ZERO,
            pnl_amount: Decimal::ZERO,
            pnl_percentage: Decimal::ZERO,
            allocation,
            coin_info: CoinInfo::fallback(symbol),
        }
    }

    fn snapshot(datetime: &str, total_value: Decimal) -> HistorySnapshot {
        HistorySnapshot {
            datetime: datetime.to_string(),
            total_value,
            total_investment: dec!(1000),
            profit_loss: total_value - dec!(1000),
            profit_loss_percentage: dec!(0),
        }
    }

    fn noon(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn profit_loss_matches_worked_example() {
        // 0.5 BTC bought at 30000, now quoted at 40000.
        let pl = profit_loss(dec!(20000), dec!(15000));
        assert_eq!(pl.amount, dec!(5000.00));
        assert_eq!(pl.percentage, dec!(33.33));
    }

    #[test]
    fn profit_loss_with_no_investment_has_zero_percentage() {
        let pl = profit_loss(dec!(500), dec!(0));
        assert_eq!(pl.amount, dec!(500.00));
        assert_eq!(pl.percentage, dec!(0));
    }

    #[test]
    fn equal_allocations_score_maximum_diversity() {
        let holdings = [
            holding_with_allocation("BTC", dec!(25)),
            holding_with_allocation("ETH", dec!(25)),
            holding_with_allocation("SOL", dec!(25)),
            holding_with_allocation("DOT", dec!(25)),
        ];
        assert_eq!(diversity_score(&holdings), dec!(10.0));
    }

    #[test]
    fn concentration_drives_diversity_toward_zero() {
        let holdings = [
            holding_with_allocation("BTC", dec!(99)),
            holding_with_allocation("ETH", dec!(1)),
        ];
        assert!(diversity_score(&holdings) < dec!(0.5));
    }

    #[test]
    fn single_asset_scores_zero() {
        let holdings = [holding_with_allocation("BTC", dec!(100))];
        assert_eq!(diversity_score(&holdings), dec!(0));
        assert_eq!(diversity_score(&[]), dec!(0));
    }

    #[test]
    fn all_time_extremes_come_from_history() {
        let history = vec![
            snapshot("2025-01-01 12:00:00", dec!(900)),
            snapshot("2025-01-02 12:00:00", dec!(1500)),
            snapshot("2025-01-03 12:00:00", dec!(1200)),
        ];
        assert_eq!(all_time_low_high(&history), (dec!(900.00), dec!(1500.00)));
    }

    #[test]
    fn empty_history_returns_sentinels() {
        assert_eq!(all_time_low_high(&[]), (dec!(99999999), dec!(0)));
    }

    #[test]
    fn day_change_picks_the_entry_closest_to_24h_back() {
        let history = vec![
            snapshot("2025-03-01 12:00:00", dec!(1210)),
            snapshot("2025-02-28 11:30:00", dec!(1100)),
            snapshot("2025-02-22 12:00:00", dec!(1000)),
        ];
        let changes = period_changes(&history, noon(2025, 3, 1));

        assert_eq!(changes.day.amount, dec!(110.00));
        assert_eq!(changes.day.percentage, dec!(10.00));
        assert!(changes.day.is_positive);

        assert_eq!(changes.week.amount, dec!(210.00));
        assert_eq!(changes.week.percentage, dec!(21.00));
    }

    #[test]
    fn period_without_a_close_enough_entry_reads_neutral() {
        // Only two entries, five days apart: nothing near the 30d target.
        let history = vec![
            snapshot("2025-03-01 12:00:00", dec!(1210)),
            snapshot("2025-02-24 12:00:00", dec!(1100)),
        ];
        let changes = period_changes(&history, noon(2025, 3, 1));

        assert_eq!(changes.month, PeriodChange::default());
        assert!(changes.month.is_positive);
    }

    #[test]
    fn empty_history_reads_neutral_everywhere() {
        let changes = period_changes(&[], noon(2025, 3, 1));
        assert_eq!(changes.day, PeriodChange::default());
        assert_eq!(changes.week, PeriodChange::default());
        assert_eq!(changes.month, PeriodChange::default());
    }

    #[test]
    fn malformed_timestamp_degrades_to_now() {
        let history = vec![
            snapshot("2025-03-01 12:00:00", dec!(1210)),
            snapshot("not-a-date", dec!(1100)),
        ];
        // The malformed entry lands on `now` (the latest instant), so it
        // becomes the newest snapshot rather than being dropped; the 24h
        // reference is then the well-formed entry a day before it.
        let changes = period_changes(&history, noon(2025, 3, 2));
        assert_eq!(changes.day.amount, dec!(-110.00));
        assert!(!changes.day.is_positive);
    }
}
