//! Time-series performance metrics and chart bucketing over the valuation
//! history.
//!
//! The statistical series math runs in `f64`; monetary fields stay `Decimal`.

use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use tracing::warn;

use crate::models::HistorySnapshot;

use super::models::{ChartData, ChartPoint};

/// Annualized risk-free rate assumed for the Sharpe ratio, spread over 252
/// trading days.
const DAILY_RISK_FREE_RATE: f64 = 0.02 / 252.0;

/// Max drawdown (percent) and annualized Sharpe ratio of the valuation
/// series, both 2dp.
///
/// Returns are taken day-over-day on the chronologically sorted series; a
/// snapshot with an unparseable timestamp sorts at `now`. With fewer than two
/// snapshots both metrics read 0; the Sharpe ratio also reads 0 when the
/// return deviation is zero or undefined.
pub fn drawdown_and_sharpe(history: &[HistorySnapshot], now: NaiveDateTime) -> (f64, f64) {
    let mut series: Vec<(NaiveDateTime, f64)> = history
        .iter()
        .map(|entry| {
            let timestamp = timestamp_or_fallback(entry, now);
            (timestamp, entry.total_value.to_f64().unwrap_or(0.0))
        })
        .collect();
    series.sort_by_key(|(timestamp, _)| *timestamp);

    if series.len() < 2 {
        return (0.0, 0.0);
    }

    let returns: Vec<f64> = series
        .windows(2)
        .map(|pair| {
            let (_, previous) = pair[0];
            let (_, current) = pair[1];
            if previous != 0.0 {
                current / previous - 1.0
            } else {
                0.0
            }
        })
        .collect();

    (max_drawdown(&returns), sharpe_ratio(&returns))
}

fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut running_max = f64::MIN;
    let mut worst_drawdown: f64 = 0.0;

    for r in returns {
        cumulative *= 1.0 + r;
        running_max = running_max.max(cumulative);
        let drawdown = cumulative / running_max - 1.0;
        worst_drawdown = worst_drawdown.min(drawdown);
    }

    let drawdown_pct = worst_drawdown.abs() * 100.0;
    if drawdown_pct.is_finite() {
        round_2dp(drawdown_pct)
    } else {
        0.0
    }
}

fn sharpe_ratio(returns: &[f64]) -> f64 {
    let n = returns.len();
    if n < 2 {
        return 0.0;
    }

    let mean = returns.iter().sum::<f64>() / n as f64;
    // Sample standard deviation, matching the usual daily-return convention.
    let variance = returns
        .iter()
        .map(|r| (r - mean).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return 0.0;
    }

    let sharpe = (mean - DAILY_RISK_FREE_RATE) / std_dev * (252.0_f64).sqrt();
    if sharpe.is_finite() {
        round_2dp(sharpe)
    } else {
        0.0
    }
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bucket history snapshots into the chart's selectable time windows.
///
/// Window membership uses inclusive whole-day thresholds against `now`
/// (1, 7, 30, 90, 365 days); every snapshot lands in `All` plus each window
/// it satisfies. Each window is independently sorted ascending by timestamp.
pub fn chart_series(history: &[HistorySnapshot], now: NaiveDateTime) -> ChartData {
    let mut chart = ChartData::default();

    for entry in history {
        let timestamp = timestamp_or_fallback(entry, now);
        let point = ChartPoint {
            x: timestamp.and_utc().timestamp_millis(),
            total_value: entry.total_value,
            total_investment: entry.total_investment,
            profit_loss: entry.profit_loss,
            profit_loss_percentage: entry.profit_loss_percentage,
        };

        let days_old = (now - timestamp).num_days();

        chart.all.push(point.clone());
        if days_old <= 365 {
            chart.one_year.push(point.clone());
        }
        if days_old <= 90 {
            chart.three_months.push(point.clone());
        }
        if days_old <= 30 {
            chart.one_month.push(point.clone());
        }
        if days_old <= 7 {
            chart.one_week.push(point.clone());
        }
        if days_old <= 1 {
            chart.one_day.push(point);
        }
    }

    for window in [
        &mut chart.one_day,
        &mut chart.one_week,
        &mut chart.one_month,
        &mut chart.three_months,
        &mut chart.one_year,
        &mut chart.all,
    ] {
        window.sort_by_key(|point| point.x);
    }

    chart
}

fn timestamp_or_fallback(entry: &HistorySnapshot, now: NaiveDateTime) -> NaiveDateTime {
    entry.parsed_datetime().unwrap_or_else(|| {
        warn!(datetime = %entry.datetime, "Malformed history timestamp; using current time");
        now
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

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
    fn monotonic_rise_has_zero_drawdown() {
        let history = vec![
            snapshot("2025-01-01 12:00:00", dec!(1000)),
            snapshot("2025-01-02 12:00:00", dec!(1100)),
        ];
        let (drawdown, _) = drawdown_and_sharpe(&history, noon(2025, 1, 3));
        assert_eq!(drawdown, 0.0);
    }

    #[test]
    fn short_history_yields_zero_metrics() {
        assert_eq!(drawdown_and_sharpe(&[], noon(2025, 1, 1)), (0.0, 0.0));

        let single = vec![snapshot("2025-01-01 12:00:00", dec!(1000))];
        assert_eq!(drawdown_and_sharpe(&single, noon(2025, 1, 2)), (0.0, 0.0));
    }

    #[test]
    fn flat_series_has_zero_sharpe() {
        // Two identical values: one return of exactly zero, no deviation.
        let history = vec![
            snapshot("2025-01-01 12:00:00", dec!(1000)),
            snapshot("2025-01-02 12:00:00", dec!(1000)),
        ];
        let (_, sharpe) = drawdown_and_sharpe(&history, noon(2025, 1, 3));
        assert_eq!(sharpe, 0.0);
    }

    #[test]
    fn drawdown_measures_the_peak_to_trough_loss() {
        // 1000 -> 1200 -> 900 -> 1100: trough is 25% below the 1200 peak.
        let history = vec![
            snapshot("2025-01-01 12:00:00", dec!(1000)),
            snapshot("2025-01-02 12:00:00", dec!(1200)),
            snapshot("2025-01-03 12:00:00", dec!(900)),
            snapshot("2025-01-04 12:00:00", dec!(1100)),
        ];
        let (drawdown, _) = drawdown_and_sharpe(&history, noon(2025, 1, 5));
        assert_eq!(drawdown, 25.0);
    }

    #[test]
    fn unsorted_history_is_ordered_before_computing_returns() {
        let rising = vec![
            snapshot("2025-01-02 12:00:00", dec!(1100)),
            snapshot("2025-01-01 12:00:00", dec!(1000)),
            snapshot("2025-01-03 12:00:00", dec!(1210)),
        ];
        let (drawdown, sharpe) = drawdown_and_sharpe(&rising, noon(2025, 1, 4));
        assert_eq!(drawdown, 0.0);
        // Two equal +10% returns: zero deviation, Sharpe degrades to 0.
        assert_eq!(sharpe, 0.0);
    }

    #[test]
    fn sharpe_is_computed_for_a_varied_series() {
        let history = vec![
            snapshot("2025-01-01 12:00:00", dec!(1000)),
            snapshot("2025-01-02 12:00:00", dec!(1100)),
            snapshot("2025-01-03 12:00:00", dec!(1150)),
        ];
        let (_, sharpe) = drawdown_and_sharpe(&history, noon(2025, 1, 4));
        // Returns 0.1 and 0.0454..., both well above the daily risk-free rate.
        assert!(sharpe > 0.0);
    }

    #[test]
    fn chart_windows_nest_by_age() {
        let now = noon(2025, 3, 1);
        let history = vec![
            snapshot("2025-03-01 10:00:00", dec!(1210)),
            snapshot("2025-02-25 12:00:00", dec!(1150)),
            snapshot("2025-02-10 12:00:00", dec!(1100)),
            snapshot("2024-12-20 12:00:00", dec!(1050)),
            snapshot("2023-06-01 12:00:00", dec!(1000)),
        ];

        let chart = chart_series(&history, now);
        assert_eq!(chart.one_day.len(), 1);
        assert_eq!(chart.one_week.len(), 2);
        assert_eq!(chart.one_month.len(), 3);
        assert_eq!(chart.three_months.len(), 4);
        assert_eq!(chart.one_year.len(), 4);
        assert_eq!(chart.all.len(), 5);
    }

    #[test]
    fn windows_are_sorted_ascending_by_timestamp() {
        let now = noon(2025, 3, 1);
        let history = vec![
            snapshot("2025-02-28 12:00:00", dec!(1150)),
            snapshot("2025-02-26 12:00:00", dec!(1100)),
            snapshot("2025-02-27 12:00:00", dec!(1210)),
        ];

        let chart = chart_series(&history, now);
        let xs: Vec<i64> = chart.one_week.iter().map(|p| p.x).collect();
        let mut sorted = xs.clone();
        sorted.sort();
        assert_eq!(xs, sorted);
        assert_eq!(chart.one_week.len(), 3);
    }

    #[test]
    fn chart_points_carry_epoch_millis() {
        let now = noon(2025, 3, 1);
        let history = vec![snapshot("2025-03-01 10:00:00", dec!(1210))];

        let chart = chart_series(&history, now);
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert_eq!(chart.all[0].x, expected);
        assert_eq!(chart.all[0].total_value, dec!(1210));
    }

    #[test]
    fn malformed_timestamp_falls_back_to_now() {
        let now = noon(2025, 3, 1);
        let history = vec![snapshot("garbage", dec!(1210))];

        let chart = chart_series(&history, now);
        // Fallback entries are zero days old, so they land in every window.
        assert_eq!(chart.one_day.len(), 1);
        assert_eq!(chart.all[0].x, now.and_utc().timestamp_millis());
    }
}
