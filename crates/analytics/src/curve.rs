use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{Outcome, TradeRecord, ViewMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One point of the cumulative result curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub index: usize,
    pub trade_date: NaiveDate,
    pub value: f64,
    pub cumulative: f64,
}

/// Per-calendar-day totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub trade_date: NaiveDate,
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    pub net: f64,
}

/// Running sum of the selected value, one point per trade in caller order.
pub fn equity_curve(trades: &[TradeRecord], view_mode: ViewMode) -> Vec<EquityPoint> {
    let mut cumulative = 0.0;
    trades
        .iter()
        .enumerate()
        .map(|(index, trade)| {
            let value = trade.value(view_mode);
            cumulative += value;
            EquityPoint {
                index,
                trade_date: trade.trade_date,
                value,
                cumulative,
            }
        })
        .collect()
}

/// Trades bucketed by date, sorted ascending.
pub fn daily_summary(trades: &[TradeRecord], view_mode: ViewMode) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();
    for trade in trades {
        let day = days.entry(trade.trade_date).or_insert_with(|| DailySummary {
            trade_date: trade.trade_date,
            trades: 0,
            wins: 0,
            losses: 0,
            breakeven: 0,
            net: 0.0,
        });
        day.trades += 1;
        day.net += trade.value(view_mode);
        match trade.outcome {
            Outcome::Win => day.wins += 1,
            Outcome::Loss => day.losses += 1,
            Outcome::BreakEven => day.breakeven += 1,
        }
    }
    days.into_values().collect()
}

/// Win rate percentage over every window of `window` consecutive trades.
pub fn rolling_win_rate(trades: &[TradeRecord], window: usize) -> Result<Vec<f64>, AnalyticsError> {
    if window == 0 {
        return Err(AnalyticsError::InvalidWindow(window));
    }
    Ok(trades
        .windows(window)
        .map(|w| {
            let wins = w.iter().filter(|t| t.outcome == Outcome::Win).count();
            wins as f64 / window as f64 * 100.0
        })
        .collect())
}
