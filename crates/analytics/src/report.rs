use core_types::ViewMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reported as the profit factor when there are winning trades but no losing ones.
pub const UNBOUNDED_PROFIT_FACTOR: f64 = 999.0;

/// A statistic that needs a minimum amount of data before it means anything.
///
/// Serializes as a plain number when available and as `null` otherwise, so the
/// presentation layer can render "N/A" instead of a misleading zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Available(f64),
    #[default]
    InsufficientData,
}

impl Metric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Available(v) => Some(*v),
            Metric::InsufficientData => None,
        }
    }
}

impl From<Option<f64>> for Metric {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Metric::InsufficientData, Metric::Available)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Available(v) => write!(f, "{v:.2}"),
            Metric::InsufficientData => f.write_str("N/A"),
        }
    }
}

/// Performance statistics derived from a list of journaled trades.
///
/// Value-based fields (profit, averages, extremes, dispersion) are expressed in
/// the unit of `view_mode`. Excursion averages are always in pips and hold
/// times are always in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeStatistics {
    pub view_mode: ViewMode,

    // I. Outcome partition
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    /// Percentage of winning trades, rounded to one decimal.
    pub win_rate: f64,

    // II. Profitability
    pub total_profit: f64,
    pub avg_profit: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    /// `gross_profit / gross_loss`; [`UNBOUNDED_PROFIT_FACTOR`] without losses.
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_winning_trade: f64,
    pub avg_losing_trade: f64,

    // III. Streaks and daily activity
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub trading_days: usize,
    pub avg_daily_gain: f64,
    pub avg_daily_volume: f64,

    // IV. Holding period, in minutes
    pub avg_hold_time_all: Metric,
    pub avg_hold_time_wins: Metric,
    pub avg_hold_time_losses: Metric,

    // V. Costs
    pub total_fees: f64,
    pub total_commissions: f64,

    // VI. Dispersion and system quality
    pub trade_pl_std_dev: f64,
    pub sqn: Metric,
    pub kelly_percent: Metric,
    pub k_ratio: Metric,
    /// Two-tailed p-value that the mean result is indistinguishable from zero.
    pub prob_random_chance: Metric,

    // VII. Excursions, in pips
    pub avg_mae: Metric,
    pub avg_mfe: Metric,
}

impl TradeStatistics {
    /// The statistics of an empty journal.
    pub fn empty(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            total_trades: 0,
            wins: 0,
            losses: 0,
            breakeven: 0,
            win_rate: 0.0,
            total_profit: 0.0,
            avg_profit: 0.0,
            gross_profit: 0.0,
            gross_loss: 0.0,
            profit_factor: 0.0,
            largest_win: 0.0,
            largest_loss: 0.0,
            avg_winning_trade: 0.0,
            avg_losing_trade: 0.0,
            max_consecutive_wins: 0,
            max_consecutive_losses: 0,
            trading_days: 0,
            avg_daily_gain: 0.0,
            avg_daily_volume: 0.0,
            avg_hold_time_all: Metric::InsufficientData,
            avg_hold_time_wins: Metric::InsufficientData,
            avg_hold_time_losses: Metric::InsufficientData,
            total_fees: 0.0,
            total_commissions: 0.0,
            trade_pl_std_dev: 0.0,
            sqn: Metric::InsufficientData,
            kelly_percent: Metric::InsufficientData,
            k_ratio: Metric::InsufficientData,
            prob_random_chance: Metric::InsufficientData,
            avg_mae: Metric::InsufficientData,
            avg_mfe: Metric::InsufficientData,
        }
    }

    pub fn has_unbounded_profit_factor(&self) -> bool {
        self.profit_factor == UNBOUNDED_PROFIT_FACTOR && self.gross_loss == 0.0
    }

    /// Labelled, display-ready rows in a fixed order.
    pub fn summary_rows(&self) -> Vec<(&'static str, String)> {
        let amount = |v: f64| format_amount(v, self.view_mode);
        let minutes = |m: Metric| match m.value() {
            Some(v) => format_minutes(v),
            None => "N/A".to_string(),
        };
        let pips = |m: Metric| match m.value() {
            Some(v) => format!("{v:.1} pips"),
            None => "N/A".to_string(),
        };
        let profit_factor = if self.has_unbounded_profit_factor() {
            "∞".to_string()
        } else {
            format!("{:.2}", self.profit_factor)
        };

        vec![
            ("Total Trades", self.total_trades.to_string()),
            ("Wins / Losses / Break Even", format!("{} / {} / {}", self.wins, self.losses, self.breakeven)),
            ("Win Rate", format!("{:.1}%", self.win_rate)),
            ("Total", amount(self.total_profit)),
            ("Average Trade", amount(self.avg_profit)),
            ("Profit Factor", profit_factor),
            ("Largest Win", amount(self.largest_win)),
            ("Largest Loss", amount(self.largest_loss)),
            ("Average Win", amount(self.avg_winning_trade)),
            ("Average Loss", amount(self.avg_losing_trade)),
            ("Max Consecutive Wins", self.max_consecutive_wins.to_string()),
            ("Max Consecutive Losses", self.max_consecutive_losses.to_string()),
            ("Average Daily Gain", amount(self.avg_daily_gain)),
            ("Average Daily Volume", format!("{:.2}", self.avg_daily_volume)),
            ("Average Hold Time", minutes(self.avg_hold_time_all)),
            ("Average Hold Time (Wins)", minutes(self.avg_hold_time_wins)),
            ("Average Hold Time (Losses)", minutes(self.avg_hold_time_losses)),
            ("Total Fees", format_amount(self.total_fees, ViewMode::Profit)),
            ("Total Commissions", format_amount(self.total_commissions, ViewMode::Profit)),
            ("Trade P&L Std Dev", amount(self.trade_pl_std_dev)),
            ("SQN", self.sqn.to_string()),
            ("Kelly %", match self.kelly_percent.value() {
                Some(v) => format!("{v:.2}%"),
                None => "N/A".to_string(),
            }),
            ("K-Ratio", self.k_ratio.to_string()),
            ("Probability of Random Chance", match self.prob_random_chance.value() {
                Some(v) => format!("{:.2}%", v * 100.0),
                None => "N/A".to_string(),
            }),
            ("Average MAE", pips(self.avg_mae)),
            ("Average MFE", pips(self.avg_mfe)),
        ]
    }
}

fn format_amount(value: f64, mode: ViewMode) -> String {
    match mode {
        ViewMode::Pips => format!("{value:.1} pips"),
        ViewMode::Profit if value < 0.0 => format!("-${:.2}", value.abs()),
        ViewMode::Profit => format!("${value:.2}"),
    }
}

fn format_minutes(minutes: f64) -> String {
    let total = minutes.round() as i64;
    let (hours, mins) = (total / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_serializes_as_number_or_null() {
        assert_eq!(serde_json::to_string(&Metric::Available(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&Metric::InsufficientData).unwrap(), "null");

        let back: Metric = serde_json::from_str("null").unwrap();
        assert_eq!(back, Metric::InsufficientData);
        let back: Metric = serde_json::from_str("2.25").unwrap();
        assert_eq!(back, Metric::Available(2.25));
    }

    #[test]
    fn test_metric_display() {
        assert_eq!(Metric::Available(1.234).to_string(), "1.23");
        assert_eq!(Metric::InsufficientData.to_string(), "N/A");
        assert_eq!(Metric::from(None), Metric::InsufficientData);
    }

    #[test]
    fn test_summary_rows_render_unavailable_as_na() {
        let stats = TradeStatistics::empty(ViewMode::Pips);
        let rows = stats.summary_rows();
        let sqn = rows.iter().find(|(label, _)| *label == "SQN").unwrap();
        assert_eq!(sqn.1, "N/A");
        let total = rows.iter().find(|(label, _)| *label == "Total").unwrap();
        assert_eq!(total.1, "0.0 pips");
    }

    #[test]
    fn test_amount_and_minutes_formatting() {
        assert_eq!(format_amount(-12.5, ViewMode::Profit), "-$12.50");
        assert_eq!(format_amount(3.0, ViewMode::Pips), "3.0 pips");
        assert_eq!(format_minutes(180.0), "3h 0m");
        assert_eq!(format_minutes(42.4), "42m");
    }
}
