use crate::math::{k_ratio, two_tailed_p_value};
use crate::report::{Metric, TradeStatistics, UNBOUNDED_PROFIT_FACTOR};
use chrono::NaiveDate;
use core_types::{Outcome, TradeRecord, ViewMode};
use std::collections::BTreeMap;
use tracing::debug;

/// Minimum sample size for the System Quality Number.
pub const MIN_TRADES_FOR_SQN: usize = 30;
/// The trade count entering the SQN square root is capped here.
pub const SQN_TRADE_CAP: usize = 100;
/// Minimum sample size for the Kelly percentage.
pub const MIN_TRADES_FOR_KELLY: usize = 20;
/// Minimum sample size for the K-Ratio.
pub const MIN_TRADES_FOR_K_RATIO: usize = 20;
/// Minimum sample size for the probability of random chance.
pub const MIN_TRADES_FOR_SIGNIFICANCE: usize = 30;

/// A stateless calculator for deriving performance statistics from journaled trades.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticsEngine {}

impl StatisticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating trade statistics.
    ///
    /// # Arguments
    ///
    /// * `trades` - The trades to analyse, in the order over which streaks and
    ///   the cumulative curve are meaningful (normally chronological).
    /// * `view_mode` - Whether results are measured in currency or in pips.
    ///
    /// Never fails: degenerate inputs yield zeros or [`Metric::InsufficientData`].
    pub fn calculate(&self, trades: &[TradeRecord], view_mode: ViewMode) -> TradeStatistics {
        self.calculate_from(trades.iter(), view_mode)
    }

    /// Like [`calculate`](Self::calculate), for any ordered sequence of borrowed trades.
    pub fn calculate_from<'a, I>(&self, trades: I, view_mode: ViewMode) -> TradeStatistics
    where
        I: IntoIterator<Item = &'a TradeRecord>,
    {
        let mut acc = Accumulator::new(view_mode);
        for trade in trades {
            acc.push(trade);
        }
        debug!(trades = acc.count, %view_mode, "Calculated trade statistics");
        acc.finish()
    }
}

/// Running mean over an optional per-trade quantity.
#[derive(Debug, Default, Clone, Copy)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn metric(&self) -> Metric {
        if self.count == 0 {
            Metric::InsufficientData
        } else {
            Metric::Available(self.sum / self.count as f64)
        }
    }
}

/// Everything the statistics need, gathered in one pass over the trades.
#[derive(Debug)]
struct Accumulator {
    view_mode: ViewMode,
    count: usize,
    wins: usize,
    losses: usize,
    breakeven: usize,

    total: f64,
    // Welford state for the sample variance.
    welford_mean: f64,
    welford_m2: f64,

    gross_profit: f64,
    gross_loss: f64,
    win_sum: f64,
    loss_sum: f64,
    largest_win: Option<f64>,
    largest_loss: Option<f64>,

    win_run: usize,
    loss_run: usize,
    max_win_run: usize,
    max_loss_run: usize,

    daily: BTreeMap<NaiveDate, f64>,
    cumulative: Vec<f64>,

    hold_all: RunningMean,
    hold_wins: RunningMean,
    hold_losses: RunningMean,
    fees: f64,
    mae: RunningMean,
    mfe: RunningMean,
}

impl Accumulator {
    fn new(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            count: 0,
            wins: 0,
            losses: 0,
            breakeven: 0,
            total: 0.0,
            welford_mean: 0.0,
            welford_m2: 0.0,
            gross_profit: 0.0,
            gross_loss: 0.0,
            win_sum: 0.0,
            loss_sum: 0.0,
            largest_win: None,
            largest_loss: None,
            win_run: 0,
            loss_run: 0,
            max_win_run: 0,
            max_loss_run: 0,
            daily: BTreeMap::new(),
            cumulative: Vec::new(),
            hold_all: RunningMean::default(),
            hold_wins: RunningMean::default(),
            hold_losses: RunningMean::default(),
            fees: 0.0,
            mae: RunningMean::default(),
            mfe: RunningMean::default(),
        }
    }

    fn push(&mut self, trade: &TradeRecord) {
        let value = trade.value(self.view_mode);
        self.count += 1;
        self.total += value;
        self.cumulative.push(self.total);

        let delta = value - self.welford_mean;
        self.welford_mean += delta / self.count as f64;
        self.welford_m2 += delta * (value - self.welford_mean);

        let hold = trade.hold_minutes().map(f64::from);
        if let Some(minutes) = hold {
            self.hold_all.push(minutes);
        }

        match trade.outcome {
            Outcome::Win => {
                self.wins += 1;
                self.gross_profit += value.abs();
                self.win_sum += value;
                self.largest_win = Some(self.largest_win.map_or(value, |m| m.max(value)));
                self.win_run += 1;
                self.loss_run = 0;
                self.max_win_run = self.max_win_run.max(self.win_run);
                if let Some(minutes) = hold {
                    self.hold_wins.push(minutes);
                }
            }
            Outcome::Loss => {
                self.losses += 1;
                self.gross_loss += value.abs();
                self.loss_sum += value;
                self.largest_loss = Some(self.largest_loss.map_or(value, |m| m.min(value)));
                self.loss_run += 1;
                self.win_run = 0;
                self.max_loss_run = self.max_loss_run.max(self.loss_run);
                if let Some(minutes) = hold {
                    self.hold_losses.push(minutes);
                }
            }
            Outcome::BreakEven => {
                self.breakeven += 1;
                self.win_run = 0;
                self.loss_run = 0;
            }
        }

        *self.daily.entry(trade.trade_date).or_insert(0.0) += value;

        self.fees += trade.fees.unwrap_or(0.0);
        if let Some(mae) = trade.max_drawdown_pips {
            self.mae.push(mae);
        }
        if let Some(mfe) = trade.total_pips_secured {
            self.mfe.push(mfe);
        }
    }

    fn finish(self) -> TradeStatistics {
        let mut stats = TradeStatistics::empty(self.view_mode);
        let n = self.count;

        stats.total_trades = n;
        stats.wins = self.wins;
        stats.losses = self.losses;
        stats.breakeven = self.breakeven;
        stats.total_profit = self.total;
        stats.gross_profit = self.gross_profit;
        stats.gross_loss = self.gross_loss;
        stats.largest_win = self.largest_win.unwrap_or(0.0);
        stats.largest_loss = self.largest_loss.unwrap_or(0.0);
        stats.max_consecutive_wins = self.max_win_run;
        stats.max_consecutive_losses = self.max_loss_run;
        stats.total_fees = self.fees;
        stats.total_commissions = 0.0;
        stats.avg_hold_time_all = self.hold_all.metric();
        stats.avg_hold_time_wins = self.hold_wins.metric();
        stats.avg_hold_time_losses = self.hold_losses.metric();
        stats.avg_mae = self.mae.metric();
        stats.avg_mfe = self.mfe.metric();

        stats.profit_factor = if self.gross_loss > 0.0 {
            self.gross_profit / self.gross_loss
        } else if self.gross_profit > 0.0 {
            UNBOUNDED_PROFIT_FACTOR
        } else {
            0.0
        };

        if self.wins > 0 {
            stats.avg_winning_trade = self.win_sum / self.wins as f64;
        }
        if self.losses > 0 {
            stats.avg_losing_trade = self.loss_sum / self.losses as f64;
        }

        stats.trading_days = self.daily.len();
        if !self.daily.is_empty() {
            let days = self.daily.len() as f64;
            stats.avg_daily_gain = self.daily.values().sum::<f64>() / days;
            stats.avg_daily_volume = n as f64 / days;
        }

        if n == 0 {
            return stats;
        }

        let nf = n as f64;
        let win_fraction = self.wins as f64 / nf;
        stats.win_rate = (win_fraction * 1000.0).round() / 10.0;
        stats.avg_profit = self.total / nf;

        let std_dev = if n >= 2 {
            (self.welford_m2 / (nf - 1.0)).max(0.0).sqrt()
        } else {
            0.0
        };
        stats.trade_pl_std_dev = std_dev;
        let mean = stats.avg_profit;

        if n >= MIN_TRADES_FOR_SQN && std_dev > 0.0 {
            let capped = n.min(SQN_TRADE_CAP) as f64;
            stats.sqn = Metric::Available(mean / std_dev * capped.sqrt());
        }

        if n >= MIN_TRADES_FOR_KELLY && stats.avg_losing_trade != 0.0 {
            let payoff = stats.avg_winning_trade / stats.avg_losing_trade.abs();
            if payoff > 0.0 && payoff.is_finite() {
                let kelly = (win_fraction - (1.0 - win_fraction) / payoff) * 100.0;
                stats.kelly_percent = Metric::Available(kelly);
            }
        }

        if n >= MIN_TRADES_FOR_K_RATIO {
            stats.k_ratio = k_ratio(&self.cumulative).into();
        }

        if n >= MIN_TRADES_FOR_SIGNIFICANCE && std_dev > 0.0 {
            let z = mean / (std_dev / nf.sqrt());
            stats.prob_random_chance = Metric::Available(two_tailed_p_value(z));
        }

        stats
    }
}
