use analytics::{Metric, StatisticsEngine, TradeStatistics, UNBOUNDED_PROFIT_FACTOR};
use chrono::NaiveDate;
use core_types::{Outcome, TradeRecord, ViewMode};

const EPSILON: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= EPSILON,
        "expected {expected}, got {actual}"
    );
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn pips_trade(outcome: Outcome, pips: f64) -> TradeRecord {
    let mut trade = TradeRecord::new(day(1), outcome);
    trade.pips = Some(pips);
    trade
}

/// `n` trades in a mixed pattern: two wins of varying size, then a loss.
fn mixed_journal(n: usize) -> Vec<TradeRecord> {
    (0..n)
        .map(|i| {
            let mut trade = if i % 3 == 2 {
                pips_trade(Outcome::Loss, -6.0 - (i % 2) as f64)
            } else {
                pips_trade(Outcome::Win, 8.0 + (i % 5) as f64)
            };
            trade.trade_date = day(1 + (i % 28) as u32);
            trade.profit = trade.pips.map(|p| p * 12.5);
            trade
        })
        .collect()
}

fn calculate(trades: &[TradeRecord], mode: ViewMode) -> TradeStatistics {
    StatisticsEngine::new().calculate(trades, mode)
}

#[test]
fn test_partition_counts_always_add_up() {
    let mut trades = mixed_journal(17);
    trades.push(pips_trade(Outcome::BreakEven, 0.0));
    trades.push(pips_trade(Outcome::BreakEven, 0.4));
    let stats = calculate(&trades, ViewMode::Pips);
    assert_eq!(stats.wins + stats.losses + stats.breakeven, stats.total_trades);
    assert_eq!(stats.total_trades, 19);
    assert_eq!(stats.breakeven, 2);
}

#[test]
fn test_empty_journal_reports_zeros_and_unavailable_metrics() {
    let stats = calculate(&[], ViewMode::Profit);
    assert_eq!(stats.total_trades, 0);
    assert_eq!(stats.win_rate, 0.0);
    assert_eq!(stats.avg_profit, 0.0);
    assert_eq!(stats.avg_winning_trade, 0.0);
    assert_eq!(stats.avg_losing_trade, 0.0);
    assert_eq!(stats.avg_daily_gain, 0.0);
    assert_eq!(stats.avg_daily_volume, 0.0);
    assert_eq!(stats.profit_factor, 0.0);
    assert_eq!(stats.sqn, Metric::InsufficientData);
    assert_eq!(stats.kelly_percent, Metric::InsufficientData);
    assert_eq!(stats.k_ratio, Metric::InsufficientData);
    assert_eq!(stats.prob_random_chance, Metric::InsufficientData);
    assert_eq!(stats.avg_hold_time_all, Metric::InsufficientData);
}

#[test]
fn test_win_rate_stays_within_percentage_bounds() {
    for n in [1, 2, 7, 30, 101] {
        let stats = calculate(&mixed_journal(n), ViewMode::Pips);
        assert!((0.0..=100.0).contains(&stats.win_rate), "n = {n}");
    }
    let all_wins: Vec<_> = (0..5).map(|_| pips_trade(Outcome::Win, 1.0)).collect();
    assert_eq!(calculate(&all_wins, ViewMode::Pips).win_rate, 100.0);
}

#[test]
fn test_repeated_calculation_is_identical() {
    let trades = mixed_journal(45);
    let first = calculate(&trades, ViewMode::Pips);
    let second = calculate(&trades, ViewMode::Pips);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_consecutive_runs_are_reset_by_the_opposite_outcome() {
    let trades = vec![
        pips_trade(Outcome::Win, 10.0),
        pips_trade(Outcome::Win, 5.0),
        pips_trade(Outcome::Loss, -8.0),
        pips_trade(Outcome::Win, 3.0),
    ];
    let stats = calculate(&trades, ViewMode::Pips);
    assert_eq!(stats.max_consecutive_wins, 2);
    assert_eq!(stats.max_consecutive_losses, 1);
}

#[test]
fn test_sqn_needs_thirty_trades() {
    let stats = calculate(&mixed_journal(29), ViewMode::Pips);
    assert!(stats.trade_pl_std_dev > 0.0);
    assert_eq!(stats.sqn, Metric::InsufficientData);
    assert_eq!(stats.prob_random_chance, Metric::InsufficientData);

    let stats = calculate(&mixed_journal(30), ViewMode::Pips);
    let sqn = stats.sqn.value().expect("sqn available at 30 trades");
    assert!(sqn.is_finite());
    assert_close(sqn, stats.avg_profit / stats.trade_pl_std_dev * 30_f64.sqrt());
}

#[test]
fn test_sqn_trade_count_is_capped_at_one_hundred() {
    let stats = calculate(&mixed_journal(150), ViewMode::Pips);
    let sqn = stats.sqn.value().unwrap();
    assert_close(sqn, stats.avg_profit / stats.trade_pl_std_dev * 10.0);
}

#[test]
fn test_sqn_is_unavailable_without_dispersion() {
    let flat: Vec<_> = (0..40).map(|_| pips_trade(Outcome::Win, 5.0)).collect();
    let stats = calculate(&flat, ViewMode::Pips);
    assert_eq!(stats.trade_pl_std_dev, 0.0);
    assert_eq!(stats.sqn, Metric::InsufficientData);
    assert_eq!(stats.prob_random_chance, Metric::InsufficientData);
}

#[test]
fn test_profit_factor_without_losses_is_the_unbounded_constant() {
    let trades = vec![pips_trade(Outcome::Win, 4.0), pips_trade(Outcome::BreakEven, 0.0)];
    let stats = calculate(&trades, ViewMode::Pips);
    assert_eq!(stats.profit_factor, 999.0);
    assert_eq!(stats.profit_factor, UNBOUNDED_PROFIT_FACTOR);
    assert!(stats.has_unbounded_profit_factor());

    let stats = calculate(&[pips_trade(Outcome::BreakEven, 0.0)], ViewMode::Pips);
    assert_eq!(stats.profit_factor, 0.0);
}

#[test]
fn test_profit_factor_uses_absolute_bucket_sums() {
    let trades = vec![
        pips_trade(Outcome::Win, 20.0),
        pips_trade(Outcome::Win, 10.0),
        pips_trade(Outcome::Loss, -8.0),
        pips_trade(Outcome::Loss, -4.0),
    ];
    let stats = calculate(&trades, ViewMode::Pips);
    assert_eq!(stats.gross_profit, 30.0);
    assert_eq!(stats.gross_loss, 12.0);
    assert_close(stats.profit_factor, 2.5);
    assert_eq!(stats.largest_win, 20.0);
    assert_eq!(stats.largest_loss, -8.0);
    assert_eq!(stats.avg_winning_trade, 15.0);
    assert_eq!(stats.avg_losing_trade, -6.0);
}

#[test]
fn test_hold_times_wrap_overnight_and_skip_untimed_trades() {
    let mut overnight = pips_trade(Outcome::Win, 12.0);
    overnight.time_opened = Some("22:00".into());
    overnight.time_closed = Some("01:00".into());

    let mut quick_loss = pips_trade(Outcome::Loss, -3.0);
    quick_loss.time_opened = Some("09:00:00".into());
    quick_loss.time_closed = Some("09:30:00".into());

    let mut scratch = pips_trade(Outcome::BreakEven, 0.0);
    scratch.time_opened = Some("10:00".into());
    scratch.time_closed = Some("10:15".into());

    let mut untimed = pips_trade(Outcome::Win, 2.0);
    untimed.time_opened = Some("11:00".into());

    let stats = calculate(&[overnight, quick_loss, scratch, untimed], ViewMode::Pips);
    assert_eq!(stats.avg_hold_time_wins, Metric::Available(180.0));
    assert_eq!(stats.avg_hold_time_losses, Metric::Available(30.0));
    assert_eq!(stats.avg_hold_time_all, Metric::Available(75.0));
}

#[test]
fn test_hold_time_buckets_without_data_are_unavailable() {
    let mut timed_win = pips_trade(Outcome::Win, 1.0);
    timed_win.time_opened = Some("08:00".into());
    timed_win.time_closed = Some("08:45".into());
    let stats = calculate(&[timed_win, pips_trade(Outcome::Loss, -1.0)], ViewMode::Pips);
    assert_eq!(stats.avg_hold_time_wins, Metric::Available(45.0));
    assert_eq!(stats.avg_hold_time_losses, Metric::InsufficientData);
}

#[test]
fn test_switching_view_mode_keeps_the_partition() {
    let trades = mixed_journal(12);
    let by_profit = calculate(&trades, ViewMode::Profit);
    let by_pips = calculate(&trades, ViewMode::Pips);

    assert_eq!(by_profit.wins, by_pips.wins);
    assert_eq!(by_profit.losses, by_pips.losses);
    assert_eq!(by_profit.breakeven, by_pips.breakeven);
    assert_eq!(by_profit.total_trades, by_pips.total_trades);
    assert_ne!(by_profit.total_profit, by_pips.total_profit);
    assert_close(by_profit.total_profit, by_pips.total_profit * 12.5);
    assert_close(by_profit.avg_profit, by_pips.avg_profit * 12.5);
}

#[test]
fn test_missing_values_count_as_zero() {
    let mut no_profit = TradeRecord::new(day(2), Outcome::Win);
    no_profit.pips = Some(7.0);
    let stats = calculate(&[no_profit], ViewMode::Profit);
    assert_eq!(stats.total_profit, 0.0);
    assert_eq!(stats.wins, 1);
    assert_eq!(stats.profit_factor, 0.0);
}

#[test]
fn test_kelly_percentage_from_win_rate_and_payoff() {
    let mut trades: Vec<_> = (0..12).map(|_| pips_trade(Outcome::Win, 10.0)).collect();
    trades.extend((0..8).map(|_| pips_trade(Outcome::Loss, -5.0)));

    let kelly = calculate(&trades, ViewMode::Pips).kelly_percent.value().unwrap();
    // W = 0.6, R = 2: 0.6 - 0.4 / 2 = 0.4
    assert_close(kelly, 40.0);

    let stats = calculate(&trades[1..], ViewMode::Pips);
    assert_eq!(stats.kelly_percent, Metric::InsufficientData);
}

#[test]
fn test_kelly_needs_a_non_zero_loss_average() {
    let winners: Vec<_> = (0..25).map(|i| pips_trade(Outcome::Win, 1.0 + i as f64)).collect();
    assert_eq!(calculate(&winners, ViewMode::Pips).kelly_percent, Metric::InsufficientData);

    let mut zero_losses: Vec<_> = (0..15).map(|_| pips_trade(Outcome::Win, 3.0)).collect();
    zero_losses.extend((0..5).map(|_| pips_trade(Outcome::Loss, 0.0)));
    assert_eq!(calculate(&zero_losses, ViewMode::Pips).kelly_percent, Metric::InsufficientData);
}

#[test]
fn test_k_ratio_needs_twenty_trades_and_a_noisy_curve() {
    let stats = calculate(&mixed_journal(19), ViewMode::Pips);
    assert_eq!(stats.k_ratio, Metric::InsufficientData);

    let stats = calculate(&mixed_journal(20), ViewMode::Pips);
    let k = stats.k_ratio.value().expect("k-ratio available at 20 trades");
    assert!(k > 0.0);

    let steady: Vec<_> = (0..20).map(|_| pips_trade(Outcome::Win, 10.0)).collect();
    assert_eq!(calculate(&steady, ViewMode::Pips).k_ratio, Metric::InsufficientData);
}

#[test]
fn test_probability_of_random_chance_for_a_zero_mean_journal() {
    let mut trades = Vec::new();
    for _ in 0..15 {
        trades.push(pips_trade(Outcome::Win, 10.0));
        trades.push(pips_trade(Outcome::Loss, -10.0));
    }
    let stats = calculate(&trades, ViewMode::Pips);
    let p = stats.prob_random_chance.value().unwrap();
    assert!((p - 1.0).abs() < 1e-6, "p = {p}");
    assert_eq!(stats.sqn, Metric::Available(0.0));
}

#[test]
fn test_probability_of_random_chance_is_small_for_a_strong_edge() {
    let stats = calculate(&mixed_journal(60), ViewMode::Pips);
    let p = stats.prob_random_chance.value().unwrap();
    assert!((0.0..0.01).contains(&p), "p = {p}");
}

#[test]
fn test_excursions_average_only_recorded_values() {
    let mut a = pips_trade(Outcome::Win, 5.0);
    a.max_drawdown_pips = Some(4.0);
    let mut b = pips_trade(Outcome::Loss, -5.0);
    b.max_drawdown_pips = Some(6.0);
    let c = pips_trade(Outcome::Win, 1.0);

    let stats = calculate(&[a, b, c], ViewMode::Profit);
    assert_eq!(stats.avg_mae, Metric::Available(5.0));
    assert_eq!(stats.avg_mfe, Metric::InsufficientData);
}

#[test]
fn test_favorable_excursion_averages_recorded_values() {
    let mut a = pips_trade(Outcome::Win, 12.0);
    a.total_pips_secured = Some(15.0);
    let mut b = pips_trade(Outcome::Loss, -4.0);
    b.total_pips_secured = Some(3.0);
    let mut c = pips_trade(Outcome::Win, 6.0);
    c.total_pips_secured = Some(9.0);
    let untracked = pips_trade(Outcome::Win, 2.0);

    let stats = calculate(&[a, b, c, untracked], ViewMode::Profit);
    assert_eq!(stats.avg_mfe, Metric::Available(9.0));
    assert_eq!(stats.avg_mae, Metric::InsufficientData);
}

#[test]
fn test_fees_are_summed_and_commissions_stay_zero() {
    let mut a = pips_trade(Outcome::Win, 5.0);
    a.fees = Some(2.5);
    let mut b = pips_trade(Outcome::Loss, -5.0);
    b.fees = Some(-0.5);
    let stats = calculate(&[a, b, pips_trade(Outcome::Win, 1.0)], ViewMode::Pips);
    assert_eq!(stats.total_fees, 2.0);
    assert_eq!(stats.total_commissions, 0.0);
}

#[test]
fn test_statistics_serialize_unavailable_metrics_as_null() {
    let stats = calculate(&[pips_trade(Outcome::Win, 1.0)], ViewMode::Pips);
    let json = serde_json::to_value(&stats).unwrap();
    assert!(json["sqn"].is_null());
    assert_eq!(json["view_mode"], "pips");
    assert_eq!(json["profit_factor"], 999.0);
}
