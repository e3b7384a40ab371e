//! # Tradelog Analytics
//!
//! Turns a list of journaled trades into performance statistics.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O and no knowledge of where trades come from. It
//!   depends only on `core-types`.
//! - **Stateless calculation:** [`StatisticsEngine`] folds the trades in a single
//!   pass and returns a fresh [`TradeStatistics`]. It never fails; metrics that
//!   need more data than is available are reported as [`Metric::InsufficientData`].
//!
//! ## Public API
//!
//! - `StatisticsEngine`: the statistics calculator.
//! - `TradeStatistics`, `Metric`: the result types.
//! - `breakdown`, `equity_curve`, `daily_summary`, `rolling_win_rate`: views
//!   built on top of the engine for charts and tables.

pub mod breakdown;
pub mod curve;
pub mod engine;
pub mod error;
pub mod math;
pub mod report;

pub use breakdown::{GroupStatistics, UNSPECIFIED_GROUP, breakdown};
pub use curve::{DailySummary, EquityPoint, daily_summary, equity_curve, rolling_win_rate};
pub use engine::StatisticsEngine;
pub use error::AnalyticsError;
pub use report::{Metric, TradeStatistics, UNBOUNDED_PROFIT_FACTOR};
