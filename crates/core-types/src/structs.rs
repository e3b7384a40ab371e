use crate::enums::{Dimension, Outcome, ViewMode};
use crate::time::hold_minutes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single journaled trade, as handed to the analytics layer.
///
/// Optional numeric fields are absent rather than zero when the trader did not
/// record them; the analytics layer decides how absence is treated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_date: NaiveDate,
    pub outcome: Outcome,
    #[serde(default)]
    pub pips: Option<f64>,
    #[serde(default)]
    pub profit: Option<f64>,
    /// Local open time, `HH:MM[:SS]`.
    #[serde(default)]
    pub time_opened: Option<String>,
    /// Local close time, `HH:MM[:SS]`.
    #[serde(default)]
    pub time_closed: Option<String>,
    #[serde(default)]
    pub fees: Option<f64>,
    /// Maximum adverse excursion, in pips.
    #[serde(default)]
    pub max_drawdown_pips: Option<f64>,
    /// Maximum favorable excursion, in pips.
    #[serde(default)]
    pub total_pips_secured: Option<f64>,

    // Grouping dimensions.
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub entry_timeframe: Option<String>,
    #[serde(default)]
    pub asset_class: Option<String>,
    #[serde(default)]
    pub strategy_type: Option<String>,
}

impl TradeRecord {
    /// Creates a record with only the mandatory fields set.
    pub fn new(trade_date: NaiveDate, outcome: Outcome) -> Self {
        Self {
            trade_date,
            outcome,
            pips: None,
            profit: None,
            time_opened: None,
            time_closed: None,
            fees: None,
            max_drawdown_pips: None,
            total_pips_secured: None,
            symbol: None,
            direction: None,
            session: None,
            entry_timeframe: None,
            asset_class: None,
            strategy_type: None,
        }
    }

    /// The result of the trade in the unit selected by `mode`; missing is zero.
    pub fn value(&self, mode: ViewMode) -> f64 {
        match mode {
            ViewMode::Pips => self.pips.unwrap_or(0.0),
            ViewMode::Profit => self.profit.unwrap_or(0.0),
        }
    }

    pub fn hold_minutes(&self) -> Option<u32> {
        hold_minutes(self.time_opened.as_deref(), self.time_closed.as_deref())
    }

    pub fn dimension_value(&self, dimension: Dimension) -> Option<&str> {
        let field = match dimension {
            Dimension::Session => &self.session,
            Dimension::EntryTimeframe => &self.entry_timeframe,
            Dimension::AssetClass => &self.asset_class,
            Dimension::StrategyType => &self.strategy_type,
            Dimension::Symbol => &self.symbol,
            Dimension::Direction => &self.direction,
        };
        field.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}
