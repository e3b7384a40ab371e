use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a closed trade ended. Every trade falls in exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    #[serde(rename = "Break Even")]
    BreakEven,
}

impl Outcome {
    /// The label stored in the journal, e.g. `"Break Even"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::BreakEven => "Break Even",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Win" => Ok(Outcome::Win),
            "Loss" => Ok(Outcome::Loss),
            "Break Even" => Ok(Outcome::BreakEven),
            other => Err(CoreError::UnknownOutcome(other.to_string())),
        }
    }
}

/// The unit in which trade results are aggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Currency profit.
    #[default]
    Profit,
    /// Price movement in pips.
    Pips,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Profit => f.write_str("profit"),
            ViewMode::Pips => f.write_str("pips"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "profit" => Ok(ViewMode::Profit),
            "pips" => Ok(ViewMode::Pips),
            other => Err(CoreError::InvalidInput(
                "view_mode".to_string(),
                format!("'{other}' must be 'profit' or 'pips'"),
            )),
        }
    }
}

/// A categorical field of a trade record that results can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Session,
    EntryTimeframe,
    AssetClass,
    StrategyType,
    Symbol,
    Direction,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Session => "session",
            Dimension::EntryTimeframe => "entry_timeframe",
            Dimension::AssetClass => "asset_class",
            Dimension::StrategyType => "strategy_type",
            Dimension::Symbol => "symbol",
            Dimension::Direction => "direction",
        };
        f.write_str(name)
    }
}
