use crate::engine::StatisticsEngine;
use crate::report::TradeStatistics;
use core_types::{Dimension, TradeRecord, ViewMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group key for trades that leave the dimension blank.
pub const UNSPECIFIED_GROUP: &str = "Unspecified";

/// Statistics for the trades sharing one value of a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStatistics {
    pub dimension: Dimension,
    pub key: String,
    pub statistics: TradeStatistics,
}

/// Splits `trades` by `dimension` and calculates statistics per group.
///
/// Trades keep their relative order inside a group, so streaks stay meaningful.
/// Groups come back sorted by key.
pub fn breakdown(
    engine: &StatisticsEngine,
    trades: &[TradeRecord],
    view_mode: ViewMode,
    dimension: Dimension,
) -> Vec<GroupStatistics> {
    let mut groups: BTreeMap<&str, Vec<&TradeRecord>> = BTreeMap::new();
    for trade in trades {
        let key = trade.dimension_value(dimension).unwrap_or(UNSPECIFIED_GROUP);
        groups.entry(key).or_default().push(trade);
    }

    groups
        .into_iter()
        .map(|(key, members)| GroupStatistics {
            dimension,
            key: key.to_string(),
            statistics: engine.calculate_from(members, view_mode),
        })
        .collect()
}
