use crate::DbError;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{Outcome, TradeRecord};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, Postgres};
use sqlx::{FromRow, QueryBuilder, Transaction};
use uuid::Uuid;

const TRADE_COLUMNS: &str = "trade_id, user_id, account_id, trade_date, outcome, pips, profit, \
    time_opened, time_closed, fees, max_drawdown_pips, total_pips_secured, symbol, direction, \
    session, entry_timeframe, asset_class, strategy_type, created_at";

/// The `DbRepository` provides a high-level, application-specific interface
/// to the trade store. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// Direction in which trades are returned, by date then open time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Which trades to load. Date bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeQuery {
    pub user_id: Uuid,
    pub account_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub outcome: Option<Outcome>,
    pub order: SortOrder,
}

impl TradeQuery {
    /// All of a user's trades, oldest first.
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            account_id: None,
            from: None,
            to: None,
            outcome: None,
            order: SortOrder::Asc,
        }
    }
}

/// A row of the `trades` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbTrade {
    pub trade_id: Uuid,
    pub user_id: Uuid,
    pub account_id: Option<Uuid>,
    pub trade_date: NaiveDate,
    pub outcome: String,
    pub pips: Option<f64>,
    pub profit: Option<f64>,
    pub time_opened: Option<String>,
    pub time_closed: Option<String>,
    pub fees: Option<f64>,
    pub max_drawdown_pips: Option<f64>,
    pub total_pips_secured: Option<f64>,
    pub symbol: Option<String>,
    pub direction: Option<String>,
    pub session: Option<String>,
    pub entry_timeframe: Option<String>,
    pub asset_class: Option<String>,
    pub strategy_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbTrade> for TradeRecord {
    type Error = DbError;

    fn try_from(row: DbTrade) -> Result<Self, Self::Error> {
        let outcome: Outcome = row.outcome.parse().map_err(|e: core_types::CoreError| {
            DbError::InvalidRow {
                trade_id: row.trade_id,
                reason: e.to_string(),
            }
        })?;

        Ok(TradeRecord {
            trade_date: row.trade_date,
            outcome,
            pips: row.pips,
            profit: row.profit,
            time_opened: row.time_opened,
            time_closed: row.time_closed,
            fees: row.fees,
            max_drawdown_pips: row.max_drawdown_pips,
            total_pips_secured: row.total_pips_secured,
            symbol: row.symbol,
            direction: row.direction,
            session: row.session,
            entry_timeframe: row.entry_timeframe,
            asset_class: row.asset_class,
            strategy_type: row.strategy_type,
        })
    }
}

/// Builds the `SELECT` for a [`TradeQuery`], binding every filter value.
fn build_trade_query(query: &TradeQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {TRADE_COLUMNS} FROM trades WHERE user_id = "));
    builder.push_bind(query.user_id);

    if let Some(account_id) = query.account_id {
        builder.push(" AND account_id = ").push_bind(account_id);
    }
    if let Some(from) = query.from {
        builder.push(" AND trade_date >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        builder.push(" AND trade_date <= ").push_bind(to);
    }
    if let Some(outcome) = query.outcome {
        builder.push(" AND outcome = ").push_bind(outcome.as_str());
    }

    let direction = query.order.as_sql();
    builder.push(format!(
        " ORDER BY trade_date {direction}, time_opened {direction} NULLS LAST, created_at {direction}"
    ));
    builder
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the raw rows matching `query`, in the requested order.
    pub async fn get_trade_rows(&self, query: &TradeQuery) -> Result<Vec<DbTrade>, DbError> {
        let rows = build_trade_query(query)
            .build_query_as::<DbTrade>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Fetches the trades matching `query` as analytics-ready records.
    pub async fn get_trades(&self, query: &TradeQuery) -> Result<Vec<TradeRecord>, DbError> {
        let rows = self.get_trade_rows(query).await?;
        tracing::debug!(user_id = %query.user_id, rows = rows.len(), "Loaded trades");
        rows.into_iter().map(TradeRecord::try_from).collect()
    }

    /// Saves a batch of trades within a single transaction for atomicity.
    /// Returns the ids assigned to the new rows, in input order.
    pub async fn save_trades(
        &self,
        user_id: Uuid,
        account_id: Option<Uuid>,
        trades: &[TradeRecord],
    ) -> Result<Vec<Uuid>, DbError> {
        let mut tx: Transaction<Postgres> = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(trades.len());

        for trade in trades {
            let trade_id = Uuid::new_v4();
            sqlx::query(
                r#"
                INSERT INTO trades (
                    trade_id, user_id, account_id, trade_date, outcome, pips, profit,
                    time_opened, time_closed, fees, max_drawdown_pips, total_pips_secured,
                    symbol, direction, session, entry_timeframe, asset_class, strategy_type
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
                "#,
            )
            .bind(trade_id)
            .bind(user_id)
            .bind(account_id)
            .bind(trade.trade_date)
            .bind(trade.outcome.as_str())
            .bind(trade.pips)
            .bind(trade.profit)
            .bind(trade.time_opened.as_deref())
            .bind(trade.time_closed.as_deref())
            .bind(trade.fees)
            .bind(trade.max_drawdown_pips)
            .bind(trade.total_pips_secured)
            .bind(trade.symbol.as_deref())
            .bind(trade.direction.as_deref())
            .bind(trade.session.as_deref())
            .bind(trade.entry_timeframe.as_deref())
            .bind(trade.asset_class.as_deref())
            .bind(trade.strategy_type.as_deref())
            .execute(&mut *tx) // Note: must use the transaction object `tx` here
            .await?;
            ids.push(trade_id);
        }

        tx.commit().await?;
        tracing::info!(%user_id, saved = ids.len(), "Saved trades");
        Ok(ids)
    }

    /// Deletes one of the user's trades.
    pub async fn delete_trade(&self, user_id: Uuid, trade_id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM trades WHERE trade_id = $1 AND user_id = $2")
            .bind(trade_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}
