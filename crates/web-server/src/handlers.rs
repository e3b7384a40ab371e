use crate::{AppState, error::AppError};
use analytics::{
    DailySummary, EquityPoint, GroupStatistics, TradeStatistics, breakdown, daily_summary,
    equity_curve, rolling_win_rate,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use core_types::{Dimension, Outcome, TradeRecord, ViewMode};
use database::{SortOrder, TradeQuery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Query-string filters shared by the per-user endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TradeParams {
    pub view_mode: Option<ViewMode>,
    pub account_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub outcome: Option<Outcome>,
    pub order: Option<SortOrder>,
    pub dimension: Option<Dimension>,
    pub window: Option<usize>,
}

impl TradeParams {
    pub fn to_query(&self, user_id: Uuid) -> Result<TradeQuery, AppError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::BadRequest(format!(
                    "'from' ({from}) must not be after 'to' ({to})"
                )));
            }
        }
        Ok(TradeQuery {
            user_id,
            account_id: self.account_id,
            from: self.from,
            to: self.to,
            outcome: self.outcome,
            order: self.order.unwrap_or_default(),
        })
    }

    fn view_mode_or(&self, state: &AppState) -> ViewMode {
        self.view_mode
            .unwrap_or(state.config.statistics.default_view_mode)
    }
}

async fn load_trades(
    state: &AppState,
    user_id: Uuid,
    params: &TradeParams,
) -> Result<Vec<TradeRecord>, AppError> {
    let query = params.to_query(user_id)?;
    Ok(state.db_repo.get_trades(&query).await?)
}

/// # GET /api/users/:user_id/statistics
pub async fn get_statistics(
    Path(user_id): Path<Uuid>,
    Query(params): Query<TradeParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<TradeStatistics>, AppError> {
    let trades = load_trades(&state, user_id, &params).await?;
    let stats = state.engine.calculate(&trades, params.view_mode_or(&state));
    Ok(Json(stats))
}

/// # GET /api/users/:user_id/statistics/breakdown?dimension=session
pub async fn get_statistics_breakdown(
    Path(user_id): Path<Uuid>,
    Query(params): Query<TradeParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GroupStatistics>>, AppError> {
    let dimension = params
        .dimension
        .ok_or_else(|| AppError::BadRequest("the 'dimension' parameter is required".to_string()))?;
    let trades = load_trades(&state, user_id, &params).await?;
    let groups = breakdown(&state.engine, &trades, params.view_mode_or(&state), dimension);
    Ok(Json(groups))
}

/// # GET /api/users/:user_id/equity-curve
pub async fn get_equity_curve(
    Path(user_id): Path<Uuid>,
    Query(params): Query<TradeParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EquityPoint>>, AppError> {
    let trades = load_trades(&state, user_id, &params).await?;
    Ok(Json(equity_curve(&trades, params.view_mode_or(&state))))
}

/// # GET /api/users/:user_id/daily-summary
pub async fn get_daily_summary(
    Path(user_id): Path<Uuid>,
    Query(params): Query<TradeParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DailySummary>>, AppError> {
    let trades = load_trades(&state, user_id, &params).await?;
    Ok(Json(daily_summary(&trades, params.view_mode_or(&state))))
}

/// # GET /api/users/:user_id/rolling-win-rate?window=20
pub async fn get_rolling_win_rate(
    Path(user_id): Path<Uuid>,
    Query(params): Query<TradeParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<f64>>, AppError> {
    let window = params.window.unwrap_or(DEFAULT_ROLLING_WINDOW);
    let trades = load_trades(&state, user_id, &params).await?;
    Ok(Json(rolling_win_rate(&trades, window)?))
}

const DEFAULT_ROLLING_WINDOW: usize = 20;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub account_id: Option<Uuid>,
    pub trades: Vec<TradeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub trade_ids: Vec<Uuid>,
}

/// # POST /api/users/:user_id/trades
pub async fn import_trades(
    Path(user_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    if request.trades.is_empty() {
        return Err(AppError::BadRequest("no trades to import".to_string()));
    }
    let trade_ids = state
        .db_repo
        .save_trades(user_id, request.account_id, &request.trades)
        .await?;
    Ok((StatusCode::CREATED, Json(ImportResponse { trade_ids })))
}

/// # DELETE /api/users/:user_id/trades/:trade_id
pub async fn delete_trade(
    Path((user_id, trade_id)): Path<(Uuid, Uuid)>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    state.db_repo.delete_trade(user_id, trade_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ComputeRequest {
    pub view_mode: Option<ViewMode>,
    pub trades: Vec<TradeRecord>,
}

/// # POST /api/statistics
/// Calculates statistics for a posted trade list without touching the store.
pub async fn compute_statistics(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ComputeRequest>,
) -> Json<TradeStatistics> {
    let view_mode = request
        .view_mode
        .unwrap_or(state.config.statistics.default_view_mode);
    Json(state.engine.calculate(&request.trades, view_mode))
}
