use analytics::StatisticsEngine;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use configuration::Config;
use database::DbRepository;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub db_repo: DbRepository,
    pub engine: StatisticsEngine,
    pub config: Config,
}

/// Wires every route to its handler.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/statistics", post(handlers::compute_statistics))
        .route("/api/users/:user_id/statistics", get(handlers::get_statistics))
        .route(
            "/api/users/:user_id/statistics/breakdown",
            get(handlers::get_statistics_breakdown),
        )
        .route("/api/users/:user_id/equity-curve", get(handlers::get_equity_curve))
        .route("/api/users/:user_id/daily-summary", get(handlers::get_daily_summary))
        .route(
            "/api/users/:user_id/rolling-win-rate",
            get(handlers::get_rolling_win_rate),
        )
        .route("/api/users/:user_id/trades", post(handlers::import_trades))
        .route(
            "/api/users/:user_id/trades/:trade_id",
            delete(handlers::delete_trade),
        )
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Connects to the trade store and serves the API until the process stops.
///
/// Tracing must already be initialized by the caller.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let db_pool = database::connect(&config.database).await?;
    if config.database.run_migrations {
        database::run_migrations(&db_pool).await?;
    }

    let addr = config.server.address();
    let state = Arc::new(AppState {
        db_repo: DbRepository::new(db_pool),
        engine: StatisticsEngine::new(),
        config,
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
