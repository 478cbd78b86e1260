pub mod health;
pub mod pnl;
pub mod summary;
pub mod trades;

use crate::engine::TimeRange;
use crate::error::AppError;
use crate::orchestration::Dashboard;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    /// Backend name reported by `/ready`.
    pub source_kind: &'static str,
}

impl AppState {
    pub fn new(dashboard: Arc<Dashboard>, source_kind: &'static str) -> Self {
        Self {
            dashboard,
            source_kind,
        }
    }
}

/// Missing or blank `range` means all time.
pub(crate) fn parse_range(range: Option<&str>) -> Result<TimeRange, AppError> {
    match range.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(TimeRange::AllTime),
        Some(s) => Ok(s.parse::<TimeRange>()?),
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/summary", get(summary::get_summary))
        .route("/v1/pnl/monthly", get(pnl::get_monthly))
        .route("/v1/pnl/cumulative", get(pnl::get_cumulative))
        .route("/v1/trades", get(trades::get_trades))
        .layer(cors)
        .with_state(state)
}
