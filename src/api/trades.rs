use axum::extract::{Query, State};
use axum::Json;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::PositionRecord;
use crate::engine::{Navigation, PageWindow};
use crate::error::AppError;
use crate::render::{outcome_label, Outcome};

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    /// 1-based; omitted reloads the current page.
    pub page: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradesResponse {
    pub trades: Vec<TradeDto>,
    pub page: Option<PageWindow>,
    pub buttons: Vec<u64>,
    pub has_previous: bool,
    pub has_next: bool,
    pub navigation: Navigation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDto {
    pub ticker: String,
    pub market_name: String,
    pub realized_pnl: String,
    pub settled_at: String,
    pub outcome: Outcome,
    pub label: String,
}

impl From<&PositionRecord> for TradeDto {
    fn from(record: &PositionRecord) -> Self {
        TradeDto {
            ticker: record.ticker.to_string(),
            market_name: record.market_name.clone(),
            realized_pnl: record.pnl().to_canonical_string(),
            settled_at: record
                .settled_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            outcome: Outcome::of(record),
            label: outcome_label(record),
        }
    }
}

pub async fn get_trades(
    Query(params): Query<TradesQuery>,
    State(state): State<AppState>,
) -> Result<Json<TradesResponse>, AppError> {
    let page = state.dashboard.trades_page(params.page).await?;

    Ok(Json(TradesResponse {
        trades: page.records.iter().map(TradeDto::from).collect(),
        has_previous: page.window.is_some_and(|w| w.has_previous()),
        has_next: page.window.is_some_and(|w| w.has_next()),
        page: page.window,
        buttons: page.buttons,
        navigation: page.navigation,
    }))
}
