use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_range, AppState};
use crate::error::AppError;
use crate::render::format_currency;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub range: String,
    pub total_profit: String,
    pub win_rate: u32,
    pub total_trades: u64,
    pub display: SummaryDisplay,
}

/// Card text, ready to show.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDisplay {
    pub total_profit: String,
    pub win_rate: String,
    pub total_trades: String,
}

pub async fn get_summary(
    Query(params): Query<SummaryQuery>,
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, AppError> {
    let range = parse_range(params.range.as_deref())?;
    let summary = state.dashboard.summary(range).await?;

    Ok(Json(SummaryResponse {
        range: range.to_string(),
        total_profit: summary.total_profit.to_canonical_string(),
        win_rate: summary.win_rate,
        total_trades: summary.total_trades,
        display: SummaryDisplay {
            total_profit: format_currency(summary.total_profit),
            win_rate: format!("{}%", summary.win_rate),
            total_trades: summary.total_trades.to_string(),
        },
    }))
}
