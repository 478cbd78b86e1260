use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_range, AppState};
use crate::error::AppError;
use crate::render::{format_compact, format_currency};

#[derive(Debug, Deserialize)]
pub struct PnlQuery {
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyResponse {
    pub range: String,
    pub months: Vec<MonthDto>,
    pub total_pnl: String,
    pub total_pnl_display: String,
    pub y_axis_max: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthDto {
    pub month: &'static str,
    pub pnl: String,
    /// Bar label, e.g. `$1.23K`.
    pub label: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeResponse {
    pub range: String,
    pub points: Vec<CumulativeDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeDto {
    pub index: usize,
    pub date: String,
    pub pnl: String,
    pub cumulative_pnl: String,
}

pub async fn get_monthly(
    Query(params): Query<PnlQuery>,
    State(state): State<AppState>,
) -> Result<Json<MonthlyResponse>, AppError> {
    let range = parse_range(params.range.as_deref())?;
    let report = state.dashboard.monthly(range).await?;

    let months = report
        .buckets
        .iter()
        .map(|b| MonthDto {
            month: b.period_key,
            pnl: b.total_pnl.to_canonical_string(),
            label: format_compact(b.total_pnl),
        })
        .collect();

    Ok(Json(MonthlyResponse {
        range: range.to_string(),
        months,
        total_pnl: report.total_pnl.to_canonical_string(),
        total_pnl_display: format_currency(report.total_pnl),
        y_axis_max: report.y_axis_max.to_canonical_string(),
    }))
}

pub async fn get_cumulative(
    Query(params): Query<PnlQuery>,
    State(state): State<AppState>,
) -> Result<Json<CumulativeResponse>, AppError> {
    let range = parse_range(params.range.as_deref())?;
    let points = state.dashboard.cumulative(range).await?;

    Ok(Json(CumulativeResponse {
        range: range.to_string(),
        points: points
            .into_iter()
            .map(|p| CumulativeDto {
                index: p.index,
                date: p.period_label,
                pnl: p.pnl.to_canonical_string(),
                cumulative_pnl: p.cumulative_pnl.to_canonical_string(),
            })
            .collect(),
    }))
}
