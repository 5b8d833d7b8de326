//! Dashboard endpoints.
//!
//! Two endpoints:
//! - `GET /api/stats` — intake counts by status
//! - `GET /api/dashboard` — counts plus recent and flagged intakes

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::IntakeSummary;
use crate::workflow::{self, DashboardStats};

/// `GET /api/stats` — counts recomputed on every call.
pub async fn stats(State(ctx): State<ApiContext>) -> Result<Json<DashboardStats>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let stats = workflow::get_dashboard_stats(&conn)?;
    Ok(Json(stats))
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub recent_intakes: Vec<IntakeSummary>,
    pub flagged: Vec<IntakeSummary>,
}

/// `GET /api/dashboard` — landing screen data.
pub async fn overview(
    State(ctx): State<ApiContext>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let stats = workflow::get_dashboard_stats(&conn)?;
    let recent_intakes = workflow::recent_intakes(&conn, workflow::RECENT_INTAKE_LIMIT)?;
    let flagged = workflow::flagged_intakes(&conn)?;

    Ok(Json(DashboardResponse {
        stats,
        recent_intakes,
        flagged,
    }))
}
