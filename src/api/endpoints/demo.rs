//! Demo data endpoint.
//!
//! `POST /api/demo/seed` — wipe the store and load the showcase patients.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::workflow;

#[derive(Serialize)]
pub struct SeedResponse {
    pub seeded: usize,
}

pub async fn seed(State(ctx): State<ApiContext>) -> Result<Json<SeedResponse>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let seeded = workflow::seed_demo_data(&conn)?;
    Ok(Json(SeedResponse { seeded }))
}
