//! Intake endpoints.
//!
//! Five endpoints:
//! - `POST /api/intakes` — start an intake for a new patient
//! - `GET /api/intakes` — list intakes, optional `?status=` filter
//! - `GET /api/intakes/:id` — one intake record
//! - `POST /api/intakes/:id/steps` — set a checklist step
//! - `POST /api/intakes/:id/flag` — flag for manual review

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{parse_id, parse_status_filter, ApiContext};
use crate::models::{IntakeRecord, IntakeSummary, Patient, StepPayload};
use crate::workflow::{self, NewPatientIntake};

#[derive(Serialize)]
pub struct CreatedIntake {
    pub patient: Patient,
    pub intake: IntakeRecord,
}

/// `POST /api/intakes` — create patient and intake together.
pub async fn create(
    State(ctx): State<ApiContext>,
    body: Result<Json<NewPatientIntake>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedIntake>), ApiError> {
    let Json(input) = body?;
    let conn = ctx.core.lock_db()?;
    let (patient, intake) = workflow::create_patient_intake(&conn, &input)?;
    Ok((StatusCode::CREATED, Json(CreatedIntake { patient, intake })))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub intakes: Vec<IntakeSummary>,
}

/// `GET /api/intakes` — patient list screen.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let status = parse_status_filter(query.status.as_deref())?;
    let conn = ctx.core.lock_db()?;
    let intakes = workflow::list_intakes(&conn, status)?;
    Ok(Json(ListResponse { intakes }))
}

/// `GET /api/intakes/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(intake_id): Path<String>,
) -> Result<Json<IntakeRecord>, ApiError> {
    let intake_id = parse_id(&intake_id)?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(workflow::get_intake(&conn, &intake_id)?))
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct StepUpdateRequest {
    pub step: String,
    #[serde(default = "default_true")]
    pub value: bool,
    #[serde(default)]
    pub payload: StepPayload,
}

/// `POST /api/intakes/:id/steps`
pub async fn update_step(
    State(ctx): State<ApiContext>,
    Path(intake_id): Path<String>,
    body: Result<Json<StepUpdateRequest>, JsonRejection>,
) -> Result<Json<IntakeRecord>, ApiError> {
    let intake_id = parse_id(&intake_id)?;
    let Json(request) = body?;
    let conn = ctx.core.lock_db()?;
    let intake = workflow::update_intake_step(
        &conn,
        &intake_id,
        &request.step,
        request.value,
        &request.payload,
    )?;
    Ok(Json(intake))
}

#[derive(Debug, Default, Deserialize)]
pub struct FlagRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// `POST /api/intakes/:id/flag`
pub async fn flag(
    State(ctx): State<ApiContext>,
    Path(intake_id): Path<String>,
    body: Result<Json<FlagRequest>, JsonRejection>,
) -> Result<Json<IntakeRecord>, ApiError> {
    let intake_id = parse_id(&intake_id)?;
    let Json(request) = body?;
    let conn = ctx.core.lock_db()?;
    let intake = workflow::flag_intake(&conn, &intake_id, request.reason.as_deref().unwrap_or(""))?;
    Ok(Json(intake))
}
