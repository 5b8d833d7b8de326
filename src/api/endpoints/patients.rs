//! Patient endpoint.
//!
//! `GET /api/patients/:id` — patient demographics with intake progress.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext};
use crate::workflow::{self, PatientDetail};

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientDetail>, ApiError> {
    let patient_id = parse_id(&patient_id)?;
    let conn = ctx.core.lock_db()?;
    let detail = workflow::get_patient_detail(&conn, &patient_id)?;
    Ok(Json(detail))
}
