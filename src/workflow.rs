//! Intake workflow — creation, step transitions, flagging and dashboard counts.
//!
//! Every operation takes the caller's `Connection`; writes that touch more
//! than one row run inside a transaction so they land together or not at all.

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::enums::{IntakeStatus, IntakeStep};
use crate::models::{IntakeRecord, IntakeSummary, Patient, StepPayload};

/// Reason recorded when an intake is flagged without one.
pub const DEFAULT_FLAG_REASON: &str = "Needs review";

/// Number of rows the dashboard shows under "recent activity".
pub const RECENT_INTAKE_LIMIT: u32 = 10;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for WorkflowError {
    fn from(err: rusqlite::Error) -> Self {
        WorkflowError::Database(DatabaseError::Sqlite(err))
    }
}

// ═══════════════════════════════════════════
// Input and view types
// ═══════════════════════════════════════════

/// Demographics captured by the new-intake form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPatientIntake {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: String, // YYYY-MM-DD
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    pub emergency_contact_phone: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub complete: i64,
    pub flagged: i64,
}

/// Everything the patient detail screen renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDetail {
    pub patient: Patient,
    pub intake: IntakeRecord,
    pub completion_percentage: u8,
    pub pending_steps: Vec<String>,
}

// ═══════════════════════════════════════════
// Operations
// ═══════════════════════════════════════════

/// Create a patient together with their intake record.
///
/// The intake starts `pending` with personal info already checked off,
/// since filling in this form is that step.
pub fn create_patient_intake(
    conn: &Connection,
    input: &NewPatientIntake,
) -> Result<(Patient, IntakeRecord), WorkflowError> {
    let first_name = required(&input.first_name, "First name")?;
    let last_name = required(&input.last_name, "Last name")?;
    let date_of_birth = parse_date_of_birth(&input.date_of_birth)?;

    let now = Utc::now();
    let patient = Patient {
        id: Uuid::new_v4(),
        first_name,
        last_name,
        date_of_birth,
        email: optional(&input.email),
        phone: optional(&input.phone),
        address: optional(&input.address),
        emergency_contact_name: optional(&input.emergency_contact_name),
        emergency_contact_phone: optional(&input.emergency_contact_phone),
        created_at: now,
    };
    let intake = IntakeRecord::start(patient.id, now);

    let tx = conn.unchecked_transaction()?;
    db::insert_patient(&tx, &patient)?;
    db::insert_intake(&tx, &intake)?;
    tx.commit()?;

    tracing::info!(
        patient_id = %patient.id,
        intake_id = %intake.id,
        "Intake started"
    );
    Ok((patient, intake))
}

/// Set one checklist step and re-derive the intake status.
///
/// `step_name` must be one of the five step column names. A payload is only
/// accepted on the step it belongs to.
pub fn update_intake_step(
    conn: &Connection,
    intake_id: &Uuid,
    step_name: &str,
    value: bool,
    payload: &StepPayload,
) -> Result<IntakeRecord, WorkflowError> {
    let step = IntakeStep::from_str(step_name.trim())
        .map_err(|_| WorkflowError::Validation(format!("Unknown intake step: {step_name}")))?;
    if !payload.fits(step) {
        return Err(WorkflowError::Validation(format!(
            "Payload does not apply to step {}",
            step.as_str()
        )));
    }

    let mut intake = load_intake(conn, intake_id)?;
    let before = intake.status;
    let now = Utc::now();

    intake.set_step(step, value);
    intake.apply_payload(payload);
    intake.recompute_status(now);
    intake.updated_at = now;

    db::update_intake(conn, &intake)?;

    tracing::debug!(intake_id = %intake.id, step = step.as_str(), value, "Intake step updated");
    if intake.status != before {
        tracing::info!(
            intake_id = %intake.id,
            from = before.as_str(),
            to = intake.status.as_str(),
            "Intake status changed"
        );
    }
    Ok(intake)
}

/// Mark an intake for manual review. Blank reasons become
/// [`DEFAULT_FLAG_REASON`].
pub fn flag_intake(
    conn: &Connection,
    intake_id: &Uuid,
    reason: &str,
) -> Result<IntakeRecord, WorkflowError> {
    let mut intake = load_intake(conn, intake_id)?;
    let reason = match reason.trim() {
        "" => DEFAULT_FLAG_REASON.to_string(),
        r => r.to_string(),
    };

    intake.flag(reason);
    intake.updated_at = Utc::now();
    db::update_intake(conn, &intake)?;

    tracing::warn!(
        intake_id = %intake.id,
        reason = intake.flagged_reason.as_deref().unwrap_or_default(),
        "Intake flagged for review"
    );
    Ok(intake)
}

/// Count intake records by status.
pub fn get_dashboard_stats(conn: &Connection) -> Result<DashboardStats, WorkflowError> {
    let mut stats = DashboardStats::default();
    for (status, count) in db::count_intakes_by_status(conn)? {
        stats.total += count;
        match status {
            IntakeStatus::Pending => stats.pending = count,
            IntakeStatus::InProgress => stats.in_progress = count,
            IntakeStatus::Complete => stats.complete = count,
            IntakeStatus::Flagged => stats.flagged = count,
        }
    }
    Ok(stats)
}

pub fn get_intake(conn: &Connection, intake_id: &Uuid) -> Result<IntakeRecord, WorkflowError> {
    load_intake(conn, intake_id)
}

/// All intakes, optionally narrowed to one status, most recently updated first.
pub fn list_intakes(
    conn: &Connection,
    status: Option<IntakeStatus>,
) -> Result<Vec<IntakeSummary>, WorkflowError> {
    Ok(db::list_intake_summaries(conn, status, None)?)
}

pub fn recent_intakes(conn: &Connection, limit: u32) -> Result<Vec<IntakeSummary>, WorkflowError> {
    Ok(db::list_intake_summaries(conn, None, Some(limit))?)
}

pub fn flagged_intakes(conn: &Connection) -> Result<Vec<IntakeSummary>, WorkflowError> {
    list_intakes(conn, Some(IntakeStatus::Flagged))
}

pub fn get_patient_detail(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<PatientDetail, WorkflowError> {
    let patient = db::get_patient(conn, patient_id)?.ok_or_else(|| WorkflowError::NotFound {
        entity: "Patient",
        id: patient_id.to_string(),
    })?;
    let intake =
        db::get_intake_by_patient(conn, patient_id)?.ok_or_else(|| WorkflowError::NotFound {
            entity: "IntakeRecord",
            id: format!("patient {patient_id}"),
        })?;

    Ok(PatientDetail {
        completion_percentage: intake.completion_percentage(),
        pending_steps: intake.pending_steps().into_iter().map(String::from).collect(),
        patient,
        intake,
    })
}

// ═══════════════════════════════════════════
// Demo data
// ═══════════════════════════════════════════

struct DemoPatient {
    first_name: &'static str,
    last_name: &'static str,
    date_of_birth: (i32, u32, u32),
    email: &'static str,
    phone: &'static str,
    status: IntakeStatus,
    steps: [bool; 5],
    flag_reason: Option<&'static str>,
}

const DEMO_PATIENTS: &[DemoPatient] = &[
    DemoPatient {
        first_name: "Sarah",
        last_name: "Johnson",
        date_of_birth: (1985, 3, 15),
        email: "sarah.j@email.com",
        phone: "555-0101",
        status: IntakeStatus::Complete,
        steps: [true, true, true, true, true],
        flag_reason: None,
    },
    DemoPatient {
        first_name: "Michael",
        last_name: "Chen",
        date_of_birth: (1990, 7, 22),
        email: "m.chen@email.com",
        phone: "555-0102",
        status: IntakeStatus::InProgress,
        steps: [true, true, true, false, false],
        flag_reason: None,
    },
    DemoPatient {
        first_name: "Emily",
        last_name: "Rodriguez",
        date_of_birth: (1978, 11, 8),
        email: "emily.r@email.com",
        phone: "555-0103",
        status: IntakeStatus::Flagged,
        steps: [true, false, false, false, false],
        flag_reason: Some("Insurance verification failed - policy expired"),
    },
    DemoPatient {
        first_name: "James",
        last_name: "Wilson",
        date_of_birth: (1995, 1, 30),
        email: "jwilson@email.com",
        phone: "555-0104",
        status: IntakeStatus::Pending,
        steps: [true, false, false, false, false],
        flag_reason: None,
    },
    DemoPatient {
        first_name: "Maria",
        last_name: "Garcia",
        date_of_birth: (1982, 9, 12),
        email: "mgarcia@email.com",
        phone: "555-0105",
        status: IntakeStatus::InProgress,
        steps: [true, true, false, false, false],
        flag_reason: None,
    },
];

/// Replace every record with the showcase patients. Returns how many were
/// inserted.
pub fn seed_demo_data(conn: &Connection) -> Result<usize, WorkflowError> {
    let now = Utc::now();
    let tx = conn.unchecked_transaction()?;
    db::delete_all_records(&tx)?;

    for demo in DEMO_PATIENTS {
        let (year, month, day) = demo.date_of_birth;
        let date_of_birth = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            WorkflowError::Validation(format!("Invalid demo date for {}", demo.first_name))
        })?;
        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: demo.first_name.into(),
            last_name: demo.last_name.into(),
            date_of_birth,
            email: Some(demo.email.into()),
            phone: Some(demo.phone.into()),
            address: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            created_at: now,
        };

        let mut intake = IntakeRecord::start(patient.id, now);
        for (step, done) in IntakeStep::ALL.iter().zip(demo.steps) {
            intake.set_step(*step, done);
        }
        intake.status = demo.status;
        intake.flagged_reason = demo.flag_reason.map(String::from);
        if demo.status == IntakeStatus::Complete {
            intake.completed_at = Some(now);
        }

        db::insert_patient(&tx, &patient)?;
        db::insert_intake(&tx, &intake)?;
    }
    tx.commit()?;

    tracing::info!(count = DEMO_PATIENTS.len(), "Demo data loaded");
    Ok(DEMO_PATIENTS.len())
}

// ═══════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════

fn load_intake(conn: &Connection, intake_id: &Uuid) -> Result<IntakeRecord, WorkflowError> {
    db::get_intake(conn, intake_id)?.ok_or_else(|| WorkflowError::NotFound {
        entity: "IntakeRecord",
        id: intake_id.to_string(),
    })
}

fn required(value: &str, label: &str) -> Result<String, WorkflowError> {
    match value.trim() {
        "" => Err(WorkflowError::Validation(format!("{label} is required"))),
        v => Ok(v.to_string()),
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn parse_date_of_birth(value: &str) -> Result<NaiveDate, WorkflowError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WorkflowError::Validation("Date of birth is required".into()));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        WorkflowError::Validation(format!(
            "Invalid date of birth '{value}' (expected YYYY-MM-DD)"
        ))
    })
}
