use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::parse_stored_id;
use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

const INTAKE_COLUMNS: &str = "id, patient_id, status, personal_info_complete, insurance_verified,
     medical_history_complete, consent_forms_signed, id_verified, insurance_provider,
     insurance_policy_number, insurance_group_number, allergies, current_medications,
     medical_conditions, notes, flagged_reason, started_at, completed_at, created_at, updated_at";

/// Raw column values, converted into an `IntakeRecord` outside the row closure
/// so parse failures surface as `DatabaseError`.
struct IntakeRow {
    id: String,
    patient_id: String,
    status: String,
    steps: [bool; 5],
    insurance_provider: Option<String>,
    insurance_policy_number: Option<String>,
    insurance_group_number: Option<String>,
    allergies: Option<String>,
    current_medications: Option<String>,
    medical_conditions: Option<String>,
    notes: Option<String>,
    flagged_reason: Option<String>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IntakeRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            status: row.get(2)?,
            steps: [
                row.get::<_, i32>(3)? != 0,
                row.get::<_, i32>(4)? != 0,
                row.get::<_, i32>(5)? != 0,
                row.get::<_, i32>(6)? != 0,
                row.get::<_, i32>(7)? != 0,
            ],
            insurance_provider: row.get(8)?,
            insurance_policy_number: row.get(9)?,
            insurance_group_number: row.get(10)?,
            allergies: row.get(11)?,
            current_medications: row.get(12)?,
            medical_conditions: row.get(13)?,
            notes: row.get(14)?,
            flagged_reason: row.get(15)?,
            started_at: row.get(16)?,
            completed_at: row.get(17)?,
            created_at: row.get(18)?,
            updated_at: row.get(19)?,
        })
    }

    fn into_record(self) -> Result<IntakeRecord, DatabaseError> {
        let [personal_info_complete, insurance_verified, medical_history_complete, consent_forms_signed, id_verified] =
            self.steps;
        Ok(IntakeRecord {
            id: parse_stored_id(&self.id)?,
            patient_id: parse_stored_id(&self.patient_id)?,
            status: IntakeStatus::from_str(&self.status)?,
            personal_info_complete,
            insurance_verified,
            medical_history_complete,
            consent_forms_signed,
            id_verified,
            insurance_provider: self.insurance_provider,
            insurance_policy_number: self.insurance_policy_number,
            insurance_group_number: self.insurance_group_number,
            allergies: self.allergies,
            current_medications: self.current_medications,
            medical_conditions: self.medical_conditions,
            notes: self.notes,
            flagged_reason: self.flagged_reason,
            started_at: self.started_at,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub fn insert_intake(conn: &Connection, intake: &IntakeRecord) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO intake_records ({INTAKE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
        ),
        params![
            intake.id.to_string(),
            intake.patient_id.to_string(),
            intake.status.as_str(),
            intake.personal_info_complete as i32,
            intake.insurance_verified as i32,
            intake.medical_history_complete as i32,
            intake.consent_forms_signed as i32,
            intake.id_verified as i32,
            intake.insurance_provider,
            intake.insurance_policy_number,
            intake.insurance_group_number,
            intake.allergies,
            intake.current_medications,
            intake.medical_conditions,
            intake.notes,
            intake.flagged_reason,
            intake.started_at,
            intake.completed_at,
            intake.created_at,
            intake.updated_at,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

/// Overwrite every mutable column of an existing intake.
pub fn update_intake(conn: &Connection, intake: &IntakeRecord) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE intake_records SET
            status = ?2, personal_info_complete = ?3, insurance_verified = ?4,
            medical_history_complete = ?5, consent_forms_signed = ?6, id_verified = ?7,
            insurance_provider = ?8, insurance_policy_number = ?9, insurance_group_number = ?10,
            allergies = ?11, current_medications = ?12, medical_conditions = ?13,
            notes = ?14, flagged_reason = ?15, started_at = ?16, completed_at = ?17,
            updated_at = ?18
         WHERE id = ?1",
        params![
            intake.id.to_string(),
            intake.status.as_str(),
            intake.personal_info_complete as i32,
            intake.insurance_verified as i32,
            intake.medical_history_complete as i32,
            intake.consent_forms_signed as i32,
            intake.id_verified as i32,
            intake.insurance_provider,
            intake.insurance_policy_number,
            intake.insurance_group_number,
            intake.allergies,
            intake.current_medications,
            intake.medical_conditions,
            intake.notes,
            intake.flagged_reason,
            intake.started_at,
            intake.completed_at,
            intake.updated_at,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "IntakeRecord".into(),
            id: intake.id.to_string(),
        });
    }
    Ok(())
}

pub fn get_intake(conn: &Connection, id: &Uuid) -> Result<Option<IntakeRecord>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {INTAKE_COLUMNS} FROM intake_records WHERE id = ?1"),
        params![id.to_string()],
        IntakeRow::read,
    )
    .optional()?
    .map(IntakeRow::into_record)
    .transpose()
}

pub fn get_intake_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Option<IntakeRecord>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {INTAKE_COLUMNS} FROM intake_records WHERE patient_id = ?1"),
        params![patient_id.to_string()],
        IntakeRow::read,
    )
    .optional()?
    .map(IntakeRow::into_record)
    .transpose()
}

/// Intake summaries joined with the patient name, most recently updated first.
pub fn list_intake_summaries(
    conn: &Connection,
    status: Option<IntakeStatus>,
    limit: Option<u32>,
) -> Result<Vec<IntakeSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.patient_id, p.first_name, p.last_name, i.status,
                i.personal_info_complete, i.insurance_verified, i.medical_history_complete,
                i.consent_forms_signed, i.id_verified, i.flagged_reason, i.updated_at
         FROM intake_records i
         JOIN patients p ON p.id = i.patient_id
         WHERE (?1 IS NULL OR i.status = ?1)
         ORDER BY i.updated_at DESC
         LIMIT ?2",
    )?;

    // SQLite treats a negative LIMIT as unbounded
    let limit = limit.map(i64::from).unwrap_or(-1);

    let rows = stmt.query_map(params![status.map(|s| s.as_str()), limit], |row| {
        let done = (5usize..10)
            .map(|i| row.get::<_, i32>(i).map(|v| v != 0))
            .collect::<rusqlite::Result<Vec<bool>>>()?
            .into_iter()
            .filter(|v| *v)
            .count();
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            done,
            row.get::<_, Option<String>>(10)?,
            row.get::<_, DateTime<Utc>>(11)?,
        ))
    })?;

    let mut summaries = Vec::new();
    for row in rows {
        let (id, patient_id, first_name, last_name, status, done, flagged_reason, updated_at) =
            row?;
        summaries.push(IntakeSummary {
            intake_id: parse_stored_id(&id)?,
            patient_id: parse_stored_id(&patient_id)?,
            patient_name: format!("{first_name} {last_name}"),
            status: IntakeStatus::from_str(&status)?,
            completion_percentage: completion_percentage_of(done),
            flagged_reason,
            updated_at,
        });
    }
    Ok(summaries)
}

/// Number of intake records per status. Statuses with no records are omitted.
pub fn count_intakes_by_status(
    conn: &Connection,
) -> Result<Vec<(IntakeStatus, i64)>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT status, COUNT(*) FROM intake_records GROUP BY status")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut counts = Vec::new();
    for row in rows {
        let (status, count) = row?;
        counts.push((IntakeStatus::from_str(&status)?, count));
    }
    Ok(counts)
}
