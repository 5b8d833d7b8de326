use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::parse_stored_id;
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, first_name, last_name, date_of_birth, email, phone, address,
         emergency_contact_name, emergency_contact_phone, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.date_of_birth,
            patient.email,
            patient.phone,
            patient.address,
            patient.emergency_contact_name,
            patient.emergency_contact_phone,
            patient.created_at,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, first_name, last_name, date_of_birth, email, phone, address,
                    emergency_contact_name, emergency_contact_phone, created_at
             FROM patients WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, NaiveDate>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                    row.get::<_, Option<String>>(8)?,
                    row.get::<_, DateTime<Utc>>(9)?,
                ))
            },
        )
        .optional()?;

    let Some((
        id,
        first_name,
        last_name,
        date_of_birth,
        email,
        phone,
        address,
        emergency_contact_name,
        emergency_contact_phone,
        created_at,
    )) = row
    else {
        return Ok(None);
    };

    Ok(Some(Patient {
        id: parse_stored_id(&id)?,
        first_name,
        last_name,
        date_of_birth,
        email,
        phone,
        address,
        emergency_contact_name,
        emergency_contact_phone,
        created_at,
    }))
}

/// Remove every patient and intake record.
pub fn delete_all_records(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM intake_records", [])?;
    conn.execute("DELETE FROM patients", [])?;
    Ok(())
}
