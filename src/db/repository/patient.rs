use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Patient;

const DATE_FMT: &str = "%Y-%m-%d";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, first_name, last_name, date_of_birth, phone_number,
         email, address, medical_history)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.date_of_birth.format(DATE_FMT).to_string(),
            patient.phone_number,
            patient.email,
            patient.address,
            patient.medical_history,
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, date_of_birth, phone_number, email,
         address, medical_history
         FROM patients WHERE id = ?1",
    )?;

    let mut rows = stmt.query_map(params![id.to_string()], patient_from_row)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Update contact details and medical history. Identity fields (name, DOB)
/// are immutable after registration.
pub fn update_patient_contact(
    conn: &Connection,
    id: &Uuid,
    phone_number: Option<&str>,
    email: Option<&str>,
    address: Option<&str>,
    medical_history: Option<&str>,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients
         SET phone_number = ?2, email = ?3, address = ?4, medical_history = ?5,
             updated_at = datetime('now')
         WHERE id = ?1",
        params![id.to_string(), phone_number, email, address, medical_history],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn patient_from_row(row: &rusqlite::Row<'_>) -> Result<Patient, rusqlite::Error> {
    let id: String = row.get(0)?;
    let dob: String = row.get(3)?;
    Ok(Patient {
        id: id.parse().unwrap_or_else(|_| Uuid::nil()),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        date_of_birth: NaiveDate::parse_from_str(&dob, DATE_FMT).unwrap_or_default(),
        phone_number: row.get(4)?,
        email: row.get(5)?,
        address: row.get(6)?,
        medical_history: row.get(7)?,
    })
}
