use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{PatientStatus, QueueStatus};
use crate::models::Booking;

pub(crate) const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn insert_booking(conn: &Connection, booking: &Booking) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO bookings (id, patient_id, doctor_name, booking_date, queue_status,
         patient_status, check_in_time, consultation_start_time, consultation_end_time,
         notes, provider_notes, chief_complaint, is_adhoc)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            booking.id.to_string(),
            booking.patient_id.to_string(),
            booking.doctor_name,
            fmt_datetime(&booking.booking_date),
            booking.queue_status.as_str(),
            booking.patient_status.as_str(),
            booking.check_in_time.as_ref().map(fmt_datetime),
            booking.consultation_start_time.as_ref().map(fmt_datetime),
            booking.consultation_end_time.as_ref().map(fmt_datetime),
            booking.notes,
            booking.provider_notes,
            booking.chief_complaint,
            booking.is_adhoc as i32,
        ],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &Uuid) -> Result<Option<Booking>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, doctor_name, booking_date, queue_status, patient_status,
         check_in_time, consultation_start_time, consultation_end_time, notes,
         provider_notes, chief_complaint, is_adhoc
         FROM bookings WHERE id = ?1",
    )?;

    let mut rows = stmt.query_map(params![id.to_string()], |row| Ok(booking_row(row)))?;
    match rows.next() {
        Some(row) => Ok(Some(booking_from_row(row??)?)),
        None => Ok(None),
    }
}

pub(crate) fn fmt_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

pub(crate) fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT).ok()
}

// Internal row type for Booking mapping
struct BookingRow {
    id: String,
    patient_id: String,
    doctor_name: String,
    booking_date: String,
    queue_status: String,
    patient_status: String,
    check_in_time: Option<String>,
    consultation_start_time: Option<String>,
    consultation_end_time: Option<String>,
    notes: Option<String>,
    provider_notes: Option<String>,
    chief_complaint: Option<String>,
    is_adhoc: i32,
}

fn booking_row(row: &rusqlite::Row<'_>) -> Result<BookingRow, rusqlite::Error> {
    Ok(BookingRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_name: row.get(2)?,
        booking_date: row.get(3)?,
        queue_status: row.get(4)?,
        patient_status: row.get(5)?,
        check_in_time: row.get(6)?,
        consultation_start_time: row.get(7)?,
        consultation_end_time: row.get(8)?,
        notes: row.get(9)?,
        provider_notes: row.get(10)?,
        chief_complaint: row.get(11)?,
        is_adhoc: row.get(12)?,
    })
}

fn booking_from_row(row: BookingRow) -> Result<Booking, DatabaseError> {
    Ok(Booking {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        patient_id: Uuid::parse_str(&row.patient_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        doctor_name: row.doctor_name,
        booking_date: parse_datetime(&row.booking_date).unwrap_or_default(),
        queue_status: QueueStatus::from_str(&row.queue_status)?,
        patient_status: PatientStatus::from_str(&row.patient_status)?,
        check_in_time: row.check_in_time.as_deref().and_then(parse_datetime),
        consultation_start_time: row
            .consultation_start_time
            .as_deref()
            .and_then(parse_datetime),
        consultation_end_time: row
            .consultation_end_time
            .as_deref()
            .and_then(parse_datetime),
        notes: row.notes,
        provider_notes: row.provider_notes,
        chief_complaint: row.chief_complaint,
        is_adhoc: row.is_adhoc != 0,
    })
}
