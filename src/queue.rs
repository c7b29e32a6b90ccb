//! Queue view layer — joined patient+booking view model and the queries
//! behind every dashboard screen: lookup, filtered search, tab buckets,
//! aggregate counts, status updates, and the in-office grouping.
//!
//! All counts are independent count queries with no transactional
//! snapshot; concurrent writes can make them mutually inconsistent,
//! which is acceptable for a polling dashboard.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::enums::{PatientStatus, QueueStatus};
use crate::models::{Booking, QueueSearchFilter};

// ═══════════════════════════════════════════
// View types — serialised to the dashboard
// ═══════════════════════════════════════════

/// Joined patient+booking record, one row per visit.
#[derive(Debug, Clone, Serialize)]
pub struct QueueItem {
    pub booking_id: Uuid,
    pub patient_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: Option<String>,
    pub doctor_name: String,
    pub booking_date: NaiveDateTime,
    pub queue_status: QueueStatus,
    pub patient_status: PatientStatus,
    pub check_in_time: Option<NaiveDateTime>,
    pub consultation_start_time: Option<NaiveDateTime>,
    pub consultation_end_time: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub provider_notes: Option<String>,
    pub medical_history: Option<String>,
    pub chief_complaint: Option<String>,
    pub is_adhoc: bool,
    /// "adhoc" for walk-ins, "booked" for scheduled visits.
    pub appointment_type: &'static str,
}

/// Coarse counts for the dashboard tab bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueCounts {
    pub prebooked: u32,
    pub in_office: u32,
    pub completed: u32,
}

/// One count per patient-status value, legacy vocabulary included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientStatusCounts {
    pub pending: u32,
    pub confirmed: u32,
    pub intake: u32,
    pub ready_for_provider: u32,
    pub provider: u32,
    pub ready_for_discharge: u32,
    pub discharged: u32,
    pub no_show: u32,
    pub cancelled: u32,
    pub checked_in: u32,
    pub in_consultation: u32,
    pub completed: u32,
}

/// Entry in the in-office view, with a human-readable wait duration.
#[derive(Debug, Clone, Serialize)]
pub struct InOfficeEntry {
    #[serde(flatten)]
    pub item: QueueItem,
    pub wait_display: Option<String>,
}

/// Active bookings partitioned for the in-office screen.
#[derive(Debug, Clone, Serialize)]
pub struct InOfficeGroups {
    pub waiting_room: Vec<InOfficeEntry>,
    pub in_call: Vec<InOfficeEntry>,
}

/// Staff-initiated status change. Any status may be set to any other
/// status; there is no legal-transition validation.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub queue_status: QueueStatus,
    pub patient_status: Option<PatientStatus>,
    pub notes: Option<String>,
}

/// Dashboard tab buckets for the patients listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueBucket {
    PreBooked,
    InOffice,
    Completed,
}

impl FromStr for QueueBucket {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "pre_booked" => Ok(Self::PreBooked),
            "in_office" => Ok(Self::InOffice),
            "completed" => Ok(Self::Completed),
            _ => Err(DatabaseError::InvalidEnum {
                field: "QueueBucket".into(),
                value: s.into(),
            }),
        }
    }
}

/// Which timestamp a status update stamps, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StampField {
    CheckIn,
    ConsultationStart,
    ConsultationEnd,
}

impl StampField {
    fn column(&self) -> &'static str {
        match self {
            Self::CheckIn => "check_in_time",
            Self::ConsultationStart => "consultation_start_time",
            Self::ConsultationEnd => "consultation_end_time",
        }
    }
}

/// Fixed status→timestamp mapping applied on update.
fn stamp_for(queue: QueueStatus, patient: Option<PatientStatus>) -> Option<StampField> {
    match (queue, patient) {
        (QueueStatus::Completed, _) => Some(StampField::ConsultationEnd),
        (
            QueueStatus::Active,
            Some(PatientStatus::Intake) | Some(PatientStatus::CheckedIn),
        ) => Some(StampField::CheckIn),
        (
            QueueStatus::Active,
            Some(PatientStatus::Provider) | Some(PatientStatus::InConsultation),
        ) => Some(StampField::ConsultationStart),
        _ => None,
    }
}

// ═══════════════════════════════════════════
// Queries
// ═══════════════════════════════════════════

const QUEUE_ITEM_COLUMNS: &str = "b.id, b.patient_id, p.first_name, p.last_name,
         p.date_of_birth, p.phone_number, b.doctor_name, b.booking_date,
         b.queue_status, b.patient_status, b.check_in_time,
         b.consultation_start_time, b.consultation_end_time, b.notes,
         b.provider_notes, p.medical_history, b.chief_complaint, b.is_adhoc";

fn queue_item_select() -> String {
    format!(
        "SELECT {QUEUE_ITEM_COLUMNS}
         FROM bookings b
         INNER JOIN patients p ON b.patient_id = p.id"
    )
}

/// Fetch the joined queue item for a booking, or `None` if unknown.
pub fn fetch_queue_item(
    conn: &Connection,
    booking_id: &Uuid,
) -> Result<Option<QueueItem>, DatabaseError> {
    let sql = format!("{} WHERE b.id = ?1", queue_item_select());
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![booking_id.to_string()], |row| {
        Ok(queue_item_row(row))
    })?;
    match rows.next() {
        Some(row) => Ok(Some(queue_item_from_row(row??)?)),
        None => Ok(None),
    }
}

/// Search bookings with zero or more filters. Name and doctor matching
/// is case-insensitive substring containment; results are ordered by
/// booking date descending (most recent first).
pub fn search_queue(
    conn: &Connection,
    filter: &QueueSearchFilter,
) -> Result<Vec<QueueItem>, DatabaseError> {
    let mut sql = format!("{} WHERE 1=1", queue_item_select());
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut param_idx = 1;

    match filter.queue_status {
        // The completed tab folds in cancelled visits
        Some(QueueStatus::Completed) => {
            sql.push_str(" AND b.queue_status IN ('completed', 'cancelled')");
        }
        Some(queue_status) => {
            sql.push_str(&format!(" AND b.queue_status = ?{param_idx}"));
            params_vec.push(Box::new(queue_status.as_str()));
            param_idx += 1;
        }
        None => {}
    }

    if let Some(patient_status) = filter.patient_status {
        sql.push_str(&format!(" AND b.patient_status = ?{param_idx}"));
        params_vec.push(Box::new(patient_status.as_str()));
        param_idx += 1;
    }

    if let Some(doctor) = &filter.doctor_name {
        if !doctor.trim().is_empty() {
            sql.push_str(&format!(
                " AND b.doctor_name LIKE ?{param_idx} COLLATE NOCASE"
            ));
            params_vec.push(Box::new(format!("%{}%", doctor.trim())));
            param_idx += 1;
        }
    }

    if let Some(name) = &filter.patient_name {
        if !name.trim().is_empty() {
            sql.push_str(&format!(
                " AND (p.first_name LIKE ?{p} COLLATE NOCASE
                   OR p.last_name LIKE ?{p} COLLATE NOCASE)",
                p = param_idx
            ));
            params_vec.push(Box::new(format!("%{}%", name.trim())));
        }
    }

    sql.push_str(" ORDER BY b.booking_date DESC");

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(queue_item_row(row)))?;

    let mut items = Vec::new();
    for row in rows {
        items.push(queue_item_from_row(row??)?);
    }
    Ok(items)
}

/// Bookings for one dashboard tab, ordered by booking date ascending.
pub fn fetch_bucket(
    conn: &Connection,
    bucket: QueueBucket,
) -> Result<Vec<QueueItem>, DatabaseError> {
    let clause = match bucket {
        QueueBucket::PreBooked => "b.queue_status = 'pre_booked'",
        QueueBucket::InOffice => "b.queue_status = 'active'",
        QueueBucket::Completed => "b.queue_status IN ('completed', 'cancelled')",
    };
    let sql = format!(
        "{} WHERE {clause} ORDER BY b.booking_date ASC",
        queue_item_select()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(queue_item_row(row)))?;

    let mut items = Vec::new();
    for row in rows {
        items.push(queue_item_from_row(row??)?);
    }
    Ok(items)
}

/// Bookings with the given fine-grained patient status.
pub fn fetch_by_patient_status(
    conn: &Connection,
    status: PatientStatus,
) -> Result<Vec<QueueItem>, DatabaseError> {
    let sql = format!(
        "{} WHERE b.patient_status = ?1 ORDER BY b.booking_date ASC",
        queue_item_select()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![status.as_str()], |row| Ok(queue_item_row(row)))?;

    let mut items = Vec::new();
    for row in rows {
        items.push(queue_item_from_row(row??)?);
    }
    Ok(items)
}

/// Coarse counts for the tab bar. Completed folds in cancelled visits.
pub fn queue_counts(conn: &Connection) -> Result<QueueCounts, DatabaseError> {
    let prebooked: u32 = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE queue_status = 'pre_booked'",
        [],
        |row| row.get(0),
    )?;
    let in_office: u32 = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE queue_status = 'active'",
        [],
        |row| row.get(0),
    )?;
    let completed: u32 = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE queue_status IN ('completed', 'cancelled')",
        [],
        |row| row.get(0),
    )?;
    Ok(QueueCounts {
        prebooked,
        in_office,
        completed,
    })
}

/// One independent count query per patient-status value, optionally
/// scoped to the active dashboard tab's queue status.
pub fn patient_status_counts(
    conn: &Connection,
    queue_status: Option<QueueStatus>,
) -> Result<PatientStatusCounts, DatabaseError> {
    let count = |status: PatientStatus| -> Result<u32, DatabaseError> {
        let n = match queue_status {
            Some(queue) => conn.query_row(
                "SELECT COUNT(*) FROM bookings
                 WHERE patient_status = ?1 AND queue_status = ?2",
                params![status.as_str(), queue.as_str()],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM bookings WHERE patient_status = ?1",
                params![status.as_str()],
                |row| row.get(0),
            )?,
        };
        Ok(n)
    };

    Ok(PatientStatusCounts {
        pending: count(PatientStatus::Pending)?,
        confirmed: count(PatientStatus::Confirmed)?,
        intake: count(PatientStatus::Intake)?,
        ready_for_provider: count(PatientStatus::ReadyForProvider)?,
        provider: count(PatientStatus::Provider)?,
        ready_for_discharge: count(PatientStatus::ReadyForDischarge)?,
        discharged: count(PatientStatus::Discharged)?,
        no_show: count(PatientStatus::NoShow)?,
        cancelled: count(PatientStatus::Cancelled)?,
        checked_in: count(PatientStatus::CheckedIn)?,
        in_consultation: count(PatientStatus::InConsultation)?,
        completed: count(PatientStatus::Completed)?,
    })
}

/// Apply a staff status update: persist the new statuses, stamp the
/// timestamp the fixed mapping selects, and overwrite provider notes
/// when given. Returns the updated joined item, or `None` for an
/// unknown booking id. Last write wins on concurrent updates.
pub fn apply_status_update(
    conn: &Connection,
    booking_id: &Uuid,
    update: &StatusUpdate,
) -> Result<Option<QueueItem>, DatabaseError> {
    apply_status_update_at(conn, booking_id, update, Utc::now().naive_utc())
}

/// Testable inner form with an explicit "now".
pub fn apply_status_update_at(
    conn: &Connection,
    booking_id: &Uuid,
    update: &StatusUpdate,
    now: NaiveDateTime,
) -> Result<Option<QueueItem>, DatabaseError> {
    let mut sql =
        String::from("UPDATE bookings SET queue_status = ?1, updated_at = datetime('now')");
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> =
        vec![Box::new(update.queue_status.as_str())];
    let mut param_idx = 2;

    if let Some(patient_status) = update.patient_status {
        sql.push_str(&format!(", patient_status = ?{param_idx}"));
        params_vec.push(Box::new(patient_status.as_str()));
        param_idx += 1;
    }

    if let Some(stamp) = stamp_for(update.queue_status, update.patient_status) {
        sql.push_str(&format!(", {} = ?{param_idx}", stamp.column()));
        params_vec.push(Box::new(fmt_datetime(&now)));
        param_idx += 1;
    }

    if let Some(notes) = &update.notes {
        sql.push_str(&format!(", provider_notes = ?{param_idx}"));
        params_vec.push(Box::new(notes.clone()));
        param_idx += 1;
    }

    sql.push_str(&format!(" WHERE id = ?{param_idx}"));
    params_vec.push(Box::new(booking_id.to_string()));

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let changed = conn.execute(&sql, params_refs.as_slice())?;
    if changed == 0 {
        return Ok(None);
    }

    fetch_queue_item(conn, booking_id)
}

/// Partition active bookings into waiting-room and in-call groups, each
/// ordered by its relevant timestamp ascending (longest-waiting first).
/// Optional name filters narrow both groups.
pub fn in_office_groups(
    conn: &Connection,
    patient_name: Option<&str>,
    doctor_name: Option<&str>,
) -> Result<InOfficeGroups, DatabaseError> {
    in_office_groups_at(conn, patient_name, doctor_name, Utc::now().naive_utc())
}

/// Testable inner form with an explicit "now" for wait displays.
pub fn in_office_groups_at(
    conn: &Connection,
    patient_name: Option<&str>,
    doctor_name: Option<&str>,
    now: NaiveDateTime,
) -> Result<InOfficeGroups, DatabaseError> {
    let fetch_group = |status_clause: &str, order_col: &str| -> Result<Vec<QueueItem>, DatabaseError> {
        let mut sql = format!(
            "{} WHERE b.queue_status = 'active' AND {status_clause}",
            queue_item_select()
        );
        let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        let mut param_idx = 1;

        if let Some(name) = patient_name {
            if !name.trim().is_empty() {
                sql.push_str(&format!(
                    " AND (p.first_name LIKE ?{p} COLLATE NOCASE
                       OR p.last_name LIKE ?{p} COLLATE NOCASE)",
                    p = param_idx
                ));
                params_vec.push(Box::new(format!("%{}%", name.trim())));
                param_idx += 1;
            }
        }

        if let Some(doctor) = doctor_name {
            if !doctor.trim().is_empty() {
                sql.push_str(&format!(
                    " AND b.doctor_name LIKE ?{param_idx} COLLATE NOCASE"
                ));
                params_vec.push(Box::new(format!("%{}%", doctor.trim())));
            }
        }

        sql.push_str(&format!(" ORDER BY b.{order_col} ASC"));

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(queue_item_row(row)))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(queue_item_from_row(row??)?);
        }
        Ok(items)
    };

    let waiting_room = fetch_group(
        "b.patient_status IN ('intake', 'ready_for_provider', 'checked_in')",
        "check_in_time",
    )?;
    let in_call = fetch_group(
        "b.patient_status IN ('provider', 'in_consultation')",
        "consultation_start_time",
    )?;

    Ok(InOfficeGroups {
        waiting_room: waiting_room
            .into_iter()
            .map(|item| {
                let wait_display = item.check_in_time.map(|t| format_wait(t, now));
                InOfficeEntry { item, wait_display }
            })
            .collect(),
        in_call: in_call
            .into_iter()
            .map(|item| {
                let wait_display = item.consultation_start_time.map(|t| format_wait(t, now));
                InOfficeEntry { item, wait_display }
            })
            .collect(),
    })
}

/// Build a new booking record. Scheduled bookings start pre-booked and
/// pending; ad-hoc walk-ins go straight to intake with check-in stamped.
pub fn build_new_booking(
    patient_id: Uuid,
    doctor_name: String,
    booking_date: NaiveDateTime,
    chief_complaint: Option<String>,
    notes: Option<String>,
    is_adhoc: bool,
    now: NaiveDateTime,
) -> Booking {
    let (queue_status, patient_status, check_in_time) = if is_adhoc {
        (QueueStatus::Active, PatientStatus::Intake, Some(now))
    } else {
        (QueueStatus::PreBooked, PatientStatus::Pending, None)
    };

    Booking {
        id: Uuid::new_v4(),
        patient_id,
        doctor_name,
        booking_date,
        queue_status,
        patient_status,
        check_in_time,
        consultation_start_time: None,
        consultation_end_time: None,
        notes,
        provider_notes: None,
        chief_complaint,
        is_adhoc,
    }
}

/// Human-readable wait duration: "just now", "35m", "1h 05m".
pub fn format_wait(since: NaiveDateTime, now: NaiveDateTime) -> String {
    let minutes = (now - since).num_minutes().max(0);
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m")
    } else {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    }
}

// ═══════════════════════════════════════════
// Row mapping
// ═══════════════════════════════════════════

struct QueueItemRow {
    booking_id: String,
    patient_id: String,
    first_name: String,
    last_name: String,
    date_of_birth: String,
    phone_number: Option<String>,
    doctor_name: String,
    booking_date: String,
    queue_status: String,
    patient_status: String,
    check_in_time: Option<String>,
    consultation_start_time: Option<String>,
    consultation_end_time: Option<String>,
    notes: Option<String>,
    provider_notes: Option<String>,
    medical_history: Option<String>,
    chief_complaint: Option<String>,
    is_adhoc: i32,
}

fn queue_item_row(row: &rusqlite::Row<'_>) -> Result<QueueItemRow, rusqlite::Error> {
    Ok(QueueItemRow {
        booking_id: row.get(0)?,
        patient_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        date_of_birth: row.get(4)?,
        phone_number: row.get(5)?,
        doctor_name: row.get(6)?,
        booking_date: row.get(7)?,
        queue_status: row.get(8)?,
        patient_status: row.get(9)?,
        check_in_time: row.get(10)?,
        consultation_start_time: row.get(11)?,
        consultation_end_time: row.get(12)?,
        notes: row.get(13)?,
        provider_notes: row.get(14)?,
        medical_history: row.get(15)?,
        chief_complaint: row.get(16)?,
        is_adhoc: row.get(17)?,
    })
}

fn queue_item_from_row(row: QueueItemRow) -> Result<QueueItem, DatabaseError> {
    let is_adhoc = row.is_adhoc != 0;
    Ok(QueueItem {
        booking_id: Uuid::parse_str(&row.booking_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        patient_id: Uuid::parse_str(&row.patient_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        first_name: row.first_name,
        last_name: row.last_name,
        date_of_birth: NaiveDate::parse_from_str(&row.date_of_birth, "%Y-%m-%d")
            .unwrap_or_default(),
        phone_number: row.phone_number,
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
        medical_history: row.medical_history,
        chief_complaint: row.chief_complaint,
        is_adhoc,
        appointment_type: if is_adhoc { "adhoc" } else { "booked" },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{insert_booking, insert_patient};
    use crate::db::sqlite::open_memory_database;
    use crate::models::Patient;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn add_patient(conn: &Connection, first: &str, last: &str) -> Uuid {
        let id = Uuid::new_v4();
        insert_patient(
            conn,
            &Patient {
                id,
                first_name: first.into(),
                last_name: last.into(),
                date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 10).unwrap(),
                phone_number: Some("555-000-1111".into()),
                email: None,
                address: None,
                medical_history: Some("None significant".into()),
            },
        )
        .unwrap();
        id
    }

    fn add_booking(
        conn: &Connection,
        patient_id: Uuid,
        doctor: &str,
        date: &str,
        queue: QueueStatus,
        patient: PatientStatus,
    ) -> Uuid {
        let id = Uuid::new_v4();
        insert_booking(
            conn,
            &Booking {
                id,
                patient_id,
                doctor_name: doctor.into(),
                booking_date: dt(date),
                queue_status: queue,
                patient_status: patient,
                check_in_time: None,
                consultation_start_time: None,
                consultation_end_time: None,
                notes: None,
                provider_notes: None,
                chief_complaint: None,
                is_adhoc: false,
            },
        )
        .unwrap();
        id
    }

    #[test]
    fn fetch_queue_item_joins_patient_fields() {
        let conn = open_memory_database().unwrap();
        let patient_id = add_patient(&conn, "Emily", "Johnson");
        let booking_id = add_booking(
            &conn,
            patient_id,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::PreBooked,
            PatientStatus::Pending,
        );

        let item = fetch_queue_item(&conn, &booking_id).unwrap().unwrap();
        assert_eq!(item.booking_id, booking_id);
        assert_eq!(item.first_name, "Emily");
        assert_eq!(item.last_name, "Johnson");
        assert_eq!(item.medical_history.as_deref(), Some("None significant"));
        assert_eq!(item.appointment_type, "booked");
    }

    #[test]
    fn fetch_queue_item_unknown_id_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(fetch_queue_item(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn update_stamps_check_in_for_intake() {
        let conn = open_memory_database().unwrap();
        let patient_id = add_patient(&conn, "Emily", "Johnson");
        let booking_id = add_booking(
            &conn,
            patient_id,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::PreBooked,
            PatientStatus::Confirmed,
        );

        let now = dt("2025-06-01 08:50:00");
        let item = apply_status_update_at(
            &conn,
            &booking_id,
            &StatusUpdate {
                queue_status: QueueStatus::Active,
                patient_status: Some(PatientStatus::Intake),
                notes: None,
            },
            now,
        )
        .unwrap()
        .unwrap();

        assert_eq!(item.queue_status, QueueStatus::Active);
        assert_eq!(item.patient_status, PatientStatus::Intake);
        assert_eq!(item.check_in_time, Some(now));
        assert!(item.consultation_start_time.is_none());
    }

    #[test]
    fn update_stamps_consultation_start_for_provider() {
        let conn = open_memory_database().unwrap();
        let patient_id = add_patient(&conn, "Emily", "Johnson");
        let booking_id = add_booking(
            &conn,
            patient_id,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::Active,
            PatientStatus::ReadyForProvider,
        );

        let now = dt("2025-06-01 09:12:00");
        let item = apply_status_update_at(
            &conn,
            &booking_id,
            &StatusUpdate {
                queue_status: QueueStatus::Active,
                patient_status: Some(PatientStatus::Provider),
                notes: None,
            },
            now,
        )
        .unwrap()
        .unwrap();

        assert_eq!(item.consultation_start_time, Some(now));
        assert!(item.check_in_time.is_none());
    }

    #[test]
    fn update_stamps_consultation_end_on_completed() {
        let conn = open_memory_database().unwrap();
        let patient_id = add_patient(&conn, "Emily", "Johnson");
        let booking_id = add_booking(
            &conn,
            patient_id,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::Active,
            PatientStatus::Provider,
        );

        let now = dt("2025-06-01 09:40:00");
        let item = apply_status_update_at(
            &conn,
            &booking_id,
            &StatusUpdate {
                queue_status: QueueStatus::Completed,
                patient_status: Some(PatientStatus::Discharged),
                notes: Some("Prescription sent to pharmacy".into()),
            },
            now,
        )
        .unwrap()
        .unwrap();

        assert_eq!(item.consultation_end_time, Some(now));
        assert_eq!(
            item.provider_notes.as_deref(),
            Some("Prescription sent to pharmacy")
        );
    }

    #[test]
    fn update_legacy_statuses_stamp_same_fields() {
        let conn = open_memory_database().unwrap();
        let patient_id = add_patient(&conn, "Emily", "Johnson");
        let booking_id = add_booking(
            &conn,
            patient_id,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::PreBooked,
            PatientStatus::Pending,
        );

        let t1 = dt("2025-06-01 08:45:00");
        apply_status_update_at(
            &conn,
            &booking_id,
            &StatusUpdate {
                queue_status: QueueStatus::Active,
                patient_status: Some(PatientStatus::CheckedIn),
                notes: None,
            },
            t1,
        )
        .unwrap();

        let t2 = dt("2025-06-01 09:05:00");
        let item = apply_status_update_at(
            &conn,
            &booking_id,
            &StatusUpdate {
                queue_status: QueueStatus::Active,
                patient_status: Some(PatientStatus::InConsultation),
                notes: None,
            },
            t2,
        )
        .unwrap()
        .unwrap();

        assert_eq!(item.check_in_time, Some(t1));
        assert_eq!(item.consultation_start_time, Some(t2));
    }

    #[test]
    fn update_without_patient_status_stamps_nothing_while_active() {
        let conn = open_memory_database().unwrap();
        let patient_id = add_patient(&conn, "Emily", "Johnson");
        let booking_id = add_booking(
            &conn,
            patient_id,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::PreBooked,
            PatientStatus::Pending,
        );

        let item = apply_status_update_at(
            &conn,
            &booking_id,
            &StatusUpdate {
                queue_status: QueueStatus::Active,
                patient_status: None,
                notes: None,
            },
            dt("2025-06-01 08:50:00"),
        )
        .unwrap()
        .unwrap();

        assert!(item.check_in_time.is_none());
        assert!(item.consultation_start_time.is_none());
        assert!(item.consultation_end_time.is_none());
        // patient_status untouched
        assert_eq!(item.patient_status, PatientStatus::Pending);
    }

    #[test]
    fn update_unknown_booking_returns_none() {
        let conn = open_memory_database().unwrap();
        let result = apply_status_update_at(
            &conn,
            &Uuid::new_v4(),
            &StatusUpdate {
                queue_status: QueueStatus::Active,
                patient_status: None,
                notes: None,
            },
            dt("2025-06-01 08:50:00"),
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn update_allows_any_transition() {
        // No legal-transition validation: discharged straight back to pending.
        let conn = open_memory_database().unwrap();
        let patient_id = add_patient(&conn, "Emily", "Johnson");
        let booking_id = add_booking(
            &conn,
            patient_id,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::Completed,
            PatientStatus::Discharged,
        );

        let item = apply_status_update_at(
            &conn,
            &booking_id,
            &StatusUpdate {
                queue_status: QueueStatus::PreBooked,
                patient_status: Some(PatientStatus::Pending),
                notes: None,
            },
            dt("2025-06-02 08:00:00"),
        )
        .unwrap()
        .unwrap();

        assert_eq!(item.queue_status, QueueStatus::PreBooked);
        assert_eq!(item.patient_status, PatientStatus::Pending);
    }

    #[test]
    fn search_by_patient_name_substring_case_insensitive() {
        let conn = open_memory_database().unwrap();
        let p1 = add_patient(&conn, "Emily", "Johnson");
        let p2 = add_patient(&conn, "Michael", "Williams");
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::PreBooked,
            PatientStatus::Pending,
        );
        add_booking(
            &conn,
            p2,
            "Dr. Okafor",
            "2025-06-01 10:00:00",
            QueueStatus::PreBooked,
            PatientStatus::Pending,
        );

        let filter = QueueSearchFilter {
            patient_name: Some("john".into()), // matches "Johnson"
            ..Default::default()
        };
        let items = search_queue(&conn, &filter).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].last_name, "Johnson");
    }

    #[test]
    fn search_by_doctor_and_queue_status() {
        let conn = open_memory_database().unwrap();
        let p1 = add_patient(&conn, "Emily", "Johnson");
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::Active,
            PatientStatus::Intake,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-05-01 09:00:00",
            QueueStatus::Completed,
            PatientStatus::Discharged,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Okafor",
            "2025-06-01 11:00:00",
            QueueStatus::Active,
            PatientStatus::Intake,
        );

        let filter = QueueSearchFilter {
            doctor_name: Some("reyes".into()),
            queue_status: Some(QueueStatus::Active),
            ..Default::default()
        };
        let items = search_queue(&conn, &filter).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].doctor_name, "Dr. Reyes");
        assert_eq!(items[0].queue_status, QueueStatus::Active);
    }

    #[test]
    fn search_completed_folds_in_cancelled_and_no_show() {
        let conn = open_memory_database().unwrap();
        let p1 = add_patient(&conn, "Emily", "Johnson");
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::Completed,
            PatientStatus::Discharged,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 10:00:00",
            QueueStatus::Cancelled,
            PatientStatus::Cancelled,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 11:00:00",
            QueueStatus::Completed,
            PatientStatus::NoShow,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 12:00:00",
            QueueStatus::Active,
            PatientStatus::Intake,
        );

        let filter = QueueSearchFilter {
            queue_status: Some(QueueStatus::Completed),
            ..Default::default()
        };
        let items = search_queue(&conn, &filter).unwrap();
        assert_eq!(items.len(), 3);
        assert!(items
            .iter()
            .all(|i| i.queue_status != QueueStatus::Active));
    }

    #[test]
    fn search_without_filters_returns_all_newest_first() {
        let conn = open_memory_database().unwrap();
        let p1 = add_patient(&conn, "Emily", "Johnson");
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::PreBooked,
            PatientStatus::Pending,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-02 09:00:00",
            QueueStatus::PreBooked,
            PatientStatus::Pending,
        );

        let items = search_queue(&conn, &QueueSearchFilter::default()).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].booking_date > items[1].booking_date);
    }

    #[test]
    fn bucket_completed_includes_cancelled() {
        let conn = open_memory_database().unwrap();
        let p1 = add_patient(&conn, "Emily", "Johnson");
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::Completed,
            PatientStatus::Discharged,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 10:00:00",
            QueueStatus::Cancelled,
            PatientStatus::Cancelled,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 11:00:00",
            QueueStatus::Active,
            PatientStatus::Intake,
        );

        let items = fetch_bucket(&conn, QueueBucket::Completed).unwrap();
        assert_eq!(items.len(), 2);
        // Ascending by booking date
        assert!(items[0].booking_date < items[1].booking_date);
    }

    #[test]
    fn bucket_parses_hyphenated_names() {
        assert_eq!(
            QueueBucket::from_str("pre-booked").unwrap(),
            QueueBucket::PreBooked
        );
        assert_eq!(
            QueueBucket::from_str("in-office").unwrap(),
            QueueBucket::InOffice
        );
        assert!(QueueBucket::from_str("archived").is_err());
    }

    #[test]
    fn queue_counts_fold_cancelled_into_completed() {
        let conn = open_memory_database().unwrap();
        let p1 = add_patient(&conn, "Emily", "Johnson");
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::PreBooked,
            PatientStatus::Pending,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 10:00:00",
            QueueStatus::Active,
            PatientStatus::Intake,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 11:00:00",
            QueueStatus::Completed,
            PatientStatus::Discharged,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 12:00:00",
            QueueStatus::Cancelled,
            PatientStatus::Cancelled,
        );

        let counts = queue_counts(&conn).unwrap();
        assert_eq!(counts.prebooked, 1);
        assert_eq!(counts.in_office, 1);
        assert_eq!(counts.completed, 2);
    }

    #[test]
    fn patient_status_counts_respect_queue_filter() {
        let conn = open_memory_database().unwrap();
        let p1 = add_patient(&conn, "Emily", "Johnson");
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 09:00:00",
            QueueStatus::Active,
            PatientStatus::Intake,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 10:00:00",
            QueueStatus::PreBooked,
            PatientStatus::Pending,
        );
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 11:00:00",
            QueueStatus::PreBooked,
            PatientStatus::Confirmed,
        );

        let all = patient_status_counts(&conn, None).unwrap();
        assert_eq!(all.intake, 1);
        assert_eq!(all.pending, 1);
        assert_eq!(all.confirmed, 1);

        let active_only = patient_status_counts(&conn, Some(QueueStatus::Active)).unwrap();
        assert_eq!(active_only.intake, 1);
        assert_eq!(active_only.pending, 0);
        assert_eq!(active_only.confirmed, 0);
    }

    #[test]
    fn in_office_groups_partition_and_order() {
        let conn = open_memory_database().unwrap();
        let p1 = add_patient(&conn, "Emily", "Johnson");
        let p2 = add_patient(&conn, "Michael", "Williams");
        let p3 = add_patient(&conn, "Sarah", "Davis");

        // Waiting longer — should come first
        let b1 = add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 08:00:00",
            QueueStatus::Active,
            PatientStatus::Intake,
        );
        apply_status_update_at(
            &conn,
            &b1,
            &StatusUpdate {
                queue_status: QueueStatus::Active,
                patient_status: Some(PatientStatus::Intake),
                notes: None,
            },
            dt("2025-06-01 08:05:00"),
        )
        .unwrap();

        let b2 = add_booking(
            &conn,
            p2,
            "Dr. Reyes",
            "2025-06-01 08:30:00",
            QueueStatus::Active,
            PatientStatus::CheckedIn,
        );
        apply_status_update_at(
            &conn,
            &b2,
            &StatusUpdate {
                queue_status: QueueStatus::Active,
                patient_status: Some(PatientStatus::CheckedIn),
                notes: None,
            },
            dt("2025-06-01 08:40:00"),
        )
        .unwrap();

        let b3 = add_booking(
            &conn,
            p3,
            "Dr. Okafor",
            "2025-06-01 08:15:00",
            QueueStatus::Active,
            PatientStatus::Provider,
        );
        apply_status_update_at(
            &conn,
            &b3,
            &StatusUpdate {
                queue_status: QueueStatus::Active,
                patient_status: Some(PatientStatus::Provider),
                notes: None,
            },
            dt("2025-06-01 08:20:00"),
        )
        .unwrap();

        let groups =
            in_office_groups_at(&conn, None, None, dt("2025-06-01 09:00:00")).unwrap();

        assert_eq!(groups.waiting_room.len(), 2);
        assert_eq!(groups.in_call.len(), 1);
        // Longest-waiting first
        assert_eq!(groups.waiting_room[0].item.last_name, "Johnson");
        assert_eq!(groups.waiting_room[0].wait_display.as_deref(), Some("55m"));
        assert_eq!(groups.waiting_room[1].wait_display.as_deref(), Some("20m"));
        assert_eq!(groups.in_call[0].wait_display.as_deref(), Some("40m"));
    }

    #[test]
    fn in_office_groups_filter_by_doctor() {
        let conn = open_memory_database().unwrap();
        let p1 = add_patient(&conn, "Emily", "Johnson");
        let p2 = add_patient(&conn, "Michael", "Williams");
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 08:00:00",
            QueueStatus::Active,
            PatientStatus::Intake,
        );
        add_booking(
            &conn,
            p2,
            "Dr. Okafor",
            "2025-06-01 08:30:00",
            QueueStatus::Active,
            PatientStatus::Intake,
        );

        let groups = in_office_groups_at(
            &conn,
            None,
            Some("okafor"),
            dt("2025-06-01 09:00:00"),
        )
        .unwrap();
        assert_eq!(groups.waiting_room.len(), 1);
        assert_eq!(groups.waiting_room[0].item.last_name, "Williams");
    }

    #[test]
    fn in_office_groups_exclude_other_queue_statuses() {
        let conn = open_memory_database().unwrap();
        let p1 = add_patient(&conn, "Emily", "Johnson");
        // Intake patient status but visit already completed — must not appear
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 08:00:00",
            QueueStatus::Completed,
            PatientStatus::Intake,
        );

        let groups =
            in_office_groups_at(&conn, None, None, dt("2025-06-01 09:00:00")).unwrap();
        assert!(groups.waiting_room.is_empty());
        assert!(groups.in_call.is_empty());
    }

    #[test]
    fn fetch_by_patient_status_normalized() {
        let conn = open_memory_database().unwrap();
        let p1 = add_patient(&conn, "Emily", "Johnson");
        add_booking(
            &conn,
            p1,
            "Dr. Reyes",
            "2025-06-01 08:00:00",
            QueueStatus::Active,
            PatientStatus::ReadyForProvider,
        );

        let items =
            fetch_by_patient_status(&conn, PatientStatus::ReadyForProvider).unwrap();
        assert_eq!(items.len(), 1);

        let none = fetch_by_patient_status(&conn, PatientStatus::Discharged).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn build_new_booking_scheduled_defaults() {
        let now = dt("2025-06-01 08:00:00");
        let booking = build_new_booking(
            Uuid::new_v4(),
            "Dr. Reyes".into(),
            dt("2025-06-03 10:00:00"),
            None,
            Some("Referred by GP".into()),
            false,
            now,
        );
        assert_eq!(booking.queue_status, QueueStatus::PreBooked);
        assert_eq!(booking.patient_status, PatientStatus::Pending);
        assert!(booking.check_in_time.is_none());
    }

    #[test]
    fn build_new_booking_adhoc_checks_in_immediately() {
        let now = dt("2025-06-01 08:00:00");
        let booking = build_new_booking(
            Uuid::new_v4(),
            "Dr. Reyes".into(),
            now,
            Some("Chest pain".into()),
            None,
            true,
            now,
        );
        assert_eq!(booking.queue_status, QueueStatus::Active);
        assert_eq!(booking.patient_status, PatientStatus::Intake);
        assert_eq!(booking.check_in_time, Some(now));
    }

    #[test]
    fn wait_display_formats() {
        let start = dt("2025-06-01 08:00:00");
        assert_eq!(format_wait(start, dt("2025-06-01 08:00:30")), "just now");
        assert_eq!(format_wait(start, dt("2025-06-01 08:35:00")), "35m");
        assert_eq!(format_wait(start, dt("2025-06-01 09:05:00")), "1h 05m");
        // Clock skew: never negative
        assert_eq!(format_wait(start, dt("2025-06-01 07:00:00")), "just now");
    }
}
