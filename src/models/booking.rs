use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{PatientStatus, QueueStatus};

/// One scheduled or ad-hoc visit, linked to exactly one patient.
///
/// Timestamps are populated as the visit progresses: check-in when the
/// patient arrives, consultation start/end around the provider call.
/// Cancellation and no-show are terminal statuses, never row deletions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_name: String,
    pub booking_date: NaiveDateTime,
    pub queue_status: QueueStatus,
    pub patient_status: PatientStatus,
    pub check_in_time: Option<NaiveDateTime>,
    pub consultation_start_time: Option<NaiveDateTime>,
    pub consultation_end_time: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub provider_notes: Option<String>,
    pub chief_complaint: Option<String>,
    pub is_adhoc: bool,
}
