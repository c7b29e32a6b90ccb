use super::enums::{PatientStatus, QueueStatus};

/// Filters for the queue search view. All optional; name fields are
/// case-insensitive substring matches.
#[derive(Debug, Default, Clone)]
pub struct QueueSearchFilter {
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
    pub patient_status: Option<PatientStatus>,
    pub queue_status: Option<QueueStatus>,
}
