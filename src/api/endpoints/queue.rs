//! Queue dashboard endpoints: tab listings, counts, search, and the
//! in-office grouping.

use std::str::FromStr;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::enums::{PatientStatus, QueueStatus};
use crate::models::QueueSearchFilter;
use crate::queue::{
    self, InOfficeEntry, PatientStatusCounts, QueueBucket, QueueCounts, QueueItem,
};

/// `GET /api/queue/counts` — coarse tab-bar counts.
pub async fn counts(State(ctx): State<ApiContext>) -> Result<Json<QueueCounts>, ApiError> {
    let conn = ctx.state.open_db()?;
    Ok(Json(queue::queue_counts(&conn)?))
}

#[derive(Deserialize)]
pub struct BucketQuery {
    pub status: Option<String>,
}

/// `GET /api/queue/patients?status=pre-booked|in-office|completed` —
/// one dashboard tab's bookings, oldest booking date first.
pub async fn bucket(
    State(ctx): State<ApiContext>,
    Query(query): Query<BucketQuery>,
) -> Result<Json<Vec<QueueItem>>, ApiError> {
    let raw = query
        .status
        .ok_or_else(|| ApiError::BadRequest("status query parameter is required".into()))?;
    let bucket = QueueBucket::from_str(&raw)
        .map_err(|_| ApiError::BadRequest(format!("Unknown queue tab: {raw}")))?;

    let conn = ctx.state.open_db()?;
    Ok(Json(queue::fetch_bucket(&conn, bucket)?))
}

#[derive(Deserialize)]
pub struct PatientStatusQuery {
    pub status: Option<String>,
}

/// `GET /api/queue/patient-status?status=X` — bookings with one
/// fine-grained patient status. Hyphenated input is accepted.
pub async fn by_patient_status(
    State(ctx): State<ApiContext>,
    Query(query): Query<PatientStatusQuery>,
) -> Result<Json<Vec<QueueItem>>, ApiError> {
    let raw = query
        .status
        .ok_or_else(|| ApiError::BadRequest("status query parameter is required".into()))?;
    let status = PatientStatus::from_str(&raw).map_err(ApiError::from)?;

    let conn = ctx.state.open_db()?;
    Ok(Json(queue::fetch_by_patient_status(&conn, status)?))
}

#[derive(Deserialize)]
pub struct StatusCountsQuery {
    pub queue_status: Option<String>,
}

/// `GET /api/queue/patient-status-counts?queue_status=Y` — one count
/// per patient-status value, optionally scoped to a queue status.
pub async fn patient_status_counts(
    State(ctx): State<ApiContext>,
    Query(query): Query<StatusCountsQuery>,
) -> Result<Json<PatientStatusCounts>, ApiError> {
    let queue_status = query
        .queue_status
        .as_deref()
        .map(QueueStatus::from_str)
        .transpose()
        .map_err(ApiError::from)?;

    let conn = ctx.state.open_db()?;
    Ok(Json(queue::patient_status_counts(&conn, queue_status)?))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
    pub patient_status: Option<String>,
    pub queue_status: Option<String>,
}

/// `GET /api/queue/search` — filtered booking search, newest first.
pub async fn search(
    State(ctx): State<ApiContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<QueueItem>>, ApiError> {
    let filter = QueueSearchFilter {
        patient_name: query.patient_name,
        doctor_name: query.doctor_name,
        patient_status: query
            .patient_status
            .as_deref()
            .map(PatientStatus::from_str)
            .transpose()
            .map_err(ApiError::from)?,
        queue_status: query
            .queue_status
            .as_deref()
            .map(QueueStatus::from_str)
            .transpose()
            .map_err(ApiError::from)?,
    };

    let conn = ctx.state.open_db()?;
    Ok(Json(queue::search_queue(&conn, &filter)?))
}

#[derive(Deserialize)]
pub struct InOfficeQuery {
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
}

#[derive(Serialize)]
pub struct GroupCounts {
    pub waiting_room: usize,
    pub in_call: usize,
}

#[derive(Serialize)]
pub struct InOfficeResponse {
    pub waiting_room: Vec<InOfficeEntry>,
    pub in_call: Vec<InOfficeEntry>,
    pub counts: GroupCounts,
}

/// `GET /api/queue/in-office-groups` — active bookings partitioned into
/// waiting room and in-call groups, longest wait first.
pub async fn in_office_groups(
    State(ctx): State<ApiContext>,
    Query(query): Query<InOfficeQuery>,
) -> Result<Json<InOfficeResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let groups = queue::in_office_groups(
        &conn,
        query.patient_name.as_deref(),
        query.doctor_name.as_deref(),
    )?;

    let counts = GroupCounts {
        waiting_room: groups.waiting_room.len(),
        in_call: groups.in_call.len(),
    };
    Ok(Json(InOfficeResponse {
        waiting_room: groups.waiting_room,
        in_call: groups.in_call,
        counts,
    }))
}
