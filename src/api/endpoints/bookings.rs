//! Booking endpoints: creation, lookup, and staff status updates.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::{get_patient, insert_booking};
use crate::queue::{self, QueueItem, StatusUpdate};

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub patient_id: Uuid,
    pub doctor_name: String,
    /// Defaults to now for ad-hoc walk-ins.
    pub booking_date: Option<NaiveDateTime>,
    pub chief_complaint: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_adhoc: bool,
}

/// `POST /api/queue/bookings` — create a booking. Scheduled bookings
/// enter the queue as pre-booked/pending; ad-hoc walk-ins go straight
/// to active/intake with check-in stamped.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<QueueItem>), ApiError> {
    if req.doctor_name.trim().is_empty() {
        return Err(ApiError::BadRequest("doctor_name is required".into()));
    }

    let now = Utc::now().naive_utc();
    let booking_date = match req.booking_date {
        Some(date) => date,
        None if req.is_adhoc => now,
        None => return Err(ApiError::BadRequest("booking_date is required".into())),
    };

    let conn = ctx.state.open_db()?;
    if get_patient(&conn, &req.patient_id)?.is_none() {
        return Err(ApiError::NotFound("Patient not found".into()));
    }

    let booking = queue::build_new_booking(
        req.patient_id,
        req.doctor_name.trim().to_string(),
        booking_date,
        req.chief_complaint,
        req.notes,
        req.is_adhoc,
        now,
    );
    insert_booking(&conn, &booking)?;

    tracing::info!(booking_id = %booking.id, is_adhoc = booking.is_adhoc, "Booking created");

    let item = queue::fetch_queue_item(&conn, &booking.id)?
        .ok_or_else(|| ApiError::Internal("booking vanished after insert".into()))?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /api/queue/bookings/:id` — joined queue item for a booking.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<QueueItem>, ApiError> {
    let booking_id = parse_id(&id)?;
    let conn = ctx.state.open_db()?;

    let item = queue::fetch_queue_item(&conn, &booking_id)?
        .ok_or_else(|| ApiError::NotFound("Booking not found".into()))?;
    Ok(Json(item))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub queue_status: String,
    pub patient_status: Option<String>,
    pub notes: Option<String>,
}

/// `PUT /api/queue/bookings/:id/status` — apply a staff status change.
/// Stamps the lifecycle timestamp the new status combination selects
/// and overwrites provider notes when the body carries notes.
/// Statuses are parsed here so malformed values come back as 400.
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<QueueItem>, ApiError> {
    let booking_id = parse_id(&id)?;

    let update = StatusUpdate {
        queue_status: req.queue_status.parse().map_err(ApiError::from)?,
        patient_status: req
            .patient_status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::from)?,
        notes: req.notes,
    };

    let conn = ctx.state.open_db()?;

    let item = queue::apply_status_update(&conn, &booking_id, &update)?
        .ok_or_else(|| ApiError::NotFound("Booking not found".into()))?;

    tracing::info!(
        booking_id = %booking_id,
        queue_status = update.queue_status.as_str(),
        "Booking status updated"
    );
    Ok(Json(item))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid booking ID: {e}")))
}
