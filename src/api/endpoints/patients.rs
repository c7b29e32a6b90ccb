//! Patient registration and profile endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::{get_patient, insert_patient, update_patient_contact};
use crate::models::Patient;

#[derive(Deserialize)]
pub struct RegisterPatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
}

/// `POST /api/patients` — register a new patient.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "first_name and last_name are required".into(),
        ));
    }

    let patient = Patient {
        id: Uuid::new_v4(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        date_of_birth: req.date_of_birth,
        phone_number: req.phone_number,
        email: req.email,
        address: req.address,
        medical_history: req.medical_history,
    };

    let conn = ctx.state.open_db()?;
    insert_patient(&conn, &patient)?;

    tracing::info!(patient_id = %patient.id, "Patient registered");
    Ok((StatusCode::CREATED, Json(patient)))
}

/// `GET /api/patients/:id` — patient profile.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let patient_id = parse_id(&id)?;
    let conn = ctx.state.open_db()?;

    let patient = get_patient(&conn, &patient_id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    Ok(Json(patient))
}

#[derive(Deserialize)]
pub struct UpdateContactRequest {
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
}

/// `PUT /api/patients/:id` — update contact details and medical history.
/// Name and date of birth are immutable after registration.
pub async fn update_contact(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateContactRequest>,
) -> Result<Json<Patient>, ApiError> {
    let patient_id = parse_id(&id)?;
    let conn = ctx.state.open_db()?;

    update_patient_contact(
        &conn,
        &patient_id,
        req.phone_number.as_deref(),
        req.email.as_deref(),
        req.address.as_deref(),
        req.medical_history.as_deref(),
    )?;

    let patient = get_patient(&conn, &patient_id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    Ok(Json(patient))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid patient ID: {e}")))
}
