//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database_ok: bool,
}

/// `GET /api/health` — liveness and database reachability.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let database_ok = ctx
        .state
        .open_db()
        .and_then(|conn| crate::db::sqlite::count_tables(&conn))
        .is_ok();

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        database_ok,
    }))
}
