//! Queue API router.
//!
//! Returns a composable `Router` with all endpoints nested under `/api/`.
//! A permissive CORS layer sits outermost so the staff dashboard can be
//! served from a different origin during development.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::state::AppState;

/// Build the queue API router.
pub fn queue_api_router(state: Arc<AppState>) -> Router {
    let ctx = ApiContext::new(state);

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/patients", post(endpoints::patients::register))
        .route(
            "/patients/:id",
            get(endpoints::patients::detail).put(endpoints::patients::update_contact),
        )
        .route("/queue/bookings", post(endpoints::bookings::create))
        .route("/queue/bookings/:id", get(endpoints::bookings::detail))
        .route(
            "/queue/bookings/:id/status",
            put(endpoints::bookings::update_status),
        )
        .route("/queue/counts", get(endpoints::queue::counts))
        .route("/queue/patients", get(endpoints::queue::bucket))
        .route(
            "/queue/patient-status",
            get(endpoints::queue::by_patient_status),
        )
        .route(
            "/queue/patient-status-counts",
            get(endpoints::queue::patient_status_counts),
        )
        .route("/queue/search", get(endpoints::queue::search))
        .route(
            "/queue/in-office-groups",
            get(endpoints::queue::in_office_groups),
        )
        .with_state(ctx);

    Router::new().nest("/api", api).layer(CorsLayer::permissive())
}
