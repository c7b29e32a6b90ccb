//! HTTP API for the patient-queue dashboard.
//!
//! Routes are nested under `/api/`. The router is composable —
//! `queue_api_router()` returns a `Router` that can be mounted on any
//! axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::queue_api_router;
pub use server::{start_server, QueueServer};
pub use types::ApiContext;
