//! Repository layer — entity-scoped database operations.
//!
//! Raw patient/booking CRUD lives here; the joined queue view and its
//! aggregate queries live in `crate::queue`.

mod booking;
mod patient;

pub use booking::*;
pub use patient::*;
