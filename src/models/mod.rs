pub mod booking;
pub mod enums;
pub mod filters;
pub mod patient;

pub use booking::Booking;
pub use enums::{PatientStatus, QueueStatus};
pub use filters::QueueSearchFilter;
pub use patient::Patient;
