pub mod bookings;
pub mod health;
pub mod patients;
pub mod queue;
