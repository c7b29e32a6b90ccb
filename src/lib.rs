//! Telequeue — a telehealth clinic's patient-queue backend.
//!
//! Staff track patients through a visit lifecycle (pre-booked →
//! intake → provider → discharged/no-show/cancelled) over an HTTP
//! JSON API backed by SQLite. The store provides the only consistency
//! guarantees; status transitions are not validated.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod queue;
pub mod state;
