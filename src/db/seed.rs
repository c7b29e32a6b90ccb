//! Demo seed data for local development.
//!
//! Registers a handful of patients with bookings spread across the visit
//! lifecycle so every dashboard tab has content. Loaded via `--seed`.

use chrono::{Duration, NaiveDate, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use super::repository::{insert_booking, insert_patient};
use super::DatabaseError;
use crate::models::enums::{PatientStatus, QueueStatus};
use crate::models::{Booking, Patient};

struct SeedPatient {
    first_name: &'static str,
    last_name: &'static str,
    date_of_birth: (i32, u32, u32),
    phone_number: &'static str,
    email: &'static str,
    medical_history: &'static str,
}

const SEED_PATIENTS: &[SeedPatient] = &[
    SeedPatient {
        first_name: "John",
        last_name: "Smith",
        date_of_birth: (1980, 5, 15),
        phone_number: "555-123-4567",
        email: "john.smith@example.com",
        medical_history: "Hypertension, Diabetes Type 2",
    },
    SeedPatient {
        first_name: "Emily",
        last_name: "Johnson",
        date_of_birth: (1992, 9, 23),
        phone_number: "555-987-6543",
        email: "emily.johnson@example.com",
        medical_history: "Asthma",
    },
    SeedPatient {
        first_name: "Michael",
        last_name: "Williams",
        date_of_birth: (1975, 11, 30),
        phone_number: "555-456-7890",
        email: "michael.williams@example.com",
        medical_history: "High cholesterol",
    },
    SeedPatient {
        first_name: "Sarah",
        last_name: "Davis",
        date_of_birth: (1988, 2, 12),
        phone_number: "555-789-1234",
        email: "sarah.davis@example.com",
        medical_history: "Migraines",
    },
    SeedPatient {
        first_name: "David",
        last_name: "Brown",
        date_of_birth: (1965, 7, 8),
        phone_number: "555-321-6547",
        email: "david.brown@example.com",
        medical_history: "Arthritis",
    },
];

/// Insert demo patients and bookings. Skips entirely if any patient rows
/// already exist, so repeated `--seed` runs stay idempotent.
pub fn seed_demo_data(conn: &Connection) -> Result<usize, DatabaseError> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    if existing > 0 {
        tracing::info!("Seed skipped: {existing} patients already present");
        return Ok(0);
    }

    let now = Utc::now().naive_utc();
    let mut patient_ids = Vec::new();

    for seed in SEED_PATIENTS {
        let id = Uuid::new_v4();
        let (y, m, d) = seed.date_of_birth;
        insert_patient(
            conn,
            &Patient {
                id,
                first_name: seed.first_name.into(),
                last_name: seed.last_name.into(),
                date_of_birth: NaiveDate::from_ymd_opt(y, m, d)
                    .ok_or_else(|| DatabaseError::ConstraintViolation("bad seed date".into()))?,
                phone_number: Some(seed.phone_number.into()),
                email: Some(seed.email.into()),
                address: None,
                medical_history: Some(seed.medical_history.into()),
            },
        )?;
        patient_ids.push(id);
    }

    let base = |patient_id: Uuid, doctor: &str, offset_min: i64| Booking {
        id: Uuid::new_v4(),
        patient_id,
        doctor_name: doctor.into(),
        booking_date: now + Duration::minutes(offset_min),
        queue_status: QueueStatus::PreBooked,
        patient_status: PatientStatus::Pending,
        check_in_time: None,
        consultation_start_time: None,
        consultation_end_time: None,
        notes: None,
        provider_notes: None,
        chief_complaint: None,
        is_adhoc: false,
    };

    // Scheduled for later today, not yet confirmed
    insert_booking(conn, &base(patient_ids[0], "Dr. Reyes", 120))?;

    // Confirmed, still pre-booked
    let mut confirmed = base(patient_ids[1], "Dr. Okafor", 60);
    confirmed.patient_status = PatientStatus::Confirmed;
    insert_booking(conn, &confirmed)?;

    // Walked in, waiting in intake
    let mut intake = base(patient_ids[2], "Dr. Reyes", -25);
    intake.queue_status = QueueStatus::Active;
    intake.patient_status = PatientStatus::Intake;
    intake.check_in_time = Some(now - Duration::minutes(25));
    intake.chief_complaint = Some("Persistent cough".into());
    intake.is_adhoc = true;
    insert_booking(conn, &intake)?;

    // In call with the provider
    let mut in_call = base(patient_ids[3], "Dr. Okafor", -50);
    in_call.queue_status = QueueStatus::Active;
    in_call.patient_status = PatientStatus::Provider;
    in_call.check_in_time = Some(now - Duration::minutes(50));
    in_call.consultation_start_time = Some(now - Duration::minutes(15));
    in_call.chief_complaint = Some("Migraine follow-up".into());
    insert_booking(conn, &in_call)?;

    // Discharged earlier today
    let mut done = base(patient_ids[4], "Dr. Reyes", -180);
    done.queue_status = QueueStatus::Completed;
    done.patient_status = PatientStatus::Discharged;
    done.check_in_time = Some(now - Duration::minutes(180));
    done.consultation_start_time = Some(now - Duration::minutes(160));
    done.consultation_end_time = Some(now - Duration::minutes(140));
    done.provider_notes = Some("Adjusted dosage, review in 3 months".into());
    insert_booking(conn, &done)?;

    // No-show from yesterday
    let mut no_show = base(patient_ids[0], "Dr. Okafor", -24 * 60);
    no_show.queue_status = QueueStatus::Completed;
    no_show.patient_status = PatientStatus::NoShow;
    insert_booking(conn, &no_show)?;

    tracing::info!("Seeded {} patients with demo bookings", patient_ids.len());
    Ok(patient_ids.len())
}
