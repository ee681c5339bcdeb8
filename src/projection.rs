//! Patient registration and schedule projection.
//!
//! On registration the doctor's active template is materialized into
//! per-patient schedule rows — a point-in-time copy. Later template
//! edits never propagate to existing patients, and a patient's rows
//! diverge freely from the template. Patient insert and projection are
//! one transaction: either the patient lands with the full projection
//! or nothing is written.

use rusqlite::Connection;
use tracing::info;

use crate::dates::normalize_date;
use crate::db::repository::{allocate_id, clinic, doctor, doctor_schedule, patient, patient_schedule};
use crate::error::{Error, Result};
use crate::models::{NewPatient, Patient, PatientSchedule};

/// Register a patient and project the doctor's active template onto
/// them. Returns the stored patient and the projected rows, in template
/// order.
pub fn register_patient(
    conn: &mut Connection,
    new: &NewPatient,
) -> Result<(Patient, Vec<PatientSchedule>)> {
    if new.name.trim().is_empty() {
        return Err(Error::validation("name", "must not be empty"));
    }
    let date_of_birth = normalize_date(&new.date_of_birth)
        .ok_or_else(|| Error::validation("dateOfBirth", format!("not a date: {:?}", new.date_of_birth)))?;

    if clinic::get_clinic(conn, new.clinic_id)?.is_none() {
        return Err(Error::not_found("clinic", new.clinic_id));
    }
    if doctor::get_doctor(conn, new.doctor_id)?.is_none() {
        return Err(Error::not_found("doctor", new.doctor_id));
    }
    if let Some(cnic) = new.cnic.as_deref().filter(|c| !c.trim().is_empty()) {
        if patient::cnic_exists_in_clinic(conn, cnic, new.clinic_id, None)? {
            return Err(Error::Conflict(
                "a patient with this CNIC already exists in this clinic".to_string(),
            ));
        }
    }

    let tx = conn.transaction()?;
    let patient_id = allocate_id(&tx, "patients", "patient_id")?;
    patient::insert_patient(&tx, patient_id, new, &date_of_birth)?;

    let template = doctor_schedule::active_for_doctor(&tx, new.doctor_id)?;
    let mut projected = Vec::with_capacity(template.len());
    for entry in &template {
        let schedule_id = allocate_id(&tx, "patient_schedules", "schedule_id")?;
        // Plan date copied verbatim from the template, never recomputed
        // from the patient's date of birth.
        projected.push(patient_schedule::insert_schedule(
            &tx,
            schedule_id,
            patient_id,
            entry.dose_id,
            entry.plan_date.as_deref(),
            None,
            None,
        )?);
    }
    tx.commit()?;

    info!(
        patient_id,
        doctor_id = new.doctor_id,
        clinic_id = new.clinic_id,
        projected = projected.len(),
        "patient registered with projected schedule"
    );

    let stored = patient::get_patient(conn, patient_id)?
        .ok_or_else(|| Error::not_found("patient", patient_id))?;
    Ok((stored, projected))
}
