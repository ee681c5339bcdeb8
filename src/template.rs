//! Doctor schedule template store.
//!
//! The set of dose templates a doctor has opted into, each with an
//! optional planned date. The projector copies these rows at patient
//! registration; edits here never touch already-projected schedules.

use rusqlite::Connection;
use tracing::info;

use crate::dates::normalize_date_field;
use crate::db::repository::{allocate_id, catalog, doctor_schedule};
use crate::error::{Error, Result};
use crate::models::{DoctorSchedule, DoctorScheduleDetail};

/// Add doses to a doctor's template. Dose ids already present are
/// silently skipped; if every requested id is already present the call
/// fails as a conflict ("nothing to add").
pub fn add_doses(
    conn: &mut Connection,
    doctor_id: i64,
    dose_ids: &[i64],
) -> Result<Vec<DoctorSchedule>> {
    if dose_ids.is_empty() {
        return Err(Error::validation("doseIds", "at least one dose id is required"));
    }
    for &dose_id in dose_ids {
        if catalog::get_dose(conn, dose_id)?.is_none() {
            return Err(Error::not_found("dose", dose_id));
        }
    }

    let tx = conn.transaction()?;
    let existing = doctor_schedule::existing_dose_ids(&tx, doctor_id, dose_ids)?;

    let mut created = Vec::new();
    for &dose_id in dose_ids {
        if existing.contains(&dose_id) || created.iter().any(|s: &DoctorSchedule| s.dose_id == dose_id) {
            continue;
        }
        let schedule_id = allocate_id(&tx, "doctor_schedules", "schedule_id")?;
        created.push(doctor_schedule::insert_schedule(
            &tx, schedule_id, doctor_id, dose_id,
        )?);
    }

    if created.is_empty() {
        // Nothing new; the transaction is dropped unchanged.
        return Err(Error::Conflict(
            "all selected doses are already in the schedule".to_string(),
        ));
    }

    tx.commit()?;
    info!(doctor_id, added = created.len(), "template doses added");
    Ok(created)
}

/// Set (or clear) the planned date of one template entry. Timestamps
/// are truncated to a calendar date before storage.
pub fn set_plan_date(
    conn: &Connection,
    schedule_id: i64,
    plan_date: Option<&str>,
) -> Result<DoctorSchedule> {
    let normalized = normalize_date_field("planDate", plan_date)?;
    let changed = doctor_schedule::update_plan_date(conn, schedule_id, normalized.as_deref())?;
    if changed == 0 {
        return Err(Error::not_found("doctor_schedule", schedule_id));
    }
    doctor_schedule::get_schedule(conn, schedule_id)?
        .ok_or_else(|| Error::not_found("doctor_schedule", schedule_id))
}

/// Hard delete. Existing patient schedules keep their projected copy.
pub fn remove(conn: &Connection, schedule_id: i64) -> Result<()> {
    let changed = doctor_schedule::delete_schedule(conn, schedule_id)?;
    if changed == 0 {
        return Err(Error::not_found("doctor_schedule", schedule_id));
    }
    Ok(())
}

/// All template entries of a doctor with dose detail, newest first.
pub fn schedules_for_doctor(
    conn: &Connection,
    doctor_id: i64,
) -> Result<Vec<DoctorScheduleDetail>> {
    Ok(doctor_schedule::for_doctor_with_doses(conn, doctor_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::catalog::create_dose;
    use crate::testutil::seed_doctor;

    #[test]
    fn add_doses_skips_existing_and_creates_new() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let d1 = create_dose(&mut conn, "BCG", 0, 12, 0, None).unwrap();
        let d2 = create_dose(&mut conn, "OPV-1", 1, 12, 28, None).unwrap();
        let d3 = create_dose(&mut conn, "OPV-2", 2, 12, 28, None).unwrap();

        let first = add_doses(&mut conn, doctor_id, &[d1.dose_id, d2.dose_id]).unwrap();
        assert_eq!(first.len(), 2);

        // One of the two is already present — only the new one lands.
        let second = add_doses(&mut conn, doctor_id, &[d2.dose_id, d3.dose_id]).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].dose_id, d3.dose_id);
    }

    #[test]
    fn add_doses_all_duplicates_is_conflict() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let d1 = create_dose(&mut conn, "BCG", 0, 12, 0, None).unwrap();

        add_doses(&mut conn, doctor_id, &[d1.dose_id]).unwrap();
        let err = add_doses(&mut conn, doctor_id, &[d1.dose_id]).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn add_doses_unknown_dose_is_not_found() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let err = add_doses(&mut conn, doctor_id, &[99]).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "dose", id: 99 }));
    }

    #[test]
    fn add_doses_dedups_repeated_request_ids() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let d1 = create_dose(&mut conn, "BCG", 0, 12, 0, None).unwrap();

        let created = add_doses(&mut conn, doctor_id, &[d1.dose_id, d1.dose_id]).unwrap();
        assert_eq!(created.len(), 1);
    }

    #[test]
    fn set_plan_date_normalizes_timestamp() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let d1 = create_dose(&mut conn, "BCG", 0, 12, 0, None).unwrap();
        let created = add_doses(&mut conn, doctor_id, &[d1.dose_id]).unwrap();

        let updated = set_plan_date(
            &conn,
            created[0].schedule_id,
            Some("2025-06-01T09:30:00Z"),
        )
        .unwrap();
        assert_eq!(updated.plan_date.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn set_plan_date_missing_row_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = set_plan_date(&conn, 42, Some("2025-06-01")).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn remove_is_hard_delete() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let d1 = create_dose(&mut conn, "BCG", 0, 12, 0, None).unwrap();
        let created = add_doses(&mut conn, doctor_id, &[d1.dose_id]).unwrap();

        remove(&conn, created[0].schedule_id).unwrap();
        assert!(schedules_for_doctor(&conn, doctor_id).unwrap().is_empty());
    }
}
