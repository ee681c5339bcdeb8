use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{DoctorSchedule, DoctorScheduleDetail};

/// Insert one template entry with a pre-allocated id, inside the caller's
/// transaction. New entries start with no plan date and active.
pub fn insert_schedule(
    conn: &Connection,
    schedule_id: i64,
    doctor_id: i64,
    dose_id: i64,
) -> Result<DoctorSchedule, DatabaseError> {
    conn.execute(
        "INSERT INTO doctor_schedules (schedule_id, doctor_id, dose_id, plan_date, is_active)
         VALUES (?1, ?2, ?3, NULL, 1)",
        params![schedule_id, doctor_id, dose_id],
    )?;
    Ok(DoctorSchedule {
        schedule_id,
        doctor_id,
        dose_id,
        plan_date: None,
        is_active: true,
    })
}

/// Which of the requested dose ids this doctor already has.
pub fn existing_dose_ids(
    conn: &Connection,
    doctor_id: i64,
    dose_ids: &[i64],
) -> Result<Vec<i64>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT dose_id FROM doctor_schedules WHERE doctor_id = ?1 AND dose_id = ?2")?;
    let mut present = Vec::new();
    for &dose_id in dose_ids {
        let found = stmt
            .query_row(params![doctor_id, dose_id], |row| row.get::<_, i64>(0))
            .optional()?;
        if found.is_some() {
            present.push(dose_id);
        }
    }
    Ok(present)
}

pub fn get_schedule(
    conn: &Connection,
    schedule_id: i64,
) -> Result<Option<DoctorSchedule>, DatabaseError> {
    conn.query_row(
        "SELECT schedule_id, doctor_id, dose_id, plan_date, is_active
         FROM doctor_schedules WHERE schedule_id = ?1",
        params![schedule_id],
        schedule_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// The active template rows the projector copies.
pub fn active_for_doctor(
    conn: &Connection,
    doctor_id: i64,
) -> Result<Vec<DoctorSchedule>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT schedule_id, doctor_id, dose_id, plan_date, is_active
         FROM doctor_schedules WHERE doctor_id = ?1 AND is_active = 1 ORDER BY schedule_id",
    )?;
    let rows = stmt.query_map(params![doctor_id], schedule_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// All template rows with dose detail, newest first.
pub fn for_doctor_with_doses(
    conn: &Connection,
    doctor_id: i64,
) -> Result<Vec<DoctorScheduleDetail>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT s.schedule_id, s.doctor_id, s.dose_id, s.plan_date, s.is_active,
                d.dose_id, d.name, d.min_age, d.max_age, d.min_gap, d.vaccine_id
         FROM doctor_schedules s
         LEFT JOIN doses d ON d.dose_id = s.dose_id
         WHERE s.doctor_id = ?1
         ORDER BY s.schedule_id DESC",
    )?;
    let rows = stmt.query_map(params![doctor_id], |row| {
        let schedule = schedule_from_row(row)?;
        let dose = dose_from_joined_row(row, 5)?;
        Ok(DoctorScheduleDetail { schedule, dose })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_plan_date(
    conn: &Connection,
    schedule_id: i64,
    plan_date: Option<&str>,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctor_schedules SET plan_date = ?2 WHERE schedule_id = ?1",
        params![schedule_id, plan_date],
    )?;
    Ok(changed)
}

/// Hard delete. Never cascades to projected patient schedules.
pub fn delete_schedule(conn: &Connection, schedule_id: i64) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM doctor_schedules WHERE schedule_id = ?1",
        params![schedule_id],
    )?;
    Ok(changed)
}

fn schedule_from_row(row: &rusqlite::Row<'_>) -> Result<DoctorSchedule, rusqlite::Error> {
    Ok(DoctorSchedule {
        schedule_id: row.get(0)?,
        doctor_id: row.get(1)?,
        dose_id: row.get(2)?,
        plan_date: row.get(3)?,
        is_active: row.get::<_, i64>(4)? != 0,
    })
}

/// Read a LEFT JOINed dose starting at `offset`; an unmatched join
/// (null dose_id) reads as `None`.
pub(crate) fn dose_from_joined_row(
    row: &rusqlite::Row<'_>,
    offset: usize,
) -> Result<Option<crate::models::Dose>, rusqlite::Error> {
    let dose_id: Option<i64> = row.get(offset)?;
    let Some(dose_id) = dose_id else {
        return Ok(None);
    };
    Ok(Some(crate::models::Dose {
        dose_id,
        name: row.get(offset + 1)?,
        min_age: row.get(offset + 2)?,
        max_age: row.get(offset + 3)?,
        min_gap: row.get(offset + 4)?,
        vaccine_id: row.get(offset + 5)?,
    }))
}
