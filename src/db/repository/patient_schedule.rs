use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Brand, PatientSchedule, PatientScheduleDetail};

use super::doctor_schedule::dose_from_joined_row;

/// Insert one projected (or manually added) schedule row with a
/// pre-allocated id, inside the caller's transaction.
pub fn insert_schedule(
    conn: &Connection,
    schedule_id: i64,
    child_id: i64,
    dose_id: i64,
    plan_date: Option<&str>,
    given_date: Option<&str>,
    brand_id: Option<i64>,
) -> Result<PatientSchedule, DatabaseError> {
    conn.execute(
        "INSERT INTO patient_schedules (schedule_id, child_id, dose_id, plan_date, given_date, brand_id, is_done)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
        params![schedule_id, child_id, dose_id, plan_date, given_date, brand_id],
    )?;
    Ok(PatientSchedule {
        schedule_id,
        child_id,
        dose_id,
        plan_date: plan_date.map(str::to_string),
        given_date: given_date.map(str::to_string),
        brand_id,
        is_done: false,
    })
}

pub fn get_schedule(
    conn: &Connection,
    schedule_id: i64,
) -> Result<Option<PatientSchedule>, DatabaseError> {
    conn.query_row(
        "SELECT schedule_id, child_id, dose_id, plan_date, given_date, brand_id, is_done
         FROM patient_schedules WHERE schedule_id = ?1",
        params![schedule_id],
        schedule_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Write the fully resolved row state; the mutator decides the values.
pub fn update_schedule(
    conn: &Connection,
    schedule_id: i64,
    plan_date: Option<&str>,
    given_date: Option<&str>,
    brand_id: Option<i64>,
    is_done: bool,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE patient_schedules
         SET plan_date = ?2, given_date = ?3, brand_id = ?4, is_done = ?5
         WHERE schedule_id = ?1",
        params![schedule_id, plan_date, given_date, brand_id, is_done as i64],
    )?;
    Ok(changed)
}

/// All schedule rows of one child with dose and brand detail, oldest
/// first (projection order).
pub fn for_child_with_detail(
    conn: &Connection,
    child_id: i64,
) -> Result<Vec<PatientScheduleDetail>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT s.schedule_id, s.child_id, s.dose_id, s.plan_date, s.given_date, s.brand_id, s.is_done,
                d.dose_id, d.name, d.min_age, d.max_age, d.min_gap, d.vaccine_id,
                b.brand_id, b.name, b.amount
         FROM patient_schedules s
         LEFT JOIN doses d ON d.dose_id = s.dose_id
         LEFT JOIN brands b ON b.brand_id = s.brand_id
         WHERE s.child_id = ?1
         ORDER BY s.schedule_id",
    )?;
    let rows = stmt.query_map(params![child_id], |row| {
        let schedule = schedule_from_row(row)?;
        let dose = dose_from_joined_row(row, 7)?;
        let brand = match row.get::<_, Option<i64>>(13)? {
            Some(brand_id) => Some(Brand {
                brand_id,
                name: row.get(14)?,
                amount: row.get(15)?,
            }),
            None => None,
        };
        Ok(PatientScheduleDetail {
            schedule,
            dose,
            brand,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_for_child(conn: &Connection, child_id: i64) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM patient_schedules WHERE child_id = ?1",
        params![child_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn delete_schedule(conn: &Connection, schedule_id: i64) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM patient_schedules WHERE schedule_id = ?1",
        params![schedule_id],
    )?;
    Ok(changed)
}

fn schedule_from_row(row: &rusqlite::Row<'_>) -> Result<PatientSchedule, rusqlite::Error> {
    Ok(PatientSchedule {
        schedule_id: row.get(0)?,
        child_id: row.get(1)?,
        dose_id: row.get(2)?,
        plan_date: row.get(3)?,
        given_date: row.get(4)?,
        brand_id: row.get(5)?,
        is_done: row.get::<_, i64>(6)? != 0,
    })
}
