//! Patient schedule mutation and its inventory side effects.
//!
//! Only an actual `is_done` transition moves inventory, and only when a
//! brand is associated with the row. The schedule update commits first;
//! a failed ledger delta is logged and swallowed so the clinical record
//! never rolls back over a stock bookkeeping fault.

use rusqlite::Connection;
use tracing::{error, info};

use crate::dates::normalize_date_field;
use crate::db::repository::{allocate_id, patient, patient_schedule};
use crate::error::{Error, Result};
use crate::inventory;
use crate::models::{PatientSchedule, PatientScheduleDetail, SchedulePatch};

/// Apply a partial update to one patient-schedule row.
///
/// Returns the updated row. Inventory movement, when triggered, is
/// best-effort relative to the schedule write.
pub fn update_schedule(
    conn: &mut Connection,
    schedule_id: i64,
    patch: &SchedulePatch,
) -> Result<PatientSchedule> {
    let current = patient_schedule::get_schedule(conn, schedule_id)?
        .ok_or_else(|| Error::not_found("patient_schedule", schedule_id))?;

    let plan_date = match &patch.plan_date {
        None => current.plan_date.clone(),
        Some(input) => normalize_date_field("planDate", input.as_deref())?,
    };
    let given_date = match &patch.given_date {
        None => current.given_date.clone(),
        Some(input) => normalize_date_field("givenDate", input.as_deref())?,
    };
    let brand_id = match patch.brand_id {
        None => current.brand_id,
        Some(value) => value,
    };
    let was_done = current.is_done;
    let will_be_done = patch.is_done.unwrap_or(was_done);

    patient_schedule::update_schedule(
        conn,
        schedule_id,
        plan_date.as_deref(),
        given_date.as_deref(),
        brand_id,
        will_be_done,
    )?;

    // Inventory side effect: only on a real transition, only with a brand.
    if was_done != will_be_done {
        if let Some(brand_id) = brand_id {
            if let Err(err) = apply_inventory_delta(conn, &current, brand_id, will_be_done) {
                error!(
                    schedule_id,
                    brand_id,
                    %err,
                    "inventory adjustment failed; schedule update stands"
                );
            }
        }
    }

    patient_schedule::get_schedule(conn, schedule_id)?
        .ok_or_else(|| Error::not_found("patient_schedule", schedule_id))
}

fn apply_inventory_delta(
    conn: &mut Connection,
    row: &PatientSchedule,
    brand_id: i64,
    administered: bool,
) -> Result<()> {
    let Some(patient) = patient::get_patient(conn, row.child_id)? else {
        return Err(Error::not_found("patient", row.child_id));
    };
    let quantity = if administered {
        inventory::debit(conn, patient.clinic_id, brand_id, 1)?
    } else {
        inventory::credit(conn, patient.clinic_id, brand_id, 1)?
    };
    info!(
        schedule_id = row.schedule_id,
        clinic_id = patient.clinic_id,
        brand_id,
        quantity,
        administered,
        "inventory adjusted for dose transition"
    );
    Ok(())
}

/// Manually add a schedule entry for a child, outside the projector.
/// Duplicate (child, dose) pairs are allowed by design — correction
/// workflows re-add doses deliberately.
pub fn add_entry(
    conn: &mut Connection,
    child_id: i64,
    dose_id: i64,
    given_date: Option<&str>,
    brand_id: Option<i64>,
) -> Result<PatientSchedule> {
    if patient::get_patient(conn, child_id)?.is_none() {
        return Err(Error::not_found("patient", child_id));
    }
    let given_date = normalize_date_field("givenDate", given_date)?;

    let tx = conn.transaction()?;
    let schedule_id = allocate_id(&tx, "patient_schedules", "schedule_id")?;
    let created = patient_schedule::insert_schedule(
        &tx,
        schedule_id,
        child_id,
        dose_id,
        None,
        given_date.as_deref(),
        brand_id,
    )?;
    tx.commit()?;
    Ok(created)
}

/// All schedule rows of one child with dose and brand detail.
pub fn schedules_for_child(conn: &Connection, child_id: i64) -> Result<Vec<PatientScheduleDetail>> {
    Ok(patient_schedule::for_child_with_detail(conn, child_id)?)
}

/// Hard delete of one entry. No inventory effect — corrections that
/// should return stock go through an un-administer first.
pub fn remove(conn: &Connection, schedule_id: i64) -> Result<()> {
    let changed = patient_schedule::delete_schedule(conn, schedule_id)?;
    if changed == 0 {
        return Err(Error::not_found("patient_schedule", schedule_id));
    }
    Ok(())
}
