use rusqlite::{params, Connection};

use crate::db::{allocate_id, DatabaseError};
use crate::models::{Clinic, NewClinic};

/// Insert a clinic row. `is_online` is decided by the caller (first
/// active clinic of a doctor comes up online).
pub fn create_clinic(
    conn: &mut Connection,
    new: &NewClinic,
    is_online: bool,
) -> Result<Clinic, DatabaseError> {
    let tx = conn.transaction()?;
    let clinic_id = allocate_id(&tx, "clinics", "clinic_id")?;
    tx.execute(
        "INSERT INTO clinics (clinic_id, doctor_id, name, address, reg_no, logo, phone_number, clinic_fee, is_online)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            clinic_id,
            new.doctor_id,
            new.name.trim(),
            new.address.trim(),
            new.reg_no.trim(),
            new.logo,
            new.phone_number.trim(),
            new.clinic_fee,
            is_online as i64,
        ],
    )?;
    tx.commit()?;

    get_clinic(conn, clinic_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "clinic".to_string(),
        id: clinic_id.to_string(),
    })
}

pub fn get_clinic(conn: &Connection, clinic_id: i64) -> Result<Option<Clinic>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM clinics WHERE clinic_id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![clinic_id], clinic_from_row)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

pub fn active_clinics_for_doctor(
    conn: &Connection,
    doctor_id: i64,
) -> Result<Vec<Clinic>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM clinics WHERE doctor_id = ?1 AND is_active = 1 ORDER BY clinic_id"
    ))?;
    let rows = stmt.query_map(params![doctor_id], clinic_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn active_reg_no_exists(conn: &Connection, reg_no: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM clinics WHERE reg_no = ?1 AND is_active = 1",
        params![reg_no.trim()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Force every active clinic of a doctor offline. Part of the
/// single-online-clinic transaction in `access::set_online`.
pub fn clear_online_for_doctor(conn: &Connection, doctor_id: i64) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE clinics SET is_online = 0 WHERE doctor_id = ?1 AND is_active = 1",
        params![doctor_id],
    )?;
    Ok(())
}

pub fn set_online_flag(
    conn: &Connection,
    clinic_id: i64,
    is_online: bool,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE clinics SET is_online = ?2 WHERE clinic_id = ?1",
        params![clinic_id, is_online as i64],
    )?;
    Ok(changed)
}

/// Soft delete; the registration number is released for reuse.
pub fn deactivate_clinic(conn: &Connection, clinic_id: i64) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE clinics SET is_active = 0, is_online = 0 WHERE clinic_id = ?1",
        params![clinic_id],
    )?;
    Ok(changed)
}

const COLUMNS: &str = "clinic_id, doctor_id, name, address, reg_no, logo, phone_number, clinic_fee, is_online, is_active";

fn clinic_from_row(row: &rusqlite::Row<'_>) -> Result<Clinic, rusqlite::Error> {
    Ok(Clinic {
        clinic_id: row.get(0)?,
        doctor_id: row.get(1)?,
        name: row.get(2)?,
        address: row.get(3)?,
        reg_no: row.get(4)?,
        logo: row.get(5)?,
        phone_number: row.get(6)?,
        clinic_fee: row.get(7)?,
        is_online: row.get::<_, i64>(8)? != 0,
        is_active: row.get::<_, i64>(9)? != 0,
    })
}
