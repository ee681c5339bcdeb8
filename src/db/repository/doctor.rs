use rusqlite::{params, Connection};

use crate::db::{allocate_id, DatabaseError};
use crate::models::{Doctor, NewDoctor};

pub fn create_doctor(
    conn: &mut Connection,
    new: &NewDoctor,
    password_hash: &str,
) -> Result<Doctor, DatabaseError> {
    let tx = conn.transaction()?;
    let doctor_id = allocate_id(&tx, "doctors", "doctor_id")?;
    tx.execute(
        "INSERT INTO doctors (doctor_id, first_name, last_name, email, mobile_number, password_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            doctor_id,
            new.first_name,
            new.last_name,
            new.email.to_lowercase(),
            new.mobile_number,
            password_hash,
        ],
    )?;
    tx.commit()?;

    Ok(Doctor {
        doctor_id,
        first_name: new.first_name.clone(),
        last_name: new.last_name.clone(),
        email: new.email.to_lowercase(),
        mobile_number: new.mobile_number.clone(),
        password_hash: password_hash.to_string(),
        is_active: true,
    })
}

pub fn get_doctor(conn: &Connection, doctor_id: i64) -> Result<Option<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT doctor_id, first_name, last_name, email, mobile_number, password_hash, is_active
         FROM doctors WHERE doctor_id = ?1",
    )?;
    let mut rows = stmt.query_map(params![doctor_id], doctor_from_row)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

fn doctor_from_row(row: &rusqlite::Row<'_>) -> Result<Doctor, rusqlite::Error> {
    Ok(Doctor {
        doctor_id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        mobile_number: row.get(4)?,
        password_hash: row.get(5)?,
        is_active: row.get::<_, i64>(6)? != 0,
    })
}
