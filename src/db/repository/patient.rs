use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Gender, NewPatient, Patient};

/// Insert one patient row with a pre-allocated id. Runs inside the
/// registration transaction owned by the projector.
pub fn insert_patient(
    conn: &Connection,
    patient_id: i64,
    new: &NewPatient,
    date_of_birth: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (patient_id, name, father_name, gender, date_of_birth, email,
         cnic, mobile_number, city, address, clinic_id, doctor_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            patient_id,
            new.name.trim(),
            new.father_name.trim(),
            new.gender.as_str(),
            date_of_birth,
            new.email,
            new.cnic,
            new.mobile_number,
            new.city,
            new.address,
            new.clinic_id,
            new.doctor_id,
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, patient_id: i64) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT patient_id, name, father_name, gender, date_of_birth, email, cnic,
             mobile_number, city, address, clinic_id, doctor_id, is_active
             FROM patients WHERE patient_id = ?1",
            params![patient_id],
            patient_row,
        )
        .optional()?;
    row.map(patient_from_row).transpose()
}

/// CNIC uniqueness is scoped per clinic, not global.
pub fn cnic_exists_in_clinic(
    conn: &Connection,
    cnic: &str,
    clinic_id: i64,
    exclude_patient_id: Option<i64>,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM patients
         WHERE cnic = ?1 AND clinic_id = ?2 AND patient_id != COALESCE(?3, -1)",
        params![cnic, clinic_id, exclude_patient_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

type PatientRow = (
    i64,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    i64,
    i64,
    i64,
);

fn patient_row(row: &rusqlite::Row<'_>) -> Result<PatientRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
    ))
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    let (
        patient_id,
        name,
        father_name,
        gender,
        date_of_birth,
        email,
        cnic,
        mobile_number,
        city,
        address,
        clinic_id,
        doctor_id,
        is_active,
    ) = row;
    Ok(Patient {
        patient_id,
        name,
        father_name,
        gender: Gender::from_str(&gender)?,
        date_of_birth,
        email,
        cnic,
        mobile_number,
        city,
        address,
        clinic_id,
        doctor_id,
        is_active: is_active != 0,
    })
}
