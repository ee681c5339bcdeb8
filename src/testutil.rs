//! Shared fixtures for in-memory database tests.

use rusqlite::Connection;

use crate::db::repository::{clinic, doctor};
use crate::models::{Gender, NewClinic, NewDoctor, NewPatient};

pub fn seed_doctor(conn: &mut Connection) -> i64 {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM doctors", [], |row| row.get(0))
        .unwrap();
    let new = NewDoctor {
        first_name: "Ayesha".to_string(),
        last_name: "Khan".to_string(),
        email: format!("doctor{n}@clinic.test"),
        mobile_number: "0300-0000000".to_string(),
        password: "unused".to_string(),
    };
    // Fixed hash: the real derivation is deliberately slow and is
    // covered by the crypto tests.
    doctor::create_doctor(conn, &new, "pbkdf2-sha256$1$AA$AA")
        .unwrap()
        .doctor_id
}

pub fn seed_clinic(conn: &mut Connection, doctor_id: i64) -> i64 {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM clinics", [], |row| row.get(0))
        .unwrap();
    let new = NewClinic {
        doctor_id,
        name: format!("Clinic {n}"),
        address: "12 Mall Road".to_string(),
        reg_no: format!("REG-{doctor_id}-{n}"),
        logo: String::new(),
        phone_number: "042-111222333".to_string(),
        clinic_fee: 500.0,
    };
    clinic::create_clinic(conn, &new, false).unwrap().clinic_id
}

pub fn new_patient(doctor_id: i64, clinic_id: i64) -> NewPatient {
    NewPatient {
        name: "Hamza".to_string(),
        father_name: "Bilal".to_string(),
        gender: Gender::Male,
        date_of_birth: "2024-01-15".to_string(),
        email: None,
        cnic: None,
        mobile_number: None,
        city: Some("Lahore".to_string()),
        address: String::new(),
        clinic_id,
        doctor_id,
    }
}
