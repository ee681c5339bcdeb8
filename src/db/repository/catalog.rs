use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{allocate_id, DatabaseError};
use crate::models::{Brand, Dose, Supplier, Vaccine};

pub fn create_vaccine(
    conn: &mut Connection,
    name: &str,
    min_age: i64,
    max_age: i64,
) -> Result<Vaccine, DatabaseError> {
    let tx = conn.transaction()?;
    let vaccine_id = allocate_id(&tx, "vaccines", "vaccine_id")?;
    tx.execute(
        "INSERT INTO vaccines (vaccine_id, name, min_age, max_age) VALUES (?1, ?2, ?3, ?4)",
        params![vaccine_id, name.trim(), min_age, max_age],
    )?;
    tx.commit()?;
    Ok(Vaccine {
        vaccine_id,
        name: name.trim().to_string(),
        min_age,
        max_age,
        is_infinite: false,
        validity: true,
    })
}

pub fn create_dose(
    conn: &mut Connection,
    name: &str,
    min_age: i64,
    max_age: i64,
    min_gap: i64,
    vaccine_id: Option<i64>,
) -> Result<Dose, DatabaseError> {
    let tx = conn.transaction()?;
    let dose_id = allocate_id(&tx, "doses", "dose_id")?;
    tx.execute(
        "INSERT INTO doses (dose_id, name, min_age, max_age, min_gap, vaccine_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![dose_id, name.trim(), min_age, max_age, min_gap, vaccine_id],
    )?;
    tx.commit()?;
    Ok(Dose {
        dose_id,
        name: name.trim().to_string(),
        min_age,
        max_age,
        min_gap,
        vaccine_id,
    })
}

pub fn get_dose(conn: &Connection, dose_id: i64) -> Result<Option<Dose>, DatabaseError> {
    conn.query_row(
        "SELECT dose_id, name, min_age, max_age, min_gap, vaccine_id FROM doses WHERE dose_id = ?1",
        params![dose_id],
        dose_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn create_brand(conn: &mut Connection, name: &str, amount: f64) -> Result<Brand, DatabaseError> {
    let tx = conn.transaction()?;
    let brand_id = allocate_id(&tx, "brands", "brand_id")?;
    tx.execute(
        "INSERT INTO brands (brand_id, name, amount) VALUES (?1, ?2, ?3)",
        params![brand_id, name.trim(), amount],
    )?;
    tx.commit()?;
    Ok(Brand {
        brand_id,
        name: name.trim().to_string(),
        amount,
    })
}

pub fn get_brand(conn: &Connection, brand_id: i64) -> Result<Option<Brand>, DatabaseError> {
    conn.query_row(
        "SELECT brand_id, name, amount FROM brands WHERE brand_id = ?1",
        params![brand_id],
        brand_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn create_supplier(
    conn: &mut Connection,
    doctor_id: i64,
    name: &str,
    mobile_number: &str,
) -> Result<Supplier, DatabaseError> {
    let tx = conn.transaction()?;
    let supplier_id = allocate_id(&tx, "suppliers", "supplier_id")?;
    tx.execute(
        "INSERT INTO suppliers (supplier_id, doctor_id, name, mobile_number)
         VALUES (?1, ?2, ?3, ?4)",
        params![supplier_id, doctor_id, name.trim(), mobile_number.trim()],
    )?;
    tx.commit()?;
    Ok(Supplier {
        supplier_id,
        doctor_id,
        name: name.trim().to_string(),
        mobile_number: mobile_number.trim().to_string(),
        is_active: true,
    })
}

pub fn get_supplier(conn: &Connection, supplier_id: i64) -> Result<Option<Supplier>, DatabaseError> {
    conn.query_row(
        "SELECT supplier_id, doctor_id, name, mobile_number, is_active
         FROM suppliers WHERE supplier_id = ?1",
        params![supplier_id],
        |row| {
            Ok(Supplier {
                supplier_id: row.get(0)?,
                doctor_id: row.get(1)?,
                name: row.get(2)?,
                mobile_number: row.get(3)?,
                is_active: row.get::<_, i64>(4)? != 0,
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub(crate) fn dose_from_row(row: &rusqlite::Row<'_>) -> Result<Dose, rusqlite::Error> {
    Ok(Dose {
        dose_id: row.get(0)?,
        name: row.get(1)?,
        min_age: row.get(2)?,
        max_age: row.get(3)?,
        min_gap: row.get(4)?,
        vaccine_id: row.get(5)?,
    })
}

pub(crate) fn brand_from_row(row: &rusqlite::Row<'_>) -> Result<Brand, rusqlite::Error> {
    Ok(Brand {
        brand_id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    #[test]
    fn dose_links_back_to_its_vaccine() {
        let mut conn = open_memory_database().unwrap();
        let vaccine = create_vaccine(&mut conn, "Pentavalent", 0, 60).unwrap();
        let dose = create_dose(&mut conn, "Penta-1", 0, 24, 28, Some(vaccine.vaccine_id)).unwrap();

        let stored = get_dose(&conn, dose.dose_id).unwrap().unwrap();
        assert_eq!(stored.vaccine_id, Some(vaccine.vaccine_id));
    }

    #[test]
    fn unknown_vaccine_reference_rejected() {
        let mut conn = open_memory_database().unwrap();
        let result = create_dose(&mut conn, "Penta-1", 0, 24, 28, Some(99));
        assert!(result.is_err());
    }

    #[test]
    fn names_are_trimmed_on_insert() {
        let mut conn = open_memory_database().unwrap();
        let brand = create_brand(&mut conn, "  Pentaxim ", 1800.0).unwrap();
        assert_eq!(brand.name, "Pentaxim");
        assert_eq!(get_brand(&conn, brand.brand_id).unwrap().unwrap().name, "Pentaxim");
    }
}
