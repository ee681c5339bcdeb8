use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Bill, BrandArrival};

pub fn insert_bill(
    conn: &Connection,
    bill_id: i64,
    doctor_id: i64,
    supplier_id: i64,
    bill_date: &str,
    total_quantity: i64,
    total_amount: f64,
    paid: bool,
) -> Result<Bill, DatabaseError> {
    conn.execute(
        "INSERT INTO bills (bill_id, doctor_id, supplier_id, bill_date, total_quantity, total_amount, paid)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            bill_id,
            doctor_id,
            supplier_id,
            bill_date,
            total_quantity,
            total_amount,
            paid as i64,
        ],
    )?;
    Ok(Bill {
        bill_id,
        doctor_id,
        supplier_id,
        bill_date: bill_date.to_string(),
        total_quantity,
        total_amount,
        paid,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn insert_arrival(
    conn: &Connection,
    arrival_id: i64,
    bill_id: i64,
    clinic_id: Option<i64>,
    brand_id: i64,
    quantity: i64,
    unit_price: f64,
    line_total: f64,
) -> Result<BrandArrival, DatabaseError> {
    conn.execute(
        "INSERT INTO brand_arrivals (arrival_id, bill_id, clinic_id, brand_id, quantity, unit_price, line_total)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            arrival_id,
            bill_id,
            clinic_id,
            brand_id,
            quantity,
            unit_price,
            line_total,
        ],
    )?;
    Ok(BrandArrival {
        arrival_id,
        bill_id,
        clinic_id,
        brand_id,
        quantity,
        unit_price,
        line_total,
    })
}

pub fn get_bill(conn: &Connection, bill_id: i64) -> Result<Option<Bill>, DatabaseError> {
    conn.query_row(
        "SELECT bill_id, doctor_id, supplier_id, bill_date, total_quantity, total_amount, paid
         FROM bills WHERE bill_id = ?1",
        params![bill_id],
        bill_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn bills_for_doctor(conn: &Connection, doctor_id: i64) -> Result<Vec<Bill>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT bill_id, doctor_id, supplier_id, bill_date, total_quantity, total_amount, paid
         FROM bills WHERE doctor_id = ?1 ORDER BY bill_id DESC",
    )?;
    let rows = stmt.query_map(params![doctor_id], bill_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn arrivals_for_bill(
    conn: &Connection,
    bill_id: i64,
) -> Result<Vec<BrandArrival>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT arrival_id, bill_id, clinic_id, brand_id, quantity, unit_price, line_total
         FROM brand_arrivals WHERE bill_id = ?1 ORDER BY arrival_id",
    )?;
    let rows = stmt.query_map(params![bill_id], |row| {
        Ok(BrandArrival {
            arrival_id: row.get(0)?,
            bill_id: row.get(1)?,
            clinic_id: row.get(2)?,
            brand_id: row.get(3)?,
            quantity: row.get(4)?,
            unit_price: row.get(5)?,
            line_total: row.get(6)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_bill_totals(
    conn: &Connection,
    bill_id: i64,
    total_quantity: i64,
    total_amount: f64,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE bills SET total_quantity = ?2, total_amount = ?3 WHERE bill_id = ?1",
        params![bill_id, total_quantity, total_amount],
    )?;
    Ok(changed)
}

fn bill_from_row(row: &rusqlite::Row<'_>) -> Result<Bill, rusqlite::Error> {
    Ok(Bill {
        bill_id: row.get(0)?,
        doctor_id: row.get(1)?,
        supplier_id: row.get(2)?,
        bill_date: row.get(3)?,
        total_quantity: row.get(4)?,
        total_amount: row.get(5)?,
        paid: row.get::<_, i64>(6)? != 0,
    })
}
