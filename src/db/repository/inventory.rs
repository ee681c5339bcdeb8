use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{allocate_id, DatabaseError};
use crate::models::{ClinicBrandPrice, StockLevel};

/// Atomic upsert increment. The quantity arithmetic happens inside the
/// statement, never as application-side read-modify-write.
pub fn credit_in(
    conn: &Connection,
    clinic_id: i64,
    brand_id: i64,
    quantity: i64,
) -> Result<i64, DatabaseError> {
    let inventory_id = allocate_id(conn, "clinic_inventory", "inventory_id")?;
    conn.execute(
        "INSERT INTO clinic_inventory (inventory_id, clinic_id, brand_id, quantity)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (clinic_id, brand_id)
         DO UPDATE SET quantity = quantity + excluded.quantity",
        params![inventory_id, clinic_id, brand_id, quantity],
    )?;
    current_quantity(conn, clinic_id, brand_id)
}

/// Atomic upsert decrement, floored at 0. A missing row is created at 0
/// first; draining an empty ledger is a deliberate clamp, not an error.
pub fn debit_in(
    conn: &Connection,
    clinic_id: i64,
    brand_id: i64,
    quantity: i64,
) -> Result<i64, DatabaseError> {
    let inventory_id = allocate_id(conn, "clinic_inventory", "inventory_id")?;
    conn.execute(
        "INSERT INTO clinic_inventory (inventory_id, clinic_id, brand_id, quantity)
         VALUES (?1, ?2, ?3, 0)
         ON CONFLICT (clinic_id, brand_id)
         DO UPDATE SET quantity = MAX(0, quantity - ?4)",
        params![inventory_id, clinic_id, brand_id, quantity],
    )?;
    current_quantity(conn, clinic_id, brand_id)
}

pub fn current_quantity(
    conn: &Connection,
    clinic_id: i64,
    brand_id: i64,
) -> Result<i64, DatabaseError> {
    let quantity = conn
        .query_row(
            "SELECT quantity FROM clinic_inventory WHERE clinic_id = ?1 AND brand_id = ?2",
            params![clinic_id, brand_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(quantity.unwrap_or(0))
}

/// Every known brand against one clinic's ledger rows and price
/// overrides; brands with no row report quantity 0.
pub fn stock_snapshot(conn: &Connection, clinic_id: i64) -> Result<Vec<StockLevel>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT b.brand_id, b.name, COALESCE(p.price, b.amount), b.amount, COALESCE(i.quantity, 0)
         FROM brands b
         LEFT JOIN clinic_inventory i ON i.brand_id = b.brand_id AND i.clinic_id = ?1
         LEFT JOIN clinic_brand_prices p ON p.brand_id = b.brand_id AND p.clinic_id = ?1
         ORDER BY b.brand_id",
    )?;
    let rows = stmt.query_map(params![clinic_id], |row| {
        Ok(StockLevel {
            brand_id: row.get(0)?,
            brand_name: row.get(1)?,
            effective_price: row.get(2)?,
            default_price: row.get(3)?,
            quantity: row.get(4)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn upsert_price(
    conn: &mut Connection,
    clinic_id: i64,
    brand_id: i64,
    price: f64,
) -> Result<ClinicBrandPrice, DatabaseError> {
    let tx = conn.transaction()?;
    let price_id = allocate_id(&tx, "clinic_brand_prices", "price_id")?;
    tx.execute(
        "INSERT INTO clinic_brand_prices (price_id, clinic_id, brand_id, price)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (clinic_id, brand_id) DO UPDATE SET price = excluded.price",
        params![price_id, clinic_id, brand_id, price],
    )?;
    let stored = tx.query_row(
        "SELECT price_id, clinic_id, brand_id, price
         FROM clinic_brand_prices WHERE clinic_id = ?1 AND brand_id = ?2",
        params![clinic_id, brand_id],
        |row| {
            Ok(ClinicBrandPrice {
                price_id: row.get(0)?,
                clinic_id: row.get(1)?,
                brand_id: row.get(2)?,
                price: row.get(3)?,
            })
        },
    )?;
    tx.commit()?;
    Ok(stored)
}

pub fn clinic_price(
    conn: &Connection,
    clinic_id: i64,
    brand_id: i64,
) -> Result<Option<f64>, DatabaseError> {
    conn.query_row(
        "SELECT price FROM clinic_brand_prices WHERE clinic_id = ?1 AND brand_id = ?2",
        params![clinic_id, brand_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(DatabaseError::from)
}
