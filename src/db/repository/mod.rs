//! Row-level access, one module per entity. Free functions over
//! `&Connection`; creation paths run inside a write transaction so the
//! id allocation below is race-free.

pub mod assistant;
pub mod billing;
pub mod catalog;
pub mod clinic;
pub mod doctor;
pub mod doctor_schedule;
pub mod inventory;
pub mod patient;
pub mod patient_schedule;

use rusqlite::Connection;

use super::DatabaseError;

/// Next identifier for an entity table: `max + 1`, or 1 for an empty
/// table. Ids are per-entity-type, never shared across tables.
///
/// Must be called inside the same write transaction as the insert that
/// consumes the id — SQLite serializes write transactions, which closes
/// the read-then-insert race a bare query would have.
pub fn allocate_id(
    conn: &Connection,
    table: &'static str,
    column: &'static str,
) -> Result<i64, DatabaseError> {
    let next = conn.query_row(
        &format!("SELECT COALESCE(MAX({column}), 0) + 1 FROM {table}"),
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    #[test]
    fn empty_table_starts_at_one() {
        let conn = open_memory_database().unwrap();
        assert_eq!(allocate_id(&conn, "doctors", "doctor_id").unwrap(), 1);
    }

    #[test]
    fn ids_are_monotone_and_gap_free() {
        let conn = open_memory_database().unwrap();
        for expected in 1..=5 {
            let id = allocate_id(&conn, "doctors", "doctor_id").unwrap();
            assert_eq!(id, expected);
            conn.execute(
                "INSERT INTO doctors (doctor_id, first_name, last_name, email, password_hash)
                 VALUES (?1, 'A', 'B', 'd' || ?1 || '@x.y', 'h')",
                [id],
            )
            .unwrap();
        }
    }

    #[test]
    fn counters_are_independent_per_table() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO doctors (doctor_id, first_name, last_name, email, password_hash)
             VALUES (7, 'A', 'B', 'a@b.c', 'h')",
            [],
        )
        .unwrap();
        assert_eq!(allocate_id(&conn, "doctors", "doctor_id").unwrap(), 8);
        assert_eq!(allocate_id(&conn, "brands", "brand_id").unwrap(), 1);
    }
}
