//! Clinic inventory ledger.
//!
//! Per-clinic, per-brand stock counters. Credits come from stock
//! arrivals (bills) and dose corrections; debits from administration.
//! Quantity never goes negative — debits clamp at 0. Deltas are
//! commutative atomic upserts executed inside a write transaction, so
//! concurrent movements cannot lose updates.

use rusqlite::Connection;
use tracing::debug;

use crate::db::repository::{clinic, inventory as repo};
use crate::error::{Error, Result};
use crate::models::{ClinicStock, StockLevel};

/// Increment a clinic's stock of a brand, creating the ledger row on
/// first arrival. Returns the resulting quantity.
pub fn credit(conn: &mut Connection, clinic_id: i64, brand_id: i64, quantity: i64) -> Result<i64> {
    if quantity <= 0 {
        return Err(Error::validation("quantity", "must be positive"));
    }
    let tx = conn.transaction()?;
    let resulting = repo::credit_in(&tx, clinic_id, brand_id, quantity)?;
    tx.commit()?;
    debug!(clinic_id, brand_id, quantity, resulting, "ledger credit");
    Ok(resulting)
}

/// Decrement a clinic's stock of a brand, floored at 0. A missing row
/// is created at 0 first. Returns the resulting quantity.
pub fn debit(conn: &mut Connection, clinic_id: i64, brand_id: i64, quantity: i64) -> Result<i64> {
    if quantity <= 0 {
        return Err(Error::validation("quantity", "must be positive"));
    }
    let tx = conn.transaction()?;
    let resulting = repo::debit_in(&tx, clinic_id, brand_id, quantity)?;
    tx.commit()?;
    debug!(clinic_id, brand_id, quantity, resulting, "ledger debit");
    Ok(resulting)
}

/// One clinic's stock across every known brand; untracked brands show
/// quantity 0, and the price is the clinic override when one exists.
pub fn snapshot(conn: &Connection, clinic_id: i64) -> Result<Vec<StockLevel>> {
    if clinic::get_clinic(conn, clinic_id)?.is_none() {
        return Err(Error::not_found("clinic", clinic_id));
    }
    Ok(repo::stock_snapshot(conn, clinic_id)?)
}

/// Stock per active clinic of a doctor.
pub fn doctor_snapshot(conn: &Connection, doctor_id: i64) -> Result<Vec<ClinicStock>> {
    let clinics = clinic::active_clinics_for_doctor(conn, doctor_id)?;
    let mut result = Vec::with_capacity(clinics.len());
    for clinic in clinics {
        result.push(ClinicStock {
            clinic_id: clinic.clinic_id,
            clinic_name: clinic.name,
            stock: repo::stock_snapshot(conn, clinic.clinic_id)?,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::catalog::create_brand;
    use crate::db::repository::inventory::upsert_price;
    use crate::testutil::{seed_clinic, seed_doctor};

    #[test]
    fn credit_creates_row_then_accumulates() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let clinic_id = seed_clinic(&mut conn, doctor_id);
        let brand = create_brand(&mut conn, "Pentaxim", 1800.0).unwrap();

        assert_eq!(credit(&mut conn, clinic_id, brand.brand_id, 5).unwrap(), 5);
        assert_eq!(credit(&mut conn, clinic_id, brand.brand_id, 3).unwrap(), 8);
    }

    #[test]
    fn debit_clamps_at_zero() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let clinic_id = seed_clinic(&mut conn, doctor_id);
        let brand = create_brand(&mut conn, "Pentaxim", 1800.0).unwrap();

        credit(&mut conn, clinic_id, brand.brand_id, 2).unwrap();
        assert_eq!(debit(&mut conn, clinic_id, brand.brand_id, 10).unwrap(), 0);
        // Further debits stay at the floor.
        assert_eq!(debit(&mut conn, clinic_id, brand.brand_id, 1).unwrap(), 0);
    }

    #[test]
    fn debit_on_untracked_pair_creates_row_at_zero() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let clinic_id = seed_clinic(&mut conn, doctor_id);
        let brand = create_brand(&mut conn, "Pentaxim", 1800.0).unwrap();

        assert_eq!(debit(&mut conn, clinic_id, brand.brand_id, 1).unwrap(), 0);
        let snap = snapshot(&conn, clinic_id).unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].quantity, 0);
    }

    #[test]
    fn quantity_never_observed_negative() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let clinic_id = seed_clinic(&mut conn, doctor_id);
        let brand = create_brand(&mut conn, "Rotarix", 2500.0).unwrap();

        let deltas: [(bool, i64); 7] = [
            (false, 3),
            (true, 1),
            (true, 5),
            (false, 2),
            (true, 1),
            (true, 1),
            (false, 4),
        ];
        for (is_debit, qty) in deltas {
            let quantity = if is_debit {
                debit(&mut conn, clinic_id, brand.brand_id, qty).unwrap()
            } else {
                credit(&mut conn, clinic_id, brand.brand_id, qty).unwrap()
            };
            assert!(quantity >= 0);
        }
    }

    #[test]
    fn non_positive_delta_rejected() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let clinic_id = seed_clinic(&mut conn, doctor_id);
        let err = credit(&mut conn, clinic_id, 1, 0).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "quantity", .. }));
    }

    #[test]
    fn snapshot_lists_all_brands_with_effective_prices() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let clinic_id = seed_clinic(&mut conn, doctor_id);
        let priced = create_brand(&mut conn, "Pentaxim", 1800.0).unwrap();
        let plain = create_brand(&mut conn, "Rotarix", 2500.0).unwrap();

        credit(&mut conn, clinic_id, priced.brand_id, 4).unwrap();
        upsert_price(&mut conn, clinic_id, priced.brand_id, 1650.0).unwrap();

        let snap = snapshot(&conn, clinic_id).unwrap();
        assert_eq!(snap.len(), 2);

        let first = snap.iter().find(|s| s.brand_id == priced.brand_id).unwrap();
        assert_eq!(first.quantity, 4);
        assert_eq!(first.effective_price, 1650.0);
        assert_eq!(first.default_price, 1800.0);

        let second = snap.iter().find(|s| s.brand_id == plain.brand_id).unwrap();
        assert_eq!(second.quantity, 0);
        assert_eq!(second.effective_price, 2500.0);
    }

    #[test]
    fn doctor_snapshot_covers_each_active_clinic() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let c1 = seed_clinic(&mut conn, doctor_id);
        let c2 = seed_clinic(&mut conn, doctor_id);
        let brand = create_brand(&mut conn, "Pentaxim", 1800.0).unwrap();
        credit(&mut conn, c2, brand.brand_id, 7).unwrap();

        let stocks = doctor_snapshot(&conn, doctor_id).unwrap();
        assert_eq!(stocks.len(), 2);
        let by_id = |id: i64| stocks.iter().find(|s| s.clinic_id == id).unwrap();
        assert_eq!(by_id(c1).stock[0].quantity, 0);
        assert_eq!(by_id(c2).stock[0].quantity, 7);
    }
}
