//! Supplier bills and stock arrivals.
//!
//! A bill is priced and persisted line by line: each line resolves its
//! unit price (clinic override first, brand default otherwise), lands
//! as a `brand_arrivals` row, and credits the receiving clinic's
//! ledger. Individual line failures are collected in the outcome
//! instead of failing the bill; only a bill where every line fails is
//! rejected outright.

use chrono::Local;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::dates::normalize_date_field;
use crate::db::repository::{
    allocate_id, billing as repo, catalog, clinic, doctor, inventory as inventory_repo,
};
use crate::error::{Error, Result};
use crate::models::{Bill, BillOutcome, BrandArrival, LineFailure, NewBill};

/// Create a bill with its arrival lines. Returns the header, the lines
/// that landed, and the failures. Fails only when the input is invalid
/// or no line could be processed.
pub fn create_bill(conn: &mut Connection, new: &NewBill) -> Result<BillOutcome> {
    if new.lines.is_empty() {
        return Err(Error::validation("lines", "at least one line is required"));
    }
    if doctor::get_doctor(conn, new.doctor_id)?.is_none() {
        return Err(Error::not_found("doctor", new.doctor_id));
    }
    if catalog::get_supplier(conn, new.supplier_id)?.is_none() {
        return Err(Error::not_found("supplier", new.supplier_id));
    }
    let bill_date = match normalize_date_field("date", new.date.as_deref())? {
        Some(date) => date,
        None => Local::now().format("%Y-%m-%d").to_string(),
    };

    let tx = conn.transaction()?;
    let bill_id = allocate_id(&tx, "bills", "bill_id")?;
    repo::insert_bill(
        &tx,
        bill_id,
        new.doctor_id,
        new.supplier_id,
        &bill_date,
        0,
        0.0,
        new.paid,
    )?;

    let mut lines: Vec<BrandArrival> = Vec::new();
    let mut failures: Vec<LineFailure> = Vec::new();
    for line in &new.lines {
        if line.quantity <= 0 {
            failures.push(LineFailure {
                brand_id: line.brand_id,
                reason: "quantity must be positive".to_string(),
            });
            continue;
        }
        let Some(brand) = catalog::get_brand(&tx, line.brand_id)? else {
            failures.push(LineFailure {
                brand_id: line.brand_id,
                reason: "unknown brand".to_string(),
            });
            continue;
        };
        // An unknown clinic would trip the arrival/ledger foreign keys
        // and take the whole bill down with it; fail the line instead.
        if let Some(clinic_id) = line.clinic_id {
            if clinic::get_clinic(&tx, clinic_id)?.is_none() {
                failures.push(LineFailure {
                    brand_id: line.brand_id,
                    reason: format!("unknown clinic {clinic_id}"),
                });
                continue;
            }
        }
        let unit_price = match line.clinic_id {
            Some(clinic_id) => {
                inventory_repo::clinic_price(&tx, clinic_id, brand.brand_id)?.unwrap_or(brand.amount)
            }
            None => brand.amount,
        };
        let line_total = unit_price * line.quantity as f64;

        let arrival_id = allocate_id(&tx, "brand_arrivals", "arrival_id")?;
        let arrival = repo::insert_arrival(
            &tx,
            arrival_id,
            bill_id,
            line.clinic_id,
            brand.brand_id,
            line.quantity,
            unit_price,
            line_total,
        )?;
        // Unattributed arrivals (no clinic) credit no ledger.
        if let Some(clinic_id) = line.clinic_id {
            inventory_repo::credit_in(&tx, clinic_id, brand.brand_id, line.quantity)?;
        }
        lines.push(arrival);
    }

    if lines.is_empty() {
        // Dropping the transaction discards the header as well.
        warn!(
            doctor_id = new.doctor_id,
            supplier_id = new.supplier_id,
            failed = failures.len(),
            "bill rejected, no processable line"
        );
        return Err(Error::Validation {
            field: "lines",
            reason: "no line could be processed".to_string(),
        });
    }

    let total_quantity: i64 = lines.iter().map(|l| l.quantity).sum();
    let total_amount: f64 = lines.iter().map(|l| l.line_total).sum();
    repo::update_bill_totals(&tx, bill_id, total_quantity, total_amount)?;
    tx.commit()?;

    let bill = repo::get_bill(conn, bill_id)?.ok_or_else(|| Error::not_found("bill", bill_id))?;
    info!(
        bill_id,
        doctor_id = new.doctor_id,
        lines = lines.len(),
        failed = failures.len(),
        total_quantity,
        "bill created"
    );
    Ok(BillOutcome {
        bill,
        lines,
        failures,
    })
}

/// Bill headers of a doctor, newest first.
pub fn bills_for_doctor(conn: &Connection, doctor_id: i64) -> Result<Vec<Bill>> {
    Ok(repo::bills_for_doctor(conn, doctor_id)?)
}

/// One bill with its arrival lines.
pub fn bill_with_lines(conn: &Connection, bill_id: i64) -> Result<(Bill, Vec<BrandArrival>)> {
    let bill = repo::get_bill(conn, bill_id)?.ok_or_else(|| Error::not_found("bill", bill_id))?;
    let lines = repo::arrivals_for_bill(conn, bill_id)?;
    Ok((bill, lines))
}
