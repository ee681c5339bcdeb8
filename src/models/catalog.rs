//! Reference data: vaccines, their doses, brands and suppliers.
//! Consumed read-only by the engine for names, prices and age constraints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccine {
    pub vaccine_id: i64,
    pub name: String,
    pub min_age: i64,
    pub max_age: i64,
    pub is_infinite: bool,
    pub validity: bool,
}

/// A reusable dose template entry (ages in months, gap in days).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dose {
    pub dose_id: i64,
    pub name: String,
    pub min_age: i64,
    pub max_age: i64,
    pub min_gap: i64,
    pub vaccine_id: Option<i64>,
}

/// A vaccine brand; `amount` is the default unit price, overridable
/// per clinic through `clinic_brand_prices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub brand_id: i64,
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub supplier_id: i64,
    pub doctor_id: i64,
    pub name: String,
    pub mobile_number: String,
    pub is_active: bool,
}
