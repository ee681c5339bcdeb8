use serde::{Deserialize, Serialize};

/// A clinic, owned by exactly one doctor. Soft-deleted via `is_active`;
/// at most one clinic per doctor is online at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub clinic_id: i64,
    pub doctor_id: i64,
    pub name: String,
    pub address: String,
    pub reg_no: String,
    pub logo: String,
    pub phone_number: String,
    pub clinic_fee: f64,
    pub is_online: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClinic {
    pub doctor_id: i64,
    pub name: String,
    pub address: String,
    pub reg_no: String,
    #[serde(default)]
    pub logo: String,
    pub phone_number: String,
    pub clinic_fee: f64,
}
