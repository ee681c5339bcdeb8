use serde::{Deserialize, Serialize};

/// Clinic-specific price override for a brand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicBrandPrice {
    pub price_id: i64,
    pub clinic_id: i64,
    pub brand_id: i64,
    pub price: f64,
}

/// One line of a clinic stock snapshot: every known brand appears,
/// untracked ones at quantity 0.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub brand_id: i64,
    pub brand_name: String,
    /// Clinic override when present, otherwise the brand default.
    pub effective_price: f64,
    pub default_price: f64,
    pub quantity: i64,
}

/// Snapshot of one clinic's stock, for per-doctor reporting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicStock {
    pub clinic_id: i64,
    pub clinic_name: String,
    pub stock: Vec<StockLevel>,
}
