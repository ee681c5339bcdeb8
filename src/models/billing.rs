use serde::{Deserialize, Serialize};

/// Stock-receipt header; lines live in `brand_arrivals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub bill_id: i64,
    pub doctor_id: i64,
    pub supplier_id: i64,
    /// Calendar date, `YYYY-MM-DD`.
    pub bill_date: String,
    pub total_quantity: i64,
    pub total_amount: f64,
    pub paid: bool,
}

/// One received line of a bill. A null `clinic_id` means the arrival is
/// unattributed and credits no clinic ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandArrival {
    pub arrival_id: i64,
    pub bill_id: i64,
    pub clinic_id: Option<i64>,
    pub brand_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    pub doctor_id: i64,
    pub supplier_id: i64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub paid: bool,
    pub lines: Vec<NewBillLine>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBillLine {
    #[serde(default)]
    pub clinic_id: Option<i64>,
    pub brand_id: i64,
    pub quantity: i64,
}

/// A line that failed pricing or persistence, with the reason kept for
/// the per-item breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineFailure {
    pub brand_id: i64,
    pub reason: String,
}

/// Outcome of bill creation: the header, the arrival lines that landed,
/// and the per-line failures. The call as a whole only fails when zero
/// lines succeed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillOutcome {
    pub bill: Bill,
    pub lines: Vec<BrandArrival>,
    pub failures: Vec<LineFailure>,
}
