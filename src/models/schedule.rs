use serde::{Deserialize, Serialize};

use super::{Brand, Dose};

/// One entry of a doctor's template schedule: "this dose is part of my
/// standard protocol", optionally with a planned date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSchedule {
    pub schedule_id: i64,
    pub doctor_id: i64,
    pub dose_id: i64,
    pub plan_date: Option<String>,
    pub is_active: bool,
}

/// A patient's copy of one template entry, materialized at registration
/// time. Diverges freely from the template afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSchedule {
    pub schedule_id: i64,
    pub child_id: i64,
    pub dose_id: i64,
    pub plan_date: Option<String>,
    pub given_date: Option<String>,
    pub brand_id: Option<i64>,
    #[serde(rename = "IsDone")]
    pub is_done: bool,
}

/// Partial update for one patient-schedule row.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePatch {
    #[serde(default, with = "double_option")]
    pub plan_date: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub given_date: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub brand_id: Option<Option<i64>>,
    #[serde(default, rename = "IsDone")]
    pub is_done: Option<bool>,
}

/// Distinguishes an absent field from an explicit null.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

/// Template entry enriched with its dose for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorScheduleDetail {
    #[serde(flatten)]
    pub schedule: DoctorSchedule,
    pub dose: Option<Dose>,
}

/// Patient entry enriched with dose and administered brand for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientScheduleDetail {
    #[serde(flatten)]
    pub schedule: PatientSchedule,
    pub dose: Option<Dose>,
    pub brand: Option<Brand>,
}
