use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(DatabaseError::InvalidEnum {
                field: "gender".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// A registered patient, bound to one clinic and (denormalized) one doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub patient_id: i64,
    pub name: String,
    pub father_name: String,
    pub gender: Gender,
    /// Calendar date, `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub email: Option<String>,
    pub cnic: Option<String>,
    pub mobile_number: Option<String>,
    pub city: Option<String>,
    pub address: String,
    pub clinic_id: i64,
    pub doctor_id: i64,
    pub is_active: bool,
}

/// Registration input for [`crate::projection::register_patient`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    #[serde(default)]
    pub father_name: String,
    pub gender: Gender,
    pub date_of_birth: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cnic: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: String,
    pub clinic_id: i64,
    pub doctor_id: i64,
}
