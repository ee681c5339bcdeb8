use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Engine module an assistant may be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Patients,
    Schedules,
    Inventory,
    Alerts,
    Billing,
}

impl Module {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Schedules => "schedules",
            Self::Inventory => "inventory",
            Self::Alerts => "alerts",
            Self::Billing => "billing",
        }
    }
}

impl FromStr for Module {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patients" => Ok(Self::Patients),
            "schedules" => Ok(Self::Schedules),
            "inventory" => Ok(Self::Inventory),
            "alerts" => Ok(Self::Alerts),
            "billing" => Ok(Self::Billing),
            _ => Err(DatabaseError::InvalidEnum {
                field: "module".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// The five per-module toggles, used both globally on the assistant and
/// per clinic in `pa_access`. Default deny.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePermissions {
    #[serde(default)]
    pub allow_patients: bool,
    #[serde(default)]
    pub allow_schedules: bool,
    #[serde(default)]
    pub allow_inventory: bool,
    #[serde(default)]
    pub allow_alerts: bool,
    #[serde(default)]
    pub allow_billing: bool,
}

impl ModulePermissions {
    pub fn allows(&self, module: Module) -> bool {
        match module {
            Module::Patients => self.allow_patients,
            Module::Schedules => self.allow_schedules,
            Module::Inventory => self.allow_inventory,
            Module::Alerts => self.allow_alerts,
            Module::Billing => self.allow_billing,
        }
    }
}

/// A doctor-delegated actor. Global `permissions` gate module use at
/// all; per-clinic scope comes from [`PaAccess`] rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalAssistant {
    pub pa_id: i64,
    pub doctor_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub permissions: ModulePermissions,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssistant {
    pub doctor_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub mobile_number: String,
    pub password: String,
    #[serde(default)]
    pub permissions: ModulePermissions,
}

/// Per-clinic permission override for one assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaAccess {
    pub pa_access_id: i64,
    pub pa_id: i64,
    pub clinic_id: i64,
    #[serde(flatten)]
    pub permissions: ModulePermissions,
}

/// Input for granting or replacing an assistant's clinic scope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaAccessGrant {
    pub clinic_id: i64,
    #[serde(flatten)]
    pub permissions: ModulePermissions,
}
