use serde::{Deserialize, Serialize};

/// A doctor account. Owns clinics, assistants and one template schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub doctor_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    /// Salted PBKDF2 hash — never leaves the crate surface.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_active: bool,
}

/// Registration input; the password is hashed before storage.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDoctor {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub mobile_number: String,
    pub password: String,
}
