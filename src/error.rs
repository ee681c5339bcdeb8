//! Crate-level error taxonomy.
//!
//! Storage faults stay in [`crate::db::DatabaseError`]; everything the
//! service layer surfaces to callers is one of these variants. Partial
//! failure of multi-line operations is not an error — it is carried by
//! the outcome types (see [`crate::billing::BillOutcome`]).

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum Error {
    /// A referenced entity does not exist. Surfaced directly, no retry.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Missing required field, malformed date, negative amount.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Duplicate unique key — user-correctable, not a server fault.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Assistant lacks permission for the module/clinic, or the account
    /// is disabled. Distinct from NotFound.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Underlying storage failed for reasons unrelated to input.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl Error {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

// Raw rusqlite errors surface from transaction begin/commit in the
// service layer; route them through the storage variant.
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::from(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
