//! Schedule and inventory engine for small vaccination clinics.
//!
//! Doctors keep a dose template; registering a patient projects that
//! template into per-patient schedule rows; administering a dose
//! debits the clinic's brand ledger; supplier bills credit it. Access
//! for delegated assistants is gated per module and per clinic.
//!
//! Everything persists in a single SQLite file (see [`db`]); the
//! service modules ([`template`], [`projection`], [`administration`],
//! [`inventory`], [`billing`], [`access`]) hold the domain rules.

pub mod access;
pub mod administration;
pub mod billing;
pub mod config;
pub mod crypto;
pub mod dates;
pub mod db;
pub mod error;
pub mod inventory;
pub mod models;
pub mod projection;
pub mod template;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise the built-in default filter applies. Safe to call once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
