//! Persisted entity shapes. Field names serialize in the camelCase form
//! the surrounding services exchange (`doctorId`, `planDate`, `IsDone`).

pub mod assistant;
pub mod billing;
pub mod catalog;
pub mod clinic;
pub mod doctor;
pub mod inventory;
pub mod patient;
pub mod schedule;

pub use assistant::*;
pub use billing::*;
pub use catalog::*;
pub use clinic::*;
pub use doctor::*;
pub use inventory::*;
pub use patient::*;
pub use schedule::*;
