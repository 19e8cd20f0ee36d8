//! Service layer holding the employee collection.
//! - Owns the in-memory map and its mirror on disk.
//! - Provides clear error types consumed by the HTTP layer.

pub mod errors;
pub mod storage;

pub use storage::employee_store::{EmployeeStore, Record};
