//! budgetbook core - domain entities, services, and traits.
//!
//! This crate contains the business logic behind the budget pages. It is
//! database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate.

pub mod budgets;
pub mod constants;
pub mod errors;
pub mod journals;
pub mod preferences;
pub mod session;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
