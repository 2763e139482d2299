//! SQLite storage implementation for budgetbook.
//!
//! This crate is the only place where Diesel dependencies exist. It implements
//! the repository traits defined in `budgetbook-core` and contains:
//! - Database connection pooling and the single-writer task
//! - Embedded Diesel migrations
//! - Repository implementations for budgets, preferences and journals
//! - Database-specific model types (with Diesel derives)

pub mod db;
pub mod errors;
pub mod schema;

pub mod budgets;
pub mod journals;
pub mod preferences;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use errors::{IntoCore, StorageError};

pub use budgetbook_core::errors::{DatabaseError, Error, Result};
