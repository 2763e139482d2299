//! Ledger entries as seen by the budgeting views.

mod journals_model;

pub use journals_model::{Journal, JournalType};
