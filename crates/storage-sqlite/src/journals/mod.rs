//! SQLite storage for transaction journals.

pub(crate) mod model;
mod repository;

pub use model::{JournalDB, NewJournalDB};
pub use repository::JournalRepository;
