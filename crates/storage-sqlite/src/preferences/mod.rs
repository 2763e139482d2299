//! SQLite storage for per-user preferences.

mod model;
mod repository;

pub use model::{NewPreferenceDB, PreferenceDB};
pub use repository::PreferenceRepository;

pub use budgetbook_core::preferences::PreferenceRepositoryTrait;
