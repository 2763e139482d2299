//! Per-user scalar preferences (income targets, budget ceiling).

mod preferences_model;
mod preferences_service;
mod preferences_traits;

pub use preferences_model::Preference;
pub use preferences_service::PreferenceService;
pub use preferences_traits::{PreferenceRepositoryTrait, PreferenceServiceTrait};
