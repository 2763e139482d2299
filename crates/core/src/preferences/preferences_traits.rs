use async_trait::async_trait;

use crate::errors::Result;
use crate::preferences::Preference;

/// Repository trait for per-user preferences.
#[async_trait]
pub trait PreferenceRepositoryTrait: Send + Sync {
    /// Get a preference by name, `None` if the user never set it.
    fn get_preference(&self, user_id: i32, name: &str) -> Result<Option<Preference>>;

    /// Insert or overwrite a preference.
    async fn set_preference(&self, user_id: i32, name: &str, data: i64) -> Result<Preference>;
}

/// Service trait for preference lookups with defaults.
#[async_trait]
pub trait PreferenceServiceTrait: Send + Sync {
    /// Returns the stored preference, or one carrying `default` when unset.
    fn get(&self, user_id: i32, name: &str, default: i64) -> Result<Preference>;

    async fn set(&self, user_id: i32, name: &str, data: i64) -> Result<Preference>;
}
