use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::{Preference, PreferenceRepositoryTrait, PreferenceServiceTrait};
use crate::errors::Result;

pub struct PreferenceService {
    repository: Arc<dyn PreferenceRepositoryTrait>,
}

impl PreferenceService {
    pub fn new(repository: Arc<dyn PreferenceRepositoryTrait>) -> Self {
        PreferenceService { repository }
    }
}

#[async_trait]
impl PreferenceServiceTrait for PreferenceService {
    fn get(&self, user_id: i32, name: &str, default: i64) -> Result<Preference> {
        Ok(self
            .repository
            .get_preference(user_id, name)?
            .unwrap_or_else(|| Preference {
                name: name.to_string(),
                data: default,
            }))
    }

    async fn set(&self, user_id: i32, name: &str, data: i64) -> Result<Preference> {
        debug!("Setting preference {} for user {}", name, user_id);
        self.repository.set_preference(user_id, name, data).await
    }
}
