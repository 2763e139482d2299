use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::{NewPreferenceDB, PreferenceDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::preferences;
use budgetbook_core::errors::Result;
use budgetbook_core::preferences::{Preference, PreferenceRepositoryTrait};

pub struct PreferenceRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PreferenceRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PreferenceRepository { pool, writer }
    }
}

#[async_trait]
impl PreferenceRepositoryTrait for PreferenceRepository {
    fn get_preference(&self, user_id: i32, name: &str) -> Result<Option<Preference>> {
        let mut conn = get_connection(&self.pool)?;
        let row = preferences::table
            .filter(preferences::user_id.eq(user_id))
            .filter(preferences::name.eq(name))
            .select(PreferenceDB::as_select())
            .first::<PreferenceDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Preference::try_from).transpose()?)
    }

    async fn set_preference(&self, user_id: i32, name: &str, data: i64) -> Result<Preference> {
        let name = name.to_string();
        self.writer
            .exec(move |conn| {
                let now = Utc::now().naive_utc();
                let existing = preferences::table
                    .filter(preferences::user_id.eq(user_id))
                    .filter(preferences::name.eq(&name))
                    .select(preferences::id)
                    .first::<i32>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                let row = match existing {
                    Some(pref_id) => diesel::update(preferences::table.find(pref_id))
                        .set((
                            preferences::data.eq(data.to_string()),
                            preferences::updated_at.eq(now),
                        ))
                        .returning(PreferenceDB::as_returning())
                        .get_result::<PreferenceDB>(conn),
                    None => diesel::insert_into(preferences::table)
                        .values(&NewPreferenceDB {
                            user_id,
                            name,
                            data: data.to_string(),
                            created_at: now,
                            updated_at: now,
                        })
                        .returning(PreferenceDB::as_returning())
                        .get_result::<PreferenceDB>(conn),
                }
                .map_err(StorageError::from)?;

                Ok(Preference::try_from(row)?)
            })
            .await
    }
}
