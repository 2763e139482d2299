//! Database models for preferences.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::errors::StorageError;
use budgetbook_core::preferences::Preference;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::preferences)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PreferenceDB {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub data: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::preferences)]
pub struct NewPreferenceDB {
    pub user_id: i32,
    pub name: String,
    pub data: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<PreferenceDB> for Preference {
    type Error = StorageError;

    fn try_from(db: PreferenceDB) -> Result<Self, Self::Error> {
        let data = db.data.trim().parse::<i64>().map_err(|e| {
            StorageError::MalformedValue(format!(
                "preference {} holds '{}': {}",
                db.name, db.data, e
            ))
        })?;
        Ok(Preference { name: db.name, data })
    }
}
