//! Database models for transaction journals.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::errors::StorageError;
use budgetbook_core::journals::{Journal, JournalType};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::transaction_journals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JournalDB {
    pub id: i32,
    pub user_id: i32,
    pub budget_id: Option<i32>,
    pub description: String,
    pub journal_type: String,
    pub amount: String,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::transaction_journals)]
pub struct NewJournalDB {
    pub user_id: i32,
    pub budget_id: Option<i32>,
    pub description: String,
    pub journal_type: String,
    pub amount: String,
    pub date: NaiveDate,
}

impl TryFrom<JournalDB> for Journal {
    type Error = StorageError;

    fn try_from(db: JournalDB) -> Result<Self, Self::Error> {
        let journal_type = JournalType::from_db_str(&db.journal_type).ok_or_else(|| {
            StorageError::MalformedValue(format!(
                "journal {} has unknown type '{}'",
                db.id, db.journal_type
            ))
        })?;
        let amount = Decimal::from_str(&db.amount).map_err(|e| {
            StorageError::MalformedValue(format!("journal {} amount '{}': {}", db.id, db.amount, e))
        })?;

        Ok(Journal {
            id: db.id,
            user_id: db.user_id,
            budget_id: db.budget_id,
            description: db.description,
            journal_type,
            amount,
            date: db.date,
        })
    }
}

impl From<&Journal> for NewJournalDB {
    fn from(journal: &Journal) -> Self {
        NewJournalDB {
            user_id: journal.user_id,
            budget_id: journal.budget_id,
            description: journal.description.clone(),
            journal_type: journal.journal_type.as_db_str().to_string(),
            amount: journal.amount.to_string(),
            date: journal.date,
        }
    }
}

/// Converts loaded rows, failing on the first malformed one.
pub(crate) fn into_journals(rows: Vec<JournalDB>) -> Result<Vec<Journal>, StorageError> {
    rows.into_iter().map(Journal::try_from).collect()
}
