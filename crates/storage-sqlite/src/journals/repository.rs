use diesel::prelude::*;
use std::sync::Arc;

use super::model::{JournalDB, NewJournalDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::transaction_journals;
use budgetbook_core::errors::Result;
use budgetbook_core::journals::Journal;

/// Books journals into the ledger. Budget pages only read journals; this is
/// the entry point for importers and fixtures.
pub struct JournalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl JournalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        JournalRepository { pool, writer }
    }

    /// Inserts `journal` (its id is ignored) and returns the stored row.
    pub async fn create(&self, journal: &Journal) -> Result<Journal> {
        let new_journal = NewJournalDB::from(journal);
        self.writer
            .exec(move |conn| {
                let row = diesel::insert_into(transaction_journals::table)
                    .values(&new_journal)
                    .returning(JournalDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Journal::try_from(row)?)
            })
            .await
    }

    pub fn get_journal(&self, journal_id: i32) -> Result<Option<Journal>> {
        let mut conn = get_connection(&self.pool)?;
        let row = transaction_journals::table
            .find(journal_id)
            .select(JournalDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(Journal::try_from).transpose()?)
    }
}
