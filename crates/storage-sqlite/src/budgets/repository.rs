use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::model::{
    parse_stored_amount, BudgetDB, BudgetLimitDB, LimitRepetitionDB, NewBudgetDB,
    NewBudgetLimitDB, NewLimitRepetitionDB,
};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::journals::model::into_journals;
use crate::journals::JournalDB;
use crate::schema::{budget_limits, budgets, limit_repetitions, transaction_journals};
use budgetbook_core::budgets::{
    Budget, BudgetLimit, BudgetRepositoryTrait, BudgetUpdate, LimitRepetition, NewBudget,
};
use budgetbook_core::constants::{JOURNALS_PER_PAGE, MONTHLY_REPEAT_FREQ};
use budgetbook_core::errors::{Result, ValidationError};
use budgetbook_core::journals::{Journal, JournalType};
use budgetbook_core::utils::time_utils::{end_of_month, start_of_month};

pub struct BudgetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl BudgetRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        BudgetRepository { pool, writer }
    }

    fn load_budgets(&self, user_id: i32, active: bool) -> Result<Vec<Budget>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = budgets::table
            .filter(budgets::user_id.eq(user_id))
            .filter(budgets::active.eq(active))
            .order((budgets::name.asc(), budgets::id.asc()))
            .select(BudgetDB::as_select())
            .load::<BudgetDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Budget::from).collect())
    }
}

/// Writes the limit starting on `date` and its repetition for that month,
/// creating either one when missing.
fn upsert_limit(
    conn: &mut SqliteConnection,
    budget_id: i32,
    date: NaiveDate,
    amount: &str,
) -> std::result::Result<LimitRepetitionDB, StorageError> {
    let now = Utc::now().naive_utc();

    let existing_limit = budget_limits::table
        .filter(budget_limits::budget_id.eq(budget_id))
        .filter(budget_limits::startdate.eq(date))
        .select(BudgetLimitDB::as_select())
        .first::<BudgetLimitDB>(conn)
        .optional()?;

    let limit = match existing_limit {
        Some(limit) => diesel::update(budget_limits::table.find(limit.id))
            .set((
                budget_limits::amount.eq(amount),
                budget_limits::updated_at.eq(now),
            ))
            .returning(BudgetLimitDB::as_returning())
            .get_result(conn)?,
        None => diesel::insert_into(budget_limits::table)
            .values(&NewBudgetLimitDB {
                budget_id,
                startdate: date,
                amount: amount.to_string(),
                repeats: false,
                repeat_freq: MONTHLY_REPEAT_FREQ.to_string(),
                created_at: now,
                updated_at: now,
            })
            .returning(BudgetLimitDB::as_returning())
            .get_result(conn)?,
    };

    let existing_repetition = limit_repetitions::table
        .filter(limit_repetitions::budget_limit_id.eq(limit.id))
        .filter(limit_repetitions::startdate.eq(date))
        .select(LimitRepetitionDB::as_select())
        .first::<LimitRepetitionDB>(conn)
        .optional()?;

    let repetition = match existing_repetition {
        Some(repetition) => diesel::update(limit_repetitions::table.find(repetition.id))
            .set((
                limit_repetitions::amount.eq(amount),
                limit_repetitions::updated_at.eq(now),
            ))
            .returning(LimitRepetitionDB::as_returning())
            .get_result(conn)?,
        None => diesel::insert_into(limit_repetitions::table)
            .values(&NewLimitRepetitionDB {
                budget_limit_id: limit.id,
                startdate: date,
                enddate: end_of_month(date),
                amount: amount.to_string(),
                created_at: now,
                updated_at: now,
            })
            .returning(LimitRepetitionDB::as_returning())
            .get_result(conn)?,
    };

    Ok(repetition)
}

#[async_trait]
impl BudgetRepositoryTrait for BudgetRepository {
    fn find_budget(&self, budget_id: i32) -> Result<Option<Budget>> {
        let mut conn = get_connection(&self.pool)?;
        let row = budgets::table
            .find(budget_id)
            .select(BudgetDB::as_select())
            .first::<BudgetDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Budget::from))
    }

    fn find_repetition(
        &self,
        repetition_id: i32,
    ) -> Result<Option<(LimitRepetition, BudgetLimit)>> {
        let mut conn = get_connection(&self.pool)?;
        let row = limit_repetitions::table
            .inner_join(budget_limits::table)
            .filter(limit_repetitions::id.eq(repetition_id))
            .select((LimitRepetitionDB::as_select(), BudgetLimitDB::as_select()))
            .first::<(LimitRepetitionDB, BudgetLimitDB)>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        match row {
            Some((repetition, limit)) => Ok(Some((
                LimitRepetition::try_from(repetition)?,
                BudgetLimit::try_from(limit)?,
            ))),
            None => Ok(None),
        }
    }

    fn get_active_budgets(&self, user_id: i32) -> Result<Vec<Budget>> {
        self.load_budgets(user_id, true)
    }

    fn get_inactive_budgets(&self, user_id: i32) -> Result<Vec<Budget>> {
        self.load_budgets(user_id, false)
    }

    async fn cleanup_budgets(&self) -> Result<usize> {
        self.writer
            .exec(|conn| {
                let orphaned = budget_limits::table.filter(diesel::dsl::not(
                    budget_limits::id.eq_any(
                        limit_repetitions::table.select(limit_repetitions::budget_limit_id),
                    ),
                ));
                Ok(diesel::delete(orphaned)
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn spent_in_month(&self, budget_id: i32, date: NaiveDate) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;
        let amounts = transaction_journals::table
            .filter(transaction_journals::budget_id.eq(budget_id))
            .filter(transaction_journals::journal_type.eq(JournalType::Withdrawal.as_db_str()))
            .filter(transaction_journals::date.ge(start_of_month(date)))
            .filter(transaction_journals::date.le(end_of_month(date)))
            .select(transaction_journals::amount)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;

        let mut total = Decimal::ZERO;
        for raw in &amounts {
            total += parse_stored_amount(raw, "journal")?.abs();
        }
        Ok(total)
    }

    fn get_current_repetition(
        &self,
        budget_id: i32,
        date: NaiveDate,
    ) -> Result<Option<LimitRepetition>> {
        let mut conn = get_connection(&self.pool)?;
        let row = limit_repetitions::table
            .inner_join(budget_limits::table)
            .filter(budget_limits::budget_id.eq(budget_id))
            .filter(limit_repetitions::startdate.eq(date))
            .select(LimitRepetitionDB::as_select())
            .first::<LimitRepetitionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(LimitRepetition::try_from).transpose()?)
    }

    fn get_without_budget(
        &self,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Journal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transaction_journals::table
            .filter(transaction_journals::user_id.eq(user_id))
            .filter(transaction_journals::budget_id.is_null())
            .filter(transaction_journals::journal_type.eq(JournalType::Withdrawal.as_db_str()))
            .filter(transaction_journals::date.ge(start))
            .filter(transaction_journals::date.le(end))
            .order((
                transaction_journals::date.desc(),
                transaction_journals::id.desc(),
            ))
            .select(JournalDB::as_select())
            .load::<JournalDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(into_journals(rows)?)
    }

    fn get_journals(
        &self,
        budget_id: i32,
        repetition: Option<&LimitRepetition>,
        page: i64,
    ) -> Result<Vec<Journal>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = transaction_journals::table
            .filter(transaction_journals::budget_id.eq(budget_id))
            .select(JournalDB::as_select())
            .into_boxed();

        if let Some(repetition) = repetition {
            query = query
                .filter(transaction_journals::date.ge(repetition.startdate))
                .filter(transaction_journals::date.le(repetition.enddate));
        }

        let offset = (page.max(1) - 1)
            .checked_mul(JOURNALS_PER_PAGE)
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!("Page {} is out of range", page))
            })?;
        let rows = query
            .order((
                transaction_journals::date.desc(),
                transaction_journals::id.desc(),
            ))
            .limit(JOURNALS_PER_PAGE)
            .offset(offset)
            .load::<JournalDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(into_journals(rows)?)
    }

    fn get_budget_limits(&self, budget_id: i32) -> Result<Vec<BudgetLimit>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = budget_limits::table
            .filter(budget_limits::budget_id.eq(budget_id))
            .order((budget_limits::startdate.desc(), budget_limits::id.desc()))
            .select(BudgetLimitDB::as_select())
            .load::<BudgetLimitDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .map(BudgetLimit::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }

    async fn store(&self, new_budget: NewBudget) -> Result<Budget> {
        let row = NewBudgetDB::from_domain(new_budget, Utc::now().naive_utc());
        self.writer
            .exec(move |conn| {
                let stored = diesel::insert_into(budgets::table)
                    .values(&row)
                    .returning(BudgetDB::as_returning())
                    .get_result::<BudgetDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(Budget::from(stored))
            })
            .await
    }

    async fn update(&self, budget_id: i32, update: BudgetUpdate) -> Result<Budget> {
        self.writer
            .exec(move |conn| {
                let updated = diesel::update(budgets::table.find(budget_id))
                    .set((
                        budgets::name.eq(update.name),
                        budgets::active.eq(update.active),
                        budgets::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .returning(BudgetDB::as_returning())
                    .get_result::<BudgetDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(Budget::from(updated))
            })
            .await
    }

    async fn destroy(&self, budget_id: i32) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                Ok(diesel::delete(budgets::table.find(budget_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    async fn update_limit_amount(
        &self,
        budget_id: i32,
        date: NaiveDate,
        amount: Decimal,
    ) -> Result<Option<LimitRepetition>> {
        self.writer
            .exec(move |conn| {
                if amount <= Decimal::ZERO {
                    let removed = diesel::delete(
                        budget_limits::table
                            .filter(budget_limits::budget_id.eq(budget_id))
                            .filter(budget_limits::startdate.eq(date)),
                    )
                    .execute(conn)
                    .map_err(StorageError::from)?;
                    debug!(
                        "Removed {} limit(s) of budget {} starting {}",
                        removed, budget_id, date
                    );
                    return Ok(None);
                }

                let repetition = upsert_limit(conn, budget_id, date, &amount.to_string())?;
                Ok(Some(LimitRepetition::try_from(repetition)?))
            })
            .await
    }
}
