use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::budgets::budgets_model::{
    Budget, BudgetDetail, BudgetIndex, BudgetLimit, BudgetUpdate, LimitAmountUpdate,
    LimitRepetition, NewBudget,
};
use crate::errors::Result;
use crate::journals::Journal;
use crate::preferences::Preference;

/// Trait for budget persistence and read aggregation
#[async_trait]
pub trait BudgetRepositoryTrait: Send + Sync {
    fn find_budget(&self, budget_id: i32) -> Result<Option<Budget>>;

    /// A repetition together with the limit it was created from.
    fn find_repetition(&self, repetition_id: i32)
        -> Result<Option<(LimitRepetition, BudgetLimit)>>;

    fn get_active_budgets(&self, user_id: i32) -> Result<Vec<Budget>>;
    fn get_inactive_budgets(&self, user_id: i32) -> Result<Vec<Budget>>;

    /// Removes limits that never got a repetition. Returns how many were deleted.
    async fn cleanup_budgets(&self) -> Result<usize>;

    /// Withdrawals booked on the budget within the calendar month of `date`.
    fn spent_in_month(&self, budget_id: i32, date: NaiveDate) -> Result<Decimal>;

    /// The budget's repetition starting exactly on `date`.
    fn get_current_repetition(
        &self,
        budget_id: i32,
        date: NaiveDate,
    ) -> Result<Option<LimitRepetition>>;

    fn get_without_budget(
        &self,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Journal>>;

    fn get_journals(
        &self,
        budget_id: i32,
        repetition: Option<&LimitRepetition>,
        page: i64,
    ) -> Result<Vec<Journal>>;

    fn get_budget_limits(&self, budget_id: i32) -> Result<Vec<BudgetLimit>>;

    async fn store(&self, new_budget: NewBudget) -> Result<Budget>;
    async fn update(&self, budget_id: i32, update: BudgetUpdate) -> Result<Budget>;
    async fn destroy(&self, budget_id: i32) -> Result<usize>;

    /// Creates, updates or (for `amount <= 0`) removes the limit starting on
    /// `date`, returning the repetition that now covers the period.
    async fn update_limit_amount(
        &self,
        budget_id: i32,
        date: NaiveDate,
        amount: Decimal,
    ) -> Result<Option<LimitRepetition>>;
}

/// Trait for budget service operations
#[async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    async fn get_budget_index(&self, user_id: i32, period: NaiveDate) -> Result<BudgetIndex>;

    fn get_budget(&self, user_id: i32, budget_id: i32) -> Result<Budget>;

    async fn create_budget(&self, new_budget: NewBudget) -> Result<Budget>;

    async fn update_budget(
        &self,
        user_id: i32,
        budget_id: i32,
        update: BudgetUpdate,
    ) -> Result<Budget>;

    /// Deletes the budget and returns it as it was before deletion.
    async fn delete_budget(&self, user_id: i32, budget_id: i32) -> Result<Budget>;

    fn get_budget_detail(
        &self,
        user_id: i32,
        budget_id: i32,
        repetition_id: Option<i32>,
        page: i64,
    ) -> Result<BudgetDetail>;

    fn get_journals_without_budget(
        &self,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Journal>>;

    fn get_income_target(&self, user_id: i32, period: NaiveDate) -> Result<Preference>;

    async fn set_income_target(
        &self,
        user_id: i32,
        period: NaiveDate,
        amount: i64,
    ) -> Result<Preference>;

    async fn set_limit_amount(
        &self,
        user_id: i32,
        budget_id: i32,
        period: NaiveDate,
        amount: Decimal,
    ) -> Result<LimitAmountUpdate>;
}
