use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;

use super::budgets_model::{
    spent_percentage, Budget, BudgetDetail, BudgetIndex, BudgetOverview, BudgetUpdate,
    LimitAmountUpdate, NewBudget,
};
use super::budgets_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
use crate::constants::{
    BUDGET_INCOME_TOTAL_PREFIX, BUDGET_MAXIMUM_KEY, DEFAULT_PREFERENCE_AMOUNT,
    MAX_BUDGET_NAME_LENGTH,
};
use crate::errors::{Error, Result, ValidationError};
use crate::journals::Journal;
use crate::preferences::{Preference, PreferenceServiceTrait};
use crate::utils::time_utils::{month_year_label, period_key};

pub struct BudgetService {
    budget_repository: Arc<dyn BudgetRepositoryTrait>,
    preference_service: Arc<dyn PreferenceServiceTrait>,
}

impl BudgetService {
    pub fn new(
        budget_repository: Arc<dyn BudgetRepositoryTrait>,
        preference_service: Arc<dyn PreferenceServiceTrait>,
    ) -> Self {
        BudgetService {
            budget_repository,
            preference_service,
        }
    }

    fn income_key(period: NaiveDate) -> String {
        format!("{}{}", BUDGET_INCOME_TOTAL_PREFIX, period_key(period))
    }

    fn validate_name(name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if name.chars().count() > MAX_BUDGET_NAME_LENGTH {
            return Err(ValidationError::InvalidInput(format!(
                "Budget name must be at most {} characters",
                MAX_BUDGET_NAME_LENGTH
            ))
            .into());
        }
        Ok(name.to_string())
    }
}

#[async_trait]
impl BudgetServiceTrait for BudgetService {
    async fn get_budget_index(&self, user_id: i32, period: NaiveDate) -> Result<BudgetIndex> {
        let active = self.budget_repository.get_active_budgets(user_id)?;
        let inactive = self.budget_repository.get_inactive_budgets(user_id)?;

        let removed = self.budget_repository.cleanup_budgets().await?;
        debug!("Budget cleanup removed {} orphaned limits", removed);

        let mut budgets = Vec::with_capacity(active.len());
        let mut spent = Decimal::ZERO;
        for budget in active {
            let budget_spent = self
                .budget_repository
                .spent_in_month(budget.id, period)?
                .abs();
            let current_repetition = self
                .budget_repository
                .get_current_repetition(budget.id, period)?;
            spent += budget_spent;
            budgets.push(BudgetOverview {
                budget,
                spent: budget_spent,
                current_repetition,
            });
        }

        let amount = self
            .preference_service
            .get(user_id, &Self::income_key(period), DEFAULT_PREFERENCE_AMOUNT)?
            .data;
        let target = Decimal::from(amount);
        let budget_maximum = self
            .preference_service
            .get(user_id, BUDGET_MAXIMUM_KEY, DEFAULT_PREFERENCE_AMOUNT)?
            .data;

        Ok(BudgetIndex {
            budgets,
            inactive,
            spent,
            amount,
            overspent: spent > target,
            spent_pct: spent_percentage(spent, target),
            budget_maximum,
        })
    }

    fn get_budget(&self, user_id: i32, budget_id: i32) -> Result<Budget> {
        match self.budget_repository.find_budget(budget_id)? {
            Some(budget) if budget.user_id == user_id => Ok(budget),
            _ => Err(Error::not_found(format!("Budget {}", budget_id))),
        }
    }

    async fn create_budget(&self, new_budget: NewBudget) -> Result<Budget> {
        let name = Self::validate_name(&new_budget.name)?;
        let budget = self
            .budget_repository
            .store(NewBudget { name, ..new_budget })
            .await?;
        info!("Created budget {} ({})", budget.id, budget.name);
        Ok(budget)
    }

    async fn update_budget(
        &self,
        user_id: i32,
        budget_id: i32,
        update: BudgetUpdate,
    ) -> Result<Budget> {
        self.get_budget(user_id, budget_id)?;
        let name = Self::validate_name(&update.name)?;
        let budget = self
            .budget_repository
            .update(budget_id, BudgetUpdate { name, ..update })
            .await?;
        info!("Updated budget {} ({})", budget.id, budget.name);
        Ok(budget)
    }

    async fn delete_budget(&self, user_id: i32, budget_id: i32) -> Result<Budget> {
        let budget = self.get_budget(user_id, budget_id)?;
        self.budget_repository.destroy(budget_id).await?;
        info!("Deleted budget {} ({})", budget.id, budget.name);
        Ok(budget)
    }

    fn get_budget_detail(
        &self,
        user_id: i32,
        budget_id: i32,
        repetition_id: Option<i32>,
        page: i64,
    ) -> Result<BudgetDetail> {
        let budget = self.get_budget(user_id, budget_id)?;

        let selected = match repetition_id {
            Some(rid) => {
                let (repetition, limit) = self
                    .budget_repository
                    .find_repetition(rid)?
                    .ok_or_else(|| Error::not_found(format!("Limit repetition {}", rid)))?;
                if limit.budget_id != budget.id {
                    return Err(ValidationError::InvalidSelection(format!(
                        "repetition {} does not belong to budget {}",
                        rid, budget.id
                    ))
                    .into());
                }
                Some((repetition, limit))
            }
            None => None,
        };

        let journals = self.budget_repository.get_journals(
            budget.id,
            selected.as_ref().map(|(repetition, _)| repetition),
            page.max(1),
        )?;

        let (repetition, limits, sub_title) = match selected {
            Some((repetition, limit)) => {
                let sub_title = format!(
                    "{} in {}",
                    budget.name,
                    month_year_label(repetition.startdate)
                );
                (Some(repetition), vec![limit], sub_title)
            }
            None => (
                None,
                self.budget_repository.get_budget_limits(budget.id)?,
                budget.name.clone(),
            ),
        };

        Ok(BudgetDetail {
            budget,
            repetition,
            journals,
            limits,
            sub_title,
        })
    }

    fn get_journals_without_budget(
        &self,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Journal>> {
        self.budget_repository.get_without_budget(user_id, start, end)
    }

    fn get_income_target(&self, user_id: i32, period: NaiveDate) -> Result<Preference> {
        self.preference_service.get(
            user_id,
            &Self::income_key(period),
            DEFAULT_PREFERENCE_AMOUNT,
        )
    }

    async fn set_income_target(
        &self,
        user_id: i32,
        period: NaiveDate,
        amount: i64,
    ) -> Result<Preference> {
        let key = Self::income_key(period);
        info!("Setting income target {} to {}", key, amount);
        self.preference_service.set(user_id, &key, amount).await
    }

    async fn set_limit_amount(
        &self,
        user_id: i32,
        budget_id: i32,
        period: NaiveDate,
        amount: Decimal,
    ) -> Result<LimitAmountUpdate> {
        let budget = self.get_budget(user_id, budget_id)?;
        let repetition = self
            .budget_repository
            .update_limit_amount(budget.id, period, amount)
            .await?;
        info!(
            "Set limit of budget {} for {} to {}",
            budget.id, period, amount
        );
        Ok(LimitAmountUpdate { budget, repetition })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budgets::{BudgetLimit, LimitRepetition};
    use crate::journals::JournalType;
    use crate::preferences::PreferenceService;
    use crate::preferences::PreferenceRepositoryTrait;
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn budget(id: i32, user_id: i32, name: &str, active: bool) -> Budget {
        Budget {
            id,
            user_id,
            name: name.to_string(),
            active,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[derive(Default)]
    struct MockBudgetRepository {
        budgets: Mutex<Vec<Budget>>,
        limits: Mutex<Vec<BudgetLimit>>,
        repetitions: Mutex<Vec<LimitRepetition>>,
        spent: Mutex<HashMap<i32, Decimal>>,
        journals: Mutex<Vec<Journal>>,
        cleanup_calls: Mutex<usize>,
        mutations: Mutex<Vec<String>>,
        limit_amount_calls: Mutex<Vec<(i32, NaiveDate, Decimal)>>,
    }

    impl MockBudgetRepository {
        fn with_budgets(budgets: Vec<Budget>) -> Self {
            let repo = Self::default();
            *repo.budgets.lock().unwrap() = budgets;
            repo
        }

        fn mutation_count(&self) -> usize {
            self.mutations.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl BudgetRepositoryTrait for MockBudgetRepository {
        fn find_budget(&self, budget_id: i32) -> Result<Option<Budget>> {
            Ok(self
                .budgets
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.id == budget_id)
                .cloned())
        }

        fn find_repetition(
            &self,
            repetition_id: i32,
        ) -> Result<Option<(LimitRepetition, BudgetLimit)>> {
            let repetitions = self.repetitions.lock().unwrap();
            let limits = self.limits.lock().unwrap();
            Ok(repetitions
                .iter()
                .find(|r| r.id == repetition_id)
                .and_then(|r| {
                    limits
                        .iter()
                        .find(|l| l.id == r.budget_limit_id)
                        .map(|l| (r.clone(), l.clone()))
                }))
        }

        fn get_active_budgets(&self, user_id: i32) -> Result<Vec<Budget>> {
            Ok(self
                .budgets
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.user_id == user_id && b.active)
                .cloned()
                .collect())
        }

        fn get_inactive_budgets(&self, user_id: i32) -> Result<Vec<Budget>> {
            Ok(self
                .budgets
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.user_id == user_id && !b.active)
                .cloned()
                .collect())
        }

        async fn cleanup_budgets(&self) -> Result<usize> {
            *self.cleanup_calls.lock().unwrap() += 1;
            Ok(0)
        }

        fn spent_in_month(&self, budget_id: i32, _date: NaiveDate) -> Result<Decimal> {
            Ok(self
                .spent
                .lock()
                .unwrap()
                .get(&budget_id)
                .copied()
                .unwrap_or_default())
        }

        fn get_current_repetition(
            &self,
            budget_id: i32,
            date: NaiveDate,
        ) -> Result<Option<LimitRepetition>> {
            let limits = self.limits.lock().unwrap();
            Ok(self
                .repetitions
                .lock()
                .unwrap()
                .iter()
                .find(|r| {
                    r.startdate == date
                        && limits
                            .iter()
                            .any(|l| l.id == r.budget_limit_id && l.budget_id == budget_id)
                })
                .cloned())
        }

        fn get_without_budget(
            &self,
            user_id: i32,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<Journal>> {
            Ok(self
                .journals
                .lock()
                .unwrap()
                .iter()
                .filter(|j| {
                    j.user_id == user_id
                        && j.budget_id.is_none()
                        && j.date >= start
                        && j.date <= end
                })
                .cloned()
                .collect())
        }

        fn get_journals(
            &self,
            budget_id: i32,
            repetition: Option<&LimitRepetition>,
            _page: i64,
        ) -> Result<Vec<Journal>> {
            Ok(self
                .journals
                .lock()
                .unwrap()
                .iter()
                .filter(|j| j.budget_id == Some(budget_id))
                .filter(|j| {
                    repetition
                        .map(|r| j.date >= r.startdate && j.date <= r.enddate)
                        .unwrap_or(true)
                })
                .cloned()
                .collect())
        }

        fn get_budget_limits(&self, budget_id: i32) -> Result<Vec<BudgetLimit>> {
            Ok(self
                .limits
                .lock()
                .unwrap()
                .iter()
                .filter(|l| l.budget_id == budget_id)
                .cloned()
                .collect())
        }

        async fn store(&self, new_budget: NewBudget) -> Result<Budget> {
            self.mutations.lock().unwrap().push("store".to_string());
            let mut budgets = self.budgets.lock().unwrap();
            let created = budget(
                budgets.len() as i32 + 1,
                new_budget.user_id,
                &new_budget.name,
                true,
            );
            budgets.push(created.clone());
            Ok(created)
        }

        async fn update(&self, budget_id: i32, update: BudgetUpdate) -> Result<Budget> {
            self.mutations.lock().unwrap().push("update".to_string());
            let mut budgets = self.budgets.lock().unwrap();
            let existing = budgets
                .iter_mut()
                .find(|b| b.id == budget_id)
                .ok_or_else(|| Error::not_found("budget"))?;
            existing.name = update.name;
            existing.active = update.active;
            Ok(existing.clone())
        }

        async fn destroy(&self, budget_id: i32) -> Result<usize> {
            self.mutations.lock().unwrap().push("destroy".to_string());
            let mut budgets = self.budgets.lock().unwrap();
            let before = budgets.len();
            budgets.retain(|b| b.id != budget_id);
            Ok(before - budgets.len())
        }

        async fn update_limit_amount(
            &self,
            budget_id: i32,
            date: NaiveDate,
            amount: Decimal,
        ) -> Result<Option<LimitRepetition>> {
            self.limit_amount_calls
                .lock()
                .unwrap()
                .push((budget_id, date, amount));
            if amount <= Decimal::ZERO {
                return Ok(None);
            }
            Ok(Some(LimitRepetition {
                id: 42,
                budget_limit_id: 1,
                startdate: date,
                enddate: crate::utils::time_utils::end_of_month(date),
                amount,
            }))
        }
    }

    #[derive(Default)]
    struct MockPreferenceRepository {
        values: Mutex<HashMap<(i32, String), i64>>,
    }

    #[async_trait]
    impl PreferenceRepositoryTrait for MockPreferenceRepository {
        fn get_preference(&self, user_id: i32, name: &str) -> Result<Option<Preference>> {
            Ok(self
                .values
                .lock()
                .unwrap()
                .get(&(user_id, name.to_string()))
                .map(|data| Preference {
                    name: name.to_string(),
                    data: *data,
                }))
        }

        async fn set_preference(&self, user_id: i32, name: &str, data: i64) -> Result<Preference> {
            self.values
                .lock()
                .unwrap()
                .insert((user_id, name.to_string()), data);
            Ok(Preference {
                name: name.to_string(),
                data,
            })
        }
    }

    fn service(repo: Arc<MockBudgetRepository>) -> BudgetService {
        let preferences = Arc::new(PreferenceService::new(Arc::new(
            MockPreferenceRepository::default(),
        )));
        BudgetService::new(repo, preferences)
    }

    fn seeded_repository() -> Arc<MockBudgetRepository> {
        let repo = MockBudgetRepository::with_budgets(vec![
            budget(1, 1, "Groceries", true),
            budget(2, 1, "Rent", true),
            budget(3, 1, "Old hobby", false),
            budget(4, 2, "Someone else's", true),
        ]);
        repo.spent.lock().unwrap().insert(1, dec!(250));
        repo.spent.lock().unwrap().insert(2, dec!(500));
        repo.limits.lock().unwrap().extend([
            BudgetLimit {
                id: 10,
                budget_id: 1,
                startdate: date(2024, 3, 1),
                amount: dec!(300),
                repeats: false,
                repeat_freq: "monthly".to_string(),
            },
            BudgetLimit {
                id: 11,
                budget_id: 2,
                startdate: date(2024, 3, 1),
                amount: dec!(800),
                repeats: false,
                repeat_freq: "monthly".to_string(),
            },
        ]);
        repo.repetitions.lock().unwrap().extend([
            LimitRepetition {
                id: 100,
                budget_limit_id: 10,
                startdate: date(2024, 3, 1),
                enddate: date(2024, 3, 31),
                amount: dec!(300),
            },
            LimitRepetition {
                id: 101,
                budget_limit_id: 11,
                startdate: date(2024, 3, 1),
                enddate: date(2024, 3, 31),
                amount: dec!(800),
            },
        ]);
        repo.journals.lock().unwrap().extend([
            Journal {
                id: 1,
                user_id: 1,
                budget_id: Some(1),
                description: "Market".to_string(),
                journal_type: JournalType::Withdrawal,
                amount: dec!(250),
                date: date(2024, 3, 5),
            },
            Journal {
                id: 2,
                user_id: 1,
                budget_id: Some(1),
                description: "February market".to_string(),
                journal_type: JournalType::Withdrawal,
                amount: dec!(80),
                date: date(2024, 2, 12),
            },
            Journal {
                id: 3,
                user_id: 1,
                budget_id: None,
                description: "Coffee".to_string(),
                journal_type: JournalType::Withdrawal,
                amount: dec!(4),
                date: date(2024, 3, 9),
            },
        ]);
        Arc::new(repo)
    }

    #[tokio::test]
    async fn index_aggregates_spend_against_default_target() {
        let repo = seeded_repository();
        let service = service(repo.clone());

        let index = service.get_budget_index(1, date(2024, 3, 1)).await.unwrap();

        assert_eq!(index.budgets.len(), 2);
        assert_eq!(index.inactive.len(), 1);
        assert_eq!(index.spent, dec!(750));
        assert_eq!(index.amount, 1000);
        assert_eq!(index.budget_maximum, 1000);
        assert!(!index.overspent);
        assert_eq!(index.spent_pct, dec!(75));
        assert_eq!(*repo.cleanup_calls.lock().unwrap(), 1);

        let groceries = &index.budgets[0];
        assert_eq!(groceries.spent, dec!(250));
        assert_eq!(groceries.current_repetition.as_ref().map(|r| r.id), Some(100));
    }

    #[tokio::test]
    async fn index_flips_percentage_when_overspent() {
        let repo = seeded_repository();
        let service = service(repo);
        service
            .set_income_target(1, date(2024, 3, 1), 500)
            .await
            .unwrap();

        let index = service.get_budget_index(1, date(2024, 3, 1)).await.unwrap();

        assert!(index.overspent);
        assert_eq!(index.amount, 500);
        assert_eq!(index.spent_pct, dec!(67));
    }

    #[tokio::test]
    async fn index_reports_spend_as_a_magnitude() {
        let repo = seeded_repository();
        repo.spent.lock().unwrap().insert(2, dec!(-500));
        let service = service(repo);

        let index = service.get_budget_index(1, date(2024, 3, 1)).await.unwrap();

        assert!(index.budgets.iter().all(|b| b.spent >= Decimal::ZERO));
        assert_eq!(index.spent, dec!(750));
    }

    #[tokio::test]
    async fn income_target_is_scoped_to_its_month() {
        let service = service(seeded_repository());

        service
            .set_income_target(1, date(2024, 3, 1), 1500)
            .await
            .unwrap();

        let march = service.get_income_target(1, date(2024, 3, 1)).unwrap();
        assert_eq!(march.name, "budgetIncomeTotalMarch2024");
        assert_eq!(march.data, 1500);
        assert_eq!(service.get_income_target(1, date(2024, 4, 1)).unwrap().data, 1000);
    }

    #[test]
    fn detail_rejects_repetition_of_another_budget() {
        let repo = seeded_repository();
        let service = service(repo.clone());

        let err = service.get_budget_detail(1, 1, Some(101), 1).unwrap_err();

        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidSelection(_))
        ));
        assert_eq!(repo.mutation_count(), 0);
    }

    #[test]
    fn detail_narrows_to_the_selected_repetition() {
        let service = service(seeded_repository());

        let detail = service.get_budget_detail(1, 1, Some(100), 1).unwrap();

        assert_eq!(detail.sub_title, "Groceries in March 2024");
        assert_eq!(detail.limits.len(), 1);
        assert_eq!(detail.limits[0].id, 10);
        assert_eq!(detail.journals.len(), 1);
        assert_eq!(detail.repetition.map(|r| r.id), Some(100));
    }

    #[test]
    fn detail_without_repetition_lists_all_limits() {
        let service = service(seeded_repository());

        let detail = service.get_budget_detail(1, 1, None, 1).unwrap();

        assert_eq!(detail.sub_title, "Groceries");
        assert!(detail.repetition.is_none());
        assert_eq!(detail.journals.len(), 2);
        assert_eq!(detail.limits.len(), 1);
    }

    #[test]
    fn detail_of_unknown_repetition_is_not_found() {
        let service = service(seeded_repository());

        let err = service.get_budget_detail(1, 1, Some(999), 1).unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn budgets_of_other_users_are_not_found() {
        let service = service(seeded_repository());

        assert!(service.get_budget(1, 4).unwrap_err().is_not_found());
        assert!(service.get_budget(1, 99).unwrap_err().is_not_found());
        assert_eq!(service.get_budget(2, 4).unwrap().name, "Someone else's");
    }

    #[tokio::test]
    async fn set_limit_amount_delegates_once() {
        let repo = MockBudgetRepository::with_budgets(vec![budget(7, 1, "Transport", true)]);
        let repo = Arc::new(repo);
        let service = service(repo.clone());

        let result = service
            .set_limit_amount(1, 7, date(2024, 3, 1), dec!(250))
            .await
            .unwrap();

        assert_eq!(result.budget.name, "Transport");
        assert_eq!(result.repetition_id(), 42);
        assert_eq!(
            *repo.limit_amount_calls.lock().unwrap(),
            vec![(7, date(2024, 3, 1), dec!(250))]
        );
    }

    #[tokio::test]
    async fn zero_limit_amount_reports_no_repetition() {
        let repo = Arc::new(MockBudgetRepository::with_budgets(vec![budget(
            7,
            1,
            "Transport",
            true,
        )]));
        let service = service(repo);

        let result = service
            .set_limit_amount(1, 7, date(2024, 3, 1), Decimal::ZERO)
            .await
            .unwrap();

        assert_eq!(result.repetition_id(), 0);
    }

    #[tokio::test]
    async fn create_trims_and_validates_name() {
        let repo = Arc::new(MockBudgetRepository::default());
        let service = service(repo.clone());

        let created = service
            .create_budget(NewBudget {
                user_id: 1,
                name: "  Holidays ".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Holidays");
        assert!(created.active);

        let err = service
            .create_budget(NewBudget {
                user_id: 1,
                name: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField(_))
        ));

        let err = service
            .create_budget(NewBudget {
                user_id: 1,
                name: "x".repeat(101),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidInput(_))
        ));
        assert_eq!(repo.mutation_count(), 1);
    }

    #[tokio::test]
    async fn update_changes_name_and_active_flag() {
        let service = service(seeded_repository());

        let updated = service
            .update_budget(
                1,
                1,
                BudgetUpdate {
                    name: "Food".to_string(),
                    active: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Food");
        assert!(!updated.active);
    }

    #[tokio::test]
    async fn delete_returns_the_original_budget() {
        let repo = seeded_repository();
        let service = service(repo.clone());

        let deleted = service.delete_budget(1, 2).await.unwrap();

        assert_eq!(deleted.name, "Rent");
        assert!(repo.find_budget(2).unwrap().is_none());
    }

    #[test]
    fn journals_without_budget_respect_the_range() {
        let service = service(seeded_repository());

        let list = service
            .get_journals_without_budget(1, date(2024, 3, 1), date(2024, 3, 31))
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].description, "Coffee");

        let empty = service
            .get_journals_without_budget(1, date(2024, 4, 1), date(2024, 4, 30))
            .unwrap();
        assert!(empty.is_empty());
    }
}
