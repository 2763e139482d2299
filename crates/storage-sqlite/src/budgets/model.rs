//! Database models for budgets.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::errors::StorageError;
use budgetbook_core::budgets::{Budget, BudgetLimit, LimitRepetition, NewBudget};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::budgets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BudgetDB {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::budgets)]
pub struct NewBudgetDB {
    pub user_id: i32,
    pub name: String,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::budget_limits)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BudgetLimitDB {
    pub id: i32,
    pub budget_id: i32,
    pub startdate: NaiveDate,
    pub amount: String,
    pub repeats: bool,
    pub repeat_freq: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::budget_limits)]
pub struct NewBudgetLimitDB {
    pub budget_id: i32,
    pub startdate: NaiveDate,
    pub amount: String,
    pub repeats: bool,
    pub repeat_freq: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::limit_repetitions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LimitRepetitionDB {
    pub id: i32,
    pub budget_limit_id: i32,
    pub startdate: NaiveDate,
    pub enddate: NaiveDate,
    pub amount: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::limit_repetitions)]
pub struct NewLimitRepetitionDB {
    pub budget_limit_id: i32,
    pub startdate: NaiveDate,
    pub enddate: NaiveDate,
    pub amount: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

pub(crate) fn parse_stored_amount(raw: &str, what: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(raw)
        .map_err(|e| StorageError::MalformedValue(format!("{} amount '{}': {}", what, raw, e)))
}

impl From<BudgetDB> for Budget {
    fn from(db: BudgetDB) -> Self {
        Budget {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            active: db.active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl NewBudgetDB {
    pub fn from_domain(new_budget: NewBudget, now: NaiveDateTime) -> Self {
        NewBudgetDB {
            user_id: new_budget.user_id,
            name: new_budget.name,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<BudgetLimitDB> for BudgetLimit {
    type Error = StorageError;

    fn try_from(db: BudgetLimitDB) -> Result<Self, Self::Error> {
        Ok(BudgetLimit {
            amount: parse_stored_amount(&db.amount, &format!("budget limit {}", db.id))?,
            id: db.id,
            budget_id: db.budget_id,
            startdate: db.startdate,
            repeats: db.repeats,
            repeat_freq: db.repeat_freq,
        })
    }
}

impl TryFrom<LimitRepetitionDB> for LimitRepetition {
    type Error = StorageError;

    fn try_from(db: LimitRepetitionDB) -> Result<Self, Self::Error> {
        Ok(LimitRepetition {
            amount: parse_stored_amount(&db.amount, &format!("limit repetition {}", db.id))?,
            id: db.id,
            budget_limit_id: db.budget_limit_id,
            startdate: db.startdate,
            enddate: db.enddate,
        })
    }
}
