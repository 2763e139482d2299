//! Budgets domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::journals::Journal;

/// Domain model representing a budget (a named spending category)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new budget
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub user_id: i32,
    pub name: String,
}

/// Input model for updating an existing budget
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    pub name: String,
    pub active: bool,
}

/// Spending ceiling of a budget starting at a given date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLimit {
    pub id: i32,
    pub budget_id: i32,
    pub startdate: NaiveDate,
    pub amount: Decimal,
    pub repeats: bool,
    pub repeat_freq: String,
}

/// One concrete period of a budget limit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LimitRepetition {
    pub id: i32,
    pub budget_limit_id: i32,
    pub startdate: NaiveDate,
    pub enddate: NaiveDate,
    pub amount: Decimal,
}

/// An active budget with its figures for the selected period
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverview {
    #[serde(flatten)]
    pub budget: Budget,
    pub spent: Decimal,
    pub current_repetition: Option<LimitRepetition>,
}

/// Everything the budget overview page shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetIndex {
    pub budgets: Vec<BudgetOverview>,
    pub inactive: Vec<Budget>,
    pub spent: Decimal,
    /// Income target for the period
    pub amount: i64,
    pub overspent: bool,
    pub spent_pct: Decimal,
    pub budget_maximum: i64,
}

/// A budget with its journals and limits, optionally narrowed to one repetition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDetail {
    pub budget: Budget,
    pub repetition: Option<LimitRepetition>,
    pub journals: Vec<Journal>,
    pub limits: Vec<BudgetLimit>,
    pub sub_title: String,
}

/// Result of setting a budget's limit amount for a period
#[derive(Debug, Clone)]
pub struct LimitAmountUpdate {
    pub budget: Budget,
    pub repetition: Option<LimitRepetition>,
}

impl LimitAmountUpdate {
    /// Id of the affected repetition, 0 when the limit was removed or never created.
    pub fn repetition_id(&self) -> i32 {
        self.repetition.as_ref().map(|r| r.id).unwrap_or(0)
    }
}

/// Share of the income target that has been spent, in whole percent rounded up.
///
/// When spend exceeds the target the ratio flips to `target / spent` so the bar
/// shows how much of the spend the target covers. A zero or negative divisor
/// yields 0, and the result is never negative.
pub fn spent_percentage(spent: Decimal, target: Decimal) -> Decimal {
    let (numerator, denominator) = if spent > target {
        (target, spent)
    } else {
        (spent, target)
    };
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (numerator / denominator * dec!(100))
        .ceil()
        .max(Decimal::ZERO)
}
