//! Budgets module - domain models, services, and traits.

mod budgets_model;
mod budgets_service;
mod budgets_traits;

pub use budgets_model::{
    spent_percentage, Budget, BudgetDetail, BudgetIndex, BudgetLimit, BudgetOverview,
    BudgetUpdate, LimitAmountUpdate, LimitRepetition, NewBudget,
};
pub use budgets_service::BudgetService;
pub use budgets_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
