//! SQLite storage for budgets, their limits and limit repetitions.

mod model;
mod repository;

pub use model::{
    BudgetDB, BudgetLimitDB, LimitRepetitionDB, NewBudgetDB, NewBudgetLimitDB,
    NewLimitRepetitionDB,
};
pub use repository::BudgetRepository;

pub use budgetbook_core::budgets::BudgetRepositoryTrait;
