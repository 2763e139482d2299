//! HTTP surface of budgetbook: the budget pages, sessions and views.

pub mod api;
pub mod config;
pub mod error;
pub mod main_lib;
pub mod session;
pub mod views;

pub use main_lib::{build_state, init_tracing, AppState};
