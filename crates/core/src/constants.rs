/// Value returned for a preference the user never set.
pub const DEFAULT_PREFERENCE_AMOUNT: i64 = 1000;

/// Prefix of the per-month income target preference; the month key follows it.
pub const BUDGET_INCOME_TOTAL_PREFIX: &str = "budgetIncomeTotal";

/// Preference holding the budget ceiling shown on the overview.
pub const BUDGET_MAXIMUM_KEY: &str = "budgetMaximum";

/// Journals shown per page on the budget detail view
pub const JOURNALS_PER_PAGE: i64 = 50;

/// Longest accepted budget name
pub const MAX_BUDGET_NAME_LENGTH: usize = 100;

/// Limits created from the overview always repeat monthly.
pub const MONTHLY_REPEAT_FREQ: &str = "monthly";
