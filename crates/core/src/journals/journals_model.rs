use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of ledger entry. Only withdrawals count as budget spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalType {
    Withdrawal,
    Deposit,
    Transfer,
}

impl JournalType {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            JournalType::Withdrawal => "withdrawal",
            JournalType::Deposit => "deposit",
            JournalType::Transfer => "transfer",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "withdrawal" => Some(JournalType::Withdrawal),
            "deposit" => Some(JournalType::Deposit),
            "transfer" => Some(JournalType::Transfer),
            _ => None,
        }
    }
}

/// A transaction journal, optionally linked to a budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Journal {
    pub id: i32,
    pub user_id: i32,
    pub budget_id: Option<i32>,
    pub description: String,
    pub journal_type: JournalType,
    pub amount: Decimal,
    pub date: NaiveDate,
}
