use serde::{Deserialize, Serialize};

/// A stored preference value for one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub name: String,
    pub data: i64,
}
