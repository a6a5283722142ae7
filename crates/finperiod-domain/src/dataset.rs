//! Serializable snapshot of every record a store holds.

use serde::{Deserialize, Serialize};

use crate::{budget::Budget, expense::Expense, user::User};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    #[serde(default = "Dataset::default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl Dataset {
    pub fn default_schema_version() -> u32 {
        CURRENT_SCHEMA_VERSION
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            users: Vec::new(),
            budgets: Vec::new(),
            expenses: Vec::new(),
        }
    }
}
