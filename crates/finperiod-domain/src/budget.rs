//! Per-period category budgets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::{Amounted, Identifiable, Owned},
    period::Period,
};

/// Amount allotted to one category for one user's period.
///
/// `(user_id, category, period)` is unique across the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub amount: f64,
    pub period: Period,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(user_id: Uuid, category: impl Into<String>, amount: f64, period: Period) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            category: category.into(),
            amount,
            period,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fresh budget carrying this category and amount into `period`.
    pub fn carried_into(&self, period: Period) -> Self {
        Self::new(self.user_id, self.category.clone(), self.amount, period)
    }

    /// Returns `true` when both budgets occupy the same uniqueness slot.
    pub fn same_slot(&self, other: &Budget) -> bool {
        self.matches(other.user_id, &other.category, other.period)
    }

    pub fn matches(&self, user_id: Uuid, category: &str, period: Period) -> bool {
        self.user_id == user_id && self.period == period && self.category == category
    }

    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount;
        self.updated_at = Utc::now();
    }
}

impl Identifiable for Budget {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Budget {
    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

impl Amounted for Budget {
    fn amount(&self) -> f64 {
        self.amount
    }
}
