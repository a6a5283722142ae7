//! Users and their period preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::Identifiable, period::PeriodStartDay};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub period_start_day: PeriodStartDay,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            period_start_day: PeriodStartDay::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_start_day(mut self, day: PeriodStartDay) -> Self {
        self.period_start_day = day;
        self
    }

    pub fn set_period_start_day(&mut self, day: PeriodStartDay) {
        self.period_start_day = day;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for User {
    fn id(&self) -> Uuid {
        self.id
    }
}
