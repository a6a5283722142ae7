use finperiod_domain::{Period, PeriodError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid period format: `{0}` (expected YYYY-MM)")]
    InvalidPeriodFormat(String),
    #[error("Invalid period start day {0}: must be between 1 and 28")]
    InvalidPeriodStartDay(u32),
    #[error("User not found: {0}")]
    UserNotFound(Uuid),
    #[error("Budget not found: {0}")]
    BudgetNotFound(Uuid),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(Uuid),
    #[error("{entity} {id} is not owned by user {user_id}")]
    NotOwnedByUser {
        entity: &'static str,
        id: Uuid,
        user_id: Uuid,
    },
    #[error("Budget for `{category}` already exists in {period}")]
    DuplicateBudgetForPeriod { category: String, period: Period },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<PeriodError> for CoreError {
    fn from(err: PeriodError) -> Self {
        match err {
            PeriodError::InvalidFormat(raw) => CoreError::InvalidPeriodFormat(raw),
            PeriodError::InvalidStartDay(day) => CoreError::InvalidPeriodStartDay(day),
        }
    }
}
