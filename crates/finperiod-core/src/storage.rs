//! Query contracts the engine consumes from the persistence layer.

use chrono::NaiveDate;
use uuid::Uuid;

use finperiod_domain::{Budget, Expense, Period, User};

use crate::CoreError;

/// Lookup and persistence of users.
pub trait UserStore: Send + Sync {
    fn list_users(&self) -> Result<Vec<User>, CoreError>;
    fn find_user(&self, id: Uuid) -> Result<Option<User>, CoreError>;
    /// Inserts the user or replaces the record with the same id.
    fn save_user(&self, user: &User) -> Result<(), CoreError>;
}

/// Budgets keyed by `(user, category, period)`.
pub trait BudgetStore: Send + Sync {
    fn find_budgets(&self, user_id: Uuid, period: Period) -> Result<Vec<Budget>, CoreError>;
    fn find_budget(
        &self,
        user_id: Uuid,
        category: &str,
        period: Period,
    ) -> Result<Option<Budget>, CoreError>;
    fn find_budget_by_id(&self, id: Uuid) -> Result<Option<Budget>, CoreError>;
    /// Inserts a new budget. The existence check and the insert must be atomic:
    /// a second budget for the same `(user, category, period)` fails with
    /// [`CoreError::DuplicateBudgetForPeriod`].
    fn insert_budget(&self, budget: Budget) -> Result<Budget, CoreError>;
    fn update_budget(&self, budget: Budget) -> Result<Budget, CoreError>;
    /// Removes the budget together with every expense recorded against it.
    fn delete_budget(&self, id: Uuid) -> Result<(), CoreError>;
}

pub trait ExpenseStore: Send + Sync {
    fn find_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>, CoreError>;
    fn find_expense_by_id(&self, id: Uuid) -> Result<Option<Expense>, CoreError>;
    fn find_expenses_for_budget(&self, budget_id: Uuid) -> Result<Vec<Expense>, CoreError>;
    fn insert_expense(&self, expense: Expense) -> Result<Expense, CoreError>;
    fn delete_expense(&self, id: Uuid) -> Result<(), CoreError>;

    /// Expenses dated within `[from, to]`, both ends inclusive.
    fn find_expenses_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Expense>, CoreError> {
        Ok(self
            .find_expenses(user_id)?
            .into_iter()
            .filter(|expense| expense.date >= from && expense.date <= to)
            .collect())
    }
}

/// A backend serving every record kind.
pub trait Store: UserStore + BudgetStore + ExpenseStore {}

impl<T: UserStore + BudgetStore + ExpenseStore> Store for T {}

/// Loads a user or fails with [`CoreError::UserNotFound`].
pub fn require_user(users: &dyn UserStore, user_id: Uuid) -> Result<User, CoreError> {
    users
        .find_user(user_id)?
        .ok_or(CoreError::UserNotFound(user_id))
}

/// Detects expenses whose budget is missing or belongs to another user.
pub fn dangling_expenses(budgets: &[Budget], expenses: &[Expense]) -> Vec<String> {
    let mut warnings = Vec::new();
    for expense in expenses {
        match budgets.iter().find(|budget| budget.id == expense.budget_id) {
            None => warnings.push(format!(
                "expense {} references missing budget {}",
                expense.id, expense.budget_id
            )),
            Some(budget) if budget.user_id != expense.user_id => warnings.push(format!(
                "expense {} belongs to user {} but budget {} belongs to user {}",
                expense.id, expense.user_id, budget.id, budget.user_id
            )),
            Some(_) => {}
        }
    }
    warnings
}
