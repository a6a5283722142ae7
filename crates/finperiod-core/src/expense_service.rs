use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use finperiod_domain::{Expense, Owned};

use crate::{
    budget_service::{validate_amount, BudgetService},
    storage::{BudgetStore, ExpenseStore},
    CoreError,
};

pub struct ExpenseService;

impl ExpenseService {
    /// Records an expense against one of the user's budgets.
    ///
    /// The date is free: an expense may fall outside its budget's period
    /// and still counts toward that budget in summaries.
    pub fn record(
        budgets: &dyn BudgetStore,
        expenses: &dyn ExpenseStore,
        user_id: Uuid,
        budget_id: Uuid,
        amount: f64,
        date: NaiveDate,
        description: Option<String>,
    ) -> Result<Expense, CoreError> {
        validate_amount(amount)?;
        let budget = BudgetService::owned(budgets, user_id, budget_id)?;

        let mut expense = Expense::new(user_id, budget.id, amount, date);
        if let Some(text) = description.filter(|text| !text.trim().is_empty()) {
            expense = expense.with_description(text);
        }
        let expense = expenses.insert_expense(expense)?;
        info!(
            user = %user_id,
            budget = %budget.id,
            category = %budget.category,
            amount,
            %date,
            "expense recorded"
        );
        Ok(expense)
    }

    pub fn delete(
        expenses: &dyn ExpenseStore,
        user_id: Uuid,
        expense_id: Uuid,
    ) -> Result<(), CoreError> {
        let expense = expenses
            .find_expense_by_id(expense_id)?
            .ok_or(CoreError::ExpenseNotFound(expense_id))?;
        if !expense.is_owned_by(user_id) {
            return Err(CoreError::NotOwnedByUser {
                entity: "expense",
                id: expense_id,
                user_id,
            });
        }
        expenses.delete_expense(expense_id)
    }

    /// Expenses dated within `[from, to]`, oldest first.
    pub fn list_between(
        expenses: &dyn ExpenseStore,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Expense>, CoreError> {
        if from > to {
            return Err(CoreError::Validation(format!(
                "range start {from} is after its end {to}"
            )));
        }
        let mut found = expenses.find_expenses_between(user_id, from, to)?;
        found.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(found)
    }
}
