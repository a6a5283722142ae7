//! Mutex-guarded in-memory implementation of every store trait.

use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use finperiod_domain::{Budget, Dataset, Expense, Identifiable, Period, User};

use crate::{
    storage::{BudgetStore, ExpenseStore, UserStore},
    CoreError,
};

/// Arena-backed store. Every operation runs under one lock, so the
/// duplicate check in [`BudgetStore::insert_budget`] and the insert are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Dataset>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            state: Mutex::new(dataset),
        }
    }

    /// Clones the current contents.
    pub fn dataset(&self) -> Result<Dataset, CoreError> {
        Ok(self.lock()?.clone())
    }

    /// Replaces the whole contents with `dataset`.
    pub fn replace(&self, dataset: Dataset) -> Result<(), CoreError> {
        *self.lock()? = dataset;
        Ok(())
    }

    pub fn into_dataset(self) -> Result<Dataset, CoreError> {
        self.state
            .into_inner()
            .map_err(|_| CoreError::Storage("store lock poisoned".into()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Dataset>, CoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::Storage("store lock poisoned".into()))
    }
}

fn find_by_id<T: Identifiable + Clone>(records: &[T], id: Uuid) -> Option<T> {
    records.iter().find(|record| record.id() == id).cloned()
}

impl UserStore for MemoryStore {
    fn list_users(&self) -> Result<Vec<User>, CoreError> {
        Ok(self.lock()?.users.clone())
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>, CoreError> {
        Ok(find_by_id(&self.lock()?.users, id))
    }

    fn save_user(&self, user: &User) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        match state.users.iter_mut().find(|existing| existing.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => state.users.push(user.clone()),
        }
        Ok(())
    }
}

impl BudgetStore for MemoryStore {
    fn find_budgets(&self, user_id: Uuid, period: Period) -> Result<Vec<Budget>, CoreError> {
        Ok(self
            .lock()?
            .budgets
            .iter()
            .filter(|budget| budget.user_id == user_id && budget.period == period)
            .cloned()
            .collect())
    }

    fn find_budget(
        &self,
        user_id: Uuid,
        category: &str,
        period: Period,
    ) -> Result<Option<Budget>, CoreError> {
        Ok(self
            .lock()?
            .budgets
            .iter()
            .find(|budget| budget.matches(user_id, category, period))
            .cloned())
    }

    fn find_budget_by_id(&self, id: Uuid) -> Result<Option<Budget>, CoreError> {
        Ok(find_by_id(&self.lock()?.budgets, id))
    }

    fn insert_budget(&self, budget: Budget) -> Result<Budget, CoreError> {
        let mut state = self.lock()?;
        if state.budgets.iter().any(|existing| existing.same_slot(&budget)) {
            return Err(CoreError::DuplicateBudgetForPeriod {
                category: budget.category,
                period: budget.period,
            });
        }
        state.budgets.push(budget.clone());
        Ok(budget)
    }

    fn update_budget(&self, budget: Budget) -> Result<Budget, CoreError> {
        let mut state = self.lock()?;
        if state
            .budgets
            .iter()
            .any(|existing| existing.id != budget.id && existing.same_slot(&budget))
        {
            return Err(CoreError::DuplicateBudgetForPeriod {
                category: budget.category,
                period: budget.period,
            });
        }
        let slot = state
            .budgets
            .iter_mut()
            .find(|existing| existing.id == budget.id)
            .ok_or(CoreError::BudgetNotFound(budget.id))?;
        *slot = budget.clone();
        Ok(budget)
    }

    fn delete_budget(&self, id: Uuid) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        let before = state.budgets.len();
        state.budgets.retain(|budget| budget.id != id);
        if state.budgets.len() == before {
            return Err(CoreError::BudgetNotFound(id));
        }
        state.expenses.retain(|expense| expense.budget_id != id);
        Ok(())
    }
}

impl ExpenseStore for MemoryStore {
    fn find_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>, CoreError> {
        Ok(self
            .lock()?
            .expenses
            .iter()
            .filter(|expense| expense.user_id == user_id)
            .cloned()
            .collect())
    }

    fn find_expense_by_id(&self, id: Uuid) -> Result<Option<Expense>, CoreError> {
        Ok(find_by_id(&self.lock()?.expenses, id))
    }

    fn find_expenses_for_budget(&self, budget_id: Uuid) -> Result<Vec<Expense>, CoreError> {
        Ok(self
            .lock()?
            .expenses
            .iter()
            .filter(|expense| expense.budget_id == budget_id)
            .cloned()
            .collect())
    }

    fn insert_expense(&self, expense: Expense) -> Result<Expense, CoreError> {
        let mut state = self.lock()?;
        if !state.budgets.iter().any(|budget| budget.id == expense.budget_id) {
            return Err(CoreError::BudgetNotFound(expense.budget_id));
        }
        state.expenses.push(expense.clone());
        Ok(expense)
    }

    fn delete_expense(&self, id: Uuid) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        let before = state.expenses.len();
        state.expenses.retain(|expense| expense.id != id);
        if state.expenses.len() == before {
            return Err(CoreError::ExpenseNotFound(id));
        }
        Ok(())
    }
}
