//! Creation, listing, and ownership-checked mutation of budgets.

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use finperiod_domain::{is_valid_amount, Budget, Owned};

use crate::{
    period_service::PeriodResolver,
    storage::{require_user, BudgetStore, UserStore},
    CoreError,
};

pub struct BudgetService;

impl BudgetService {
    /// Creates the category's budget in the user's effective period, or
    /// updates the amount when one already exists there.
    pub fn save(
        users: &dyn UserStore,
        budgets: &dyn BudgetStore,
        user_id: Uuid,
        category: &str,
        amount: f64,
        as_of: NaiveDate,
    ) -> Result<Budget, CoreError> {
        let category = validate_category(category)?;
        validate_amount(amount)?;
        let user = require_user(users, user_id)?;
        let period = PeriodResolver::effective_period(as_of, user.period_start_day);

        if let Some(mut existing) = budgets.find_budget(user.id, category, period)? {
            existing.set_amount(amount);
            return budgets.update_budget(existing);
        }

        match budgets.insert_budget(Budget::new(user.id, category, amount, period)) {
            Ok(created) => {
                info!(user = %user.id, category, %period, amount, "budget created");
                Ok(created)
            }
            // Created concurrently (e.g. by a rollover); fall back to updating it.
            Err(CoreError::DuplicateBudgetForPeriod { .. }) => {
                let mut existing = budgets
                    .find_budget(user.id, category, period)?
                    .ok_or_else(|| {
                        CoreError::Storage(format!("budget `{category}` vanished during save"))
                    })?;
                existing.set_amount(amount);
                budgets.update_budget(existing)
            }
            Err(err) => Err(err),
        }
    }

    /// Budgets of the user's effective period on `as_of`.
    pub fn list_current(
        users: &dyn UserStore,
        budgets: &dyn BudgetStore,
        user_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Vec<Budget>, CoreError> {
        let period = PeriodResolver::resolve_current_period(users, user_id, as_of)?;
        Ok(sorted(budgets.find_budgets(user_id, period)?))
    }

    /// Budgets for an externally supplied `YYYY-MM` period.
    pub fn list_for_period(
        budgets: &dyn BudgetStore,
        user_id: Uuid,
        raw_period: &str,
    ) -> Result<Vec<Budget>, CoreError> {
        let period = PeriodResolver::parse_period(raw_period)?;
        Ok(sorted(budgets.find_budgets(user_id, period)?))
    }

    pub fn update_amount(
        budgets: &dyn BudgetStore,
        user_id: Uuid,
        budget_id: Uuid,
        amount: f64,
    ) -> Result<Budget, CoreError> {
        validate_amount(amount)?;
        let mut budget = Self::owned(budgets, user_id, budget_id)?;
        budget.set_amount(amount);
        budgets.update_budget(budget)
    }

    /// Deletes a budget of any period, together with its expenses.
    pub fn delete(
        budgets: &dyn BudgetStore,
        user_id: Uuid,
        budget_id: Uuid,
    ) -> Result<(), CoreError> {
        let budget = Self::owned(budgets, user_id, budget_id)?;
        budgets.delete_budget(budget.id)?;
        info!(user = %user_id, budget = %budget_id, category = %budget.category, "budget deleted");
        Ok(())
    }

    /// Loads a budget and checks it belongs to `user_id`.
    pub fn owned(
        budgets: &dyn BudgetStore,
        user_id: Uuid,
        budget_id: Uuid,
    ) -> Result<Budget, CoreError> {
        let budget = budgets
            .find_budget_by_id(budget_id)?
            .ok_or(CoreError::BudgetNotFound(budget_id))?;
        if !budget.is_owned_by(user_id) {
            return Err(CoreError::NotOwnedByUser {
                entity: "budget",
                id: budget_id,
                user_id,
            });
        }
        Ok(budget)
    }
}

fn sorted(mut budgets: Vec<Budget>) -> Vec<Budget> {
    budgets.sort_by(|a, b| a.category.cmp(&b.category));
    budgets
}

fn validate_category(category: &str) -> Result<&str, CoreError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("category cannot be blank".into()));
    }
    Ok(trimmed)
}

pub(crate) fn validate_amount(amount: f64) -> Result<(), CoreError> {
    if !is_valid_amount(amount) {
        return Err(CoreError::Validation(format!(
            "amount must be a non-negative number, got {amount}"
        )));
    }
    Ok(())
}
