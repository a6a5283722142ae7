//! Dashboard statistics comparing the running period with the one before.

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use finperiod_domain::{DashboardStats, DataQuality, Expense, User};

use crate::{
    format::format_change,
    period_service::PeriodResolver,
    storage::{require_user, BudgetStore, ExpenseStore, UserStore},
    summary_service::Accumulator,
    CoreError,
};

pub struct DashboardService;

impl DashboardService {
    /// Computes dashboard figures for the user as of `as_of`.
    pub fn dashboard_stats(
        users: &dyn UserStore,
        budgets: &dyn BudgetStore,
        expenses: &dyn ExpenseStore,
        user_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<DashboardStats, CoreError> {
        let user = require_user(users, user_id)?;
        Self::stats_for(budgets, expenses, &user, as_of)
    }

    /// Current-period spend only counts dates up to `as_of`; the previous
    /// period is taken in full. Always recomputed from the stores.
    pub fn stats_for(
        budgets: &dyn BudgetStore,
        expenses: &dyn ExpenseStore,
        user: &User,
        as_of: NaiveDate,
    ) -> Result<DashboardStats, CoreError> {
        let start_day = user.period_start_day;
        let (current, previous) = PeriodResolver::current_and_previous(as_of, start_day);
        let bounds = PeriodResolver::period_bounds(current, start_day);
        let prev_bounds = PeriodResolver::period_bounds(previous, start_day);

        let budget_now = Accumulator::sum(&budgets.find_budgets(user.id, current)?);
        let budget_prev = Accumulator::sum(&budgets.find_budgets(user.id, previous)?);

        let elapsed = bounds.through(as_of);
        let spent_now = Accumulator::sum(&expenses.find_expenses_between(
            user.id,
            elapsed.start,
            elapsed.end,
        )?);
        let spent_prev = Accumulator::sum(&expenses.find_expenses_between(
            user.id,
            prev_bounds.start,
            prev_bounds.end,
        )?);

        let days_elapsed = elapsed.days().max(1);
        let days_in_prev_period = prev_bounds.days().max(1);

        let avg_daily_spend = spent_now.total / days_elapsed as f64;
        let avg_prev_daily_spend = spent_prev.total / days_in_prev_period as f64;
        let savings = budget_now.total - spent_now.total;
        let prev_savings = budget_prev.total - spent_prev.total;

        let data_quality = DataQuality {
            skipped_budgets: budget_now.skipped + budget_prev.skipped,
            skipped_expenses: spent_now.skipped + spent_prev.skipped,
        };
        if !data_quality.is_clean() {
            warn!(
                user = %user.id,
                skipped_budgets = data_quality.skipped_budgets,
                skipped_expenses = data_quality.skipped_expenses,
                "malformed amounts excluded from dashboard totals"
            );
        }
        debug!(user = %user.id, %current, days_elapsed, "dashboard stats computed");

        Ok(DashboardStats {
            period: current,
            bounds,
            as_of,
            days_elapsed,
            total_budget: budget_now.total,
            total_spent: spent_now.total,
            avg_daily_spend,
            savings,
            budget_change: format_change(budget_now.total, budget_prev.total),
            spent_change: format_change(spent_now.total, spent_prev.total),
            avg_daily_change: format_change(avg_daily_spend, avg_prev_daily_spend),
            savings_change: format_change(savings, prev_savings),
            data_quality,
        })
    }

    /// The user's most recently recorded expenses, newest first.
    pub fn recent_expenses(
        expenses: &dyn ExpenseStore,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Expense>, CoreError> {
        let mut recent = expenses.find_expenses(user_id)?;
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        Ok(recent)
    }
}
