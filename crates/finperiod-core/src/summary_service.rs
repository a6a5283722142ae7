//! Per-category spend against the budgets of one period.

use chrono::NaiveDate;
use tracing::warn;
use uuid::Uuid;

use finperiod_domain::{Amounted, BudgetSummary, DataQuality, Period, PeriodSummary};

use crate::{
    period_service::PeriodResolver,
    storage::{BudgetStore, ExpenseStore, UserStore},
    CoreError,
};

/// Stateless aggregation over budget and expense stores.
pub struct SummaryService;

impl SummaryService {
    /// Summarizes every budget in `period`. Spend is the sum of the expenses
    /// attached to each budget, whatever their dates.
    pub fn summary(
        budgets: &dyn BudgetStore,
        expenses: &dyn ExpenseStore,
        user_id: Uuid,
        period: Period,
    ) -> Result<PeriodSummary, CoreError> {
        let mut data_quality = DataQuality::default();
        let mut lines = Vec::new();

        for budget in budgets.find_budgets(user_id, period)? {
            let budget_amount = budget.valid_amount();
            if budget_amount.is_none() {
                warn!(budget = %budget.id, amount = budget.amount, "budget amount excluded");
                data_quality.skipped_budgets += 1;
            }

            let mut spent = Accumulator::default();
            for expense in expenses.find_expenses_for_budget(budget.id)? {
                if expense.user_id == user_id {
                    spent.add(&expense);
                }
            }
            data_quality.skipped_expenses += spent.skipped;

            lines.push(BudgetSummary::from_parts(
                budget.id,
                budget.category,
                budget_amount,
                spent.total,
            ));
        }

        lines.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(PeriodSummary {
            period,
            lines,
            data_quality,
        })
    }

    /// Summarizes the user's period as of `as_of`.
    pub fn current_summary(
        users: &dyn UserStore,
        budgets: &dyn BudgetStore,
        expenses: &dyn ExpenseStore,
        user_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<PeriodSummary, CoreError> {
        let period = PeriodResolver::resolve_current_period(users, user_id, as_of)?;
        Self::summary(budgets, expenses, user_id, period)
    }
}

/// Running total that leaves malformed amounts out and counts them.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Accumulator {
    pub(crate) total: f64,
    pub(crate) skipped: usize,
}

impl Accumulator {
    pub(crate) fn add(&mut self, record: &impl Amounted) {
        match record.valid_amount() {
            Some(amount) => self.total += amount,
            None => self.skipped += 1,
        }
    }

    pub(crate) fn sum<'a, T: Amounted + 'a>(records: impl IntoIterator<Item = &'a T>) -> Self {
        let mut acc = Self::default();
        for record in records {
            acc.add(record);
        }
        acc
    }
}
