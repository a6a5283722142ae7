//! Copies budgets forward from the previous period into the current one.

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use finperiod_domain::{Budget, Period, RolloverOutcome, RolloverReport, SkipReason, User};

use crate::{
    period_service::PeriodResolver,
    storage::{require_user, BudgetStore, UserStore},
    CoreError,
};

/// Idempotent budget rollover shared by manual and scheduled triggers.
pub struct RolloverService;

impl RolloverService {
    /// Copies every category budgeted in the previous period that is missing
    /// from the current one. Running it again for the same period copies nothing.
    ///
    /// Failing to write one budget does not stop the others; the failure is
    /// recorded in the report.
    pub fn rollover(
        budgets: &dyn BudgetStore,
        user: &User,
        as_of: NaiveDate,
    ) -> Result<RolloverReport, CoreError> {
        let (current, previous) =
            PeriodResolver::current_and_previous(as_of, user.period_start_day);
        let mut report = RolloverReport::new(user.id, previous, current);

        for source in budgets.find_budgets(user.id, previous)? {
            let outcome = Self::carry_forward(budgets, user, &source, current);
            report.record(source.category, outcome);
        }

        info!(
            user = %user.id,
            %previous,
            %current,
            copied = report.copied_count(),
            skipped = report.skipped_count(),
            failed = report.failures().count(),
            "budget rollover finished"
        );
        Ok(report)
    }

    /// Resolves the user first; fails with [`CoreError::UserNotFound`].
    pub fn rollover_for(
        users: &dyn UserStore,
        budgets: &dyn BudgetStore,
        user_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<RolloverReport, CoreError> {
        let user = require_user(users, user_id)?;
        Self::rollover(budgets, &user, as_of)
    }

    fn carry_forward(
        budgets: &dyn BudgetStore,
        user: &User,
        source: &Budget,
        current: Period,
    ) -> RolloverOutcome {
        match budgets.find_budget(user.id, &source.category, current) {
            Ok(Some(_)) => {
                debug!(category = %source.category, %current, "category already budgeted");
                return RolloverOutcome::Skipped(SkipReason::AlreadyPresent);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(category = %source.category, error = %err, "rollover lookup failed");
                return RolloverOutcome::Failed(err.to_string());
            }
        }

        match budgets.insert_budget(source.carried_into(current)) {
            Ok(copy) => {
                debug!(category = %copy.category, amount = copy.amount, %current, "budget copied");
                RolloverOutcome::Copied { budget_id: copy.id }
            }
            Err(CoreError::DuplicateBudgetForPeriod { .. }) => {
                debug!(category = %source.category, %current, "budget created concurrently");
                RolloverOutcome::Skipped(SkipReason::LostRace)
            }
            Err(err) => {
                warn!(category = %source.category, error = %err, "failed to copy budget");
                RolloverOutcome::Failed(err.to_string())
            }
        }
    }
}
