//! Application facade tying a store, a clock and the loaded configuration
//! to the period engine.

use std::{sync::atomic::AtomicBool, time::Duration};

use chrono::NaiveDate;
use finperiod_config::Config;
use finperiod_core::{
    BudgetService, BudgetStore, Clock, CoreError, DailyRollover, DashboardService,
    ExpenseService, PeriodResolver, PreferenceService, ReportRange, ReportService,
    RolloverPolicy, RolloverScheduler, RolloverService, Store, SummaryService, SweepReport,
    UserStore,
};
use finperiod_domain::{
    Budget, DashboardStats, Expense, Period, PeriodBounds, PeriodStartDay, PeriodSummary,
    ReportEntry, RolloverReport, User,
};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Entry point used by the CLI. Only this layer reads the clock; everything
/// below receives an explicit date.
pub struct FinPeriods<S: Store> {
    store: S,
    clock: Box<dyn Clock>,
    config: Config,
}

impl<S: Store> FinPeriods<S> {
    pub fn new(store: S, clock: Box<dyn Clock>, config: Config) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn policy(&self) -> RolloverPolicy {
        RolloverPolicy::from_auto_apply(self.config.rollover.auto_apply)
    }

    /// Creates a user. Names must be unique so they can be used as references.
    pub fn add_user(&self, name: &str, start_day: Option<u32>) -> Result<User, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Input("user name cannot be blank".into()));
        }
        if self.store.list_users()?.iter().any(|user| user.name == name) {
            return Err(AppError::Input(format!("user `{name}` already exists")));
        }
        let day = start_day.unwrap_or(self.config.default_period_start_day);
        let start_day = PeriodStartDay::new(day).map_err(CoreError::from)?;
        let user = User::new(name).with_start_day(start_day);
        self.store.save_user(&user)?;
        info!(user = %user.id, name = %user.name, start_day = %start_day, "user created");
        Ok(user)
    }

    pub fn users(&self) -> Result<Vec<User>, AppError> {
        let mut users = self.store.list_users()?;
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    /// Resolves a user by id or by exact name.
    pub fn resolve_user(&self, reference: &str) -> Result<User, AppError> {
        let reference = reference.trim();
        if let Ok(id) = Uuid::parse_str(reference) {
            return self
                .store
                .find_user(id)?
                .ok_or_else(|| CoreError::UserNotFound(id).into());
        }
        let mut matches: Vec<User> = self
            .store
            .list_users()?
            .into_iter()
            .filter(|user| user.name == reference)
            .collect();
        match matches.len() {
            0 => Err(AppError::Input(format!("no user named `{reference}`"))),
            1 => Ok(matches.remove(0)),
            _ => Err(AppError::Input(format!(
                "several users are named `{reference}`; use the id instead"
            ))),
        }
    }

    pub fn set_start_day(&self, user: &User, day: u32) -> Result<User, AppError> {
        Ok(PreferenceService::set_period_start_day(&self.store, user.id, day)?)
    }

    /// The user's current period and its date range.
    pub fn current_period(&self, user: &User) -> (Period, PeriodBounds) {
        let start_day = user.period_start_day;
        let period = PeriodResolver::effective_period(self.today(), start_day);
        (period, PeriodResolver::period_bounds(period, start_day))
    }

    pub fn save_budget(&self, user: &User, category: &str, amount: f64) -> Result<Budget, AppError> {
        Ok(BudgetService::save(
            &self.store,
            &self.store,
            user.id,
            category,
            amount,
            self.today(),
        )?)
    }

    pub fn budgets(&self, user: &User, period: Option<&str>) -> Result<Vec<Budget>, AppError> {
        let budgets = match period {
            Some(raw) => BudgetService::list_for_period(&self.store, user.id, raw)?,
            None => BudgetService::list_current(&self.store, &self.store, user.id, self.today())?,
        };
        Ok(budgets)
    }

    pub fn delete_budget(&self, user: &User, budget_id: Uuid) -> Result<(), AppError> {
        Ok(BudgetService::delete(&self.store, user.id, budget_id)?)
    }

    /// Records spend against the category's budget in the period the
    /// expense date falls into.
    pub fn record_expense(
        &self,
        user: &User,
        category: &str,
        amount: f64,
        date: Option<NaiveDate>,
        note: Option<String>,
    ) -> Result<(Expense, Budget), AppError> {
        let date = date.unwrap_or_else(|| self.today());
        let period = PeriodResolver::effective_period(date, user.period_start_day);
        let budget = self
            .store
            .find_budget(user.id, category.trim(), period)?
            .ok_or_else(|| {
                AppError::Input(format!(
                    "no `{}` budget in {period}; create one with `budget set` first",
                    category.trim()
                ))
            })?;
        let expense =
            ExpenseService::record(&self.store, &self.store, user.id, budget.id, amount, date, note)?;
        Ok((expense, budget))
    }

    pub fn delete_expense(&self, user: &User, expense_id: Uuid) -> Result<(), AppError> {
        Ok(ExpenseService::delete(&self.store, user.id, expense_id)?)
    }

    pub fn recent_expenses(&self, user: &User, limit: Option<usize>) -> Result<Vec<Expense>, AppError> {
        let limit = limit.unwrap_or(self.config.recent_expense_limit);
        Ok(DashboardService::recent_expenses(&self.store, user.id, limit)?)
    }

    pub fn rollover(&self, user: &User) -> Result<RolloverReport, AppError> {
        Ok(RolloverService::rollover(&self.store, user, self.today())?)
    }

    pub fn summary(&self, user: &User, period: Option<&str>) -> Result<PeriodSummary, AppError> {
        let summary = match period {
            Some(raw) => {
                let period = PeriodResolver::parse_period(raw)?;
                SummaryService::summary(&self.store, &self.store, user.id, period)?
            }
            None => SummaryService::current_summary(
                &self.store,
                &self.store,
                &self.store,
                user.id,
                self.today(),
            )?,
        };
        Ok(summary)
    }

    pub fn dashboard(&self, user: &User) -> Result<DashboardStats, AppError> {
        Ok(DashboardService::stats_for(&self.store, &self.store, user, self.today())?)
    }

    pub fn report_range(&self, all: bool) -> ReportRange {
        if all {
            ReportRange::All
        } else {
            ReportRange::LastSixMonths { as_of: self.today() }
        }
    }

    pub fn expenses_by_category(
        &self,
        user: &User,
        range: ReportRange,
    ) -> Result<Vec<ReportEntry>, AppError> {
        Ok(ReportService::expenses_by_category(
            &self.store,
            &self.store,
            user.id,
            range,
        )?)
    }

    pub fn monthly_trend(&self, user: &User, range: ReportRange) -> Result<Vec<ReportEntry>, AppError> {
        Ok(ReportService::monthly_trend(&self.store, user.id, range)?)
    }

    /// One sweep over all users for today.
    pub fn sweep(&self) -> Result<SweepReport, AppError> {
        let scheduler = RolloverScheduler::new(&self.store, &self.store, self.policy());
        Ok(scheduler.sweep(self.today())?)
    }

    /// Sweeps once per day until `stop` is raised. Returns the number of sweeps.
    pub fn watch(&self, stop: &AtomicBool) -> Result<usize, AppError> {
        let scheduler = RolloverScheduler::new(&self.store, &self.store, self.policy());
        let poll = Duration::from_secs(self.config.rollover.poll_interval_secs);
        let mut driver = DailyRollover::new(scheduler, self.clock.as_ref());
        info!(policy = ?self.policy(), poll_secs = poll.as_secs(), "daily rollover watch started");
        Ok(driver.run_until(stop, poll)?)
    }
}
