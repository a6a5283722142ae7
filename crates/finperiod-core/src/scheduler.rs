//! Daily sweep that triggers rollover for users whose period starts today.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use finperiod_domain::RolloverReport;

use crate::{
    rollover_service::RolloverService,
    storage::{BudgetStore, UserStore},
    time::Clock,
    CoreError,
};

/// Longest a stop request waits while the driver is idle.
const STOP_CHECK: Duration = Duration::from_millis(200);

/// What the sweep does for an eligible user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverPolicy {
    /// Copy budgets forward immediately.
    AutoApply,
    /// Only flag the user; copying waits for a manual trigger.
    ManualOnly,
}

impl RolloverPolicy {
    pub fn from_auto_apply(auto_apply: bool) -> Self {
        if auto_apply {
            RolloverPolicy::AutoApply
        } else {
            RolloverPolicy::ManualOnly
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepAction {
    Applied(RolloverReport),
    Flagged,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepEntry {
    pub user_id: Uuid,
    pub user_name: String,
    pub action: SweepAction,
}

/// Outcome of one sweep. Only eligible users appear in `entries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub as_of: NaiveDate,
    pub policy: RolloverPolicy,
    pub users_checked: usize,
    pub entries: Vec<SweepEntry>,
}

impl SweepReport {
    pub fn flagged_users(&self) -> impl Iterator<Item = &SweepEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.action == SweepAction::Flagged)
    }

    pub fn copied_total(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match &entry.action {
                SweepAction::Applied(report) => report.copied_count(),
                _ => 0,
            })
            .sum()
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.action, SweepAction::Failed(_)))
            .count()
    }
}

/// Walks every user and applies the configured [`RolloverPolicy`].
pub struct RolloverScheduler<'a> {
    users: &'a dyn UserStore,
    budgets: &'a dyn BudgetStore,
    policy: RolloverPolicy,
}

impl<'a> RolloverScheduler<'a> {
    pub fn new(
        users: &'a dyn UserStore,
        budgets: &'a dyn BudgetStore,
        policy: RolloverPolicy,
    ) -> Self {
        Self {
            users,
            budgets,
            policy,
        }
    }

    pub fn policy(&self) -> RolloverPolicy {
        self.policy
    }

    /// Users whose start day equals `as_of`'s day are eligible. A failure for
    /// one user is recorded and the sweep moves on.
    pub fn sweep(&self, as_of: NaiveDate) -> Result<SweepReport, CoreError> {
        let users = self.users.list_users()?;
        let mut report = SweepReport {
            as_of,
            policy: self.policy,
            users_checked: users.len(),
            entries: Vec::new(),
        };

        for user in users
            .into_iter()
            .filter(|user| user.period_start_day.starts_on(as_of))
        {
            let action = match self.policy {
                RolloverPolicy::AutoApply => {
                    match RolloverService::rollover(self.budgets, &user, as_of) {
                        Ok(rollover) => SweepAction::Applied(rollover),
                        Err(err) => {
                            warn!(user = %user.id, error = %err, "scheduled rollover failed");
                            SweepAction::Failed(err.to_string())
                        }
                    }
                }
                RolloverPolicy::ManualOnly => {
                    info!(user = %user.id, name = %user.name, "period starts today; rollover awaits confirmation");
                    SweepAction::Flagged
                }
            };
            report.entries.push(SweepEntry {
                user_id: user.id,
                user_name: user.name,
                action,
            });
        }

        info!(
            %as_of,
            policy = ?self.policy,
            checked = report.users_checked,
            eligible = report.entries.len(),
            copied = report.copied_total(),
            failed = report.failed_count(),
            "rollover sweep complete"
        );
        Ok(report)
    }
}

/// Runs a [`RolloverScheduler`] at most once per calendar day.
///
/// Days missed while not running are not replayed.
pub struct DailyRollover<'a> {
    scheduler: RolloverScheduler<'a>,
    clock: &'a dyn Clock,
    last_run: Option<NaiveDate>,
}

impl<'a> DailyRollover<'a> {
    pub fn new(scheduler: RolloverScheduler<'a>, clock: &'a dyn Clock) -> Self {
        Self {
            scheduler,
            clock,
            last_run: None,
        }
    }

    pub fn last_run(&self) -> Option<NaiveDate> {
        self.last_run
    }

    /// Sweeps when the clock has moved to a day not yet processed.
    pub fn tick(&mut self) -> Result<Option<SweepReport>, CoreError> {
        let today = self.clock.today();
        if self.last_run == Some(today) {
            return Ok(None);
        }
        let report = self.scheduler.sweep(today)?;
        self.last_run = Some(today);
        Ok(Some(report))
    }

    /// Ticks every `poll` until `stop` is set; returns the number of sweeps run.
    pub fn run_until(&mut self, stop: &AtomicBool, poll: Duration) -> Result<usize, CoreError> {
        let mut sweeps = 0;
        while !stop.load(Ordering::Relaxed) {
            match self.tick() {
                Ok(Some(_)) => sweeps += 1,
                Ok(None) => {}
                Err(err) => warn!(error = %err, "rollover sweep aborted; retrying next poll"),
            }
            pause(stop, poll);
        }
        Ok(sweeps)
    }
}

/// Sleeps for `poll`, returning early once `stop` is set.
fn pause(stop: &AtomicBool, poll: Duration) {
    let deadline = Instant::now() + poll;
    while !stop.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(STOP_CHECK));
    }
}
