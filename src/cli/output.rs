use colored::Colorize;
use std::fmt::{self, Write as _};
use std::sync::{OnceLock, RwLock};

use finperiod_core::{SweepAction, SweepReport};
use finperiod_domain::{
    Budget, DashboardStats, Expense, PeriodSummary, ReportEntry, RolloverOutcome, RolloverReport,
    SkipReason, User,
};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OutputPreferences {
    /// No colours and no decoration beyond plain labels.
    pub plain: bool,
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

pub fn set_preferences(prefs: OutputPreferences) {
    if prefs.plain {
        colored::control::set_override(false);
    }
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
}

fn preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "",
        MessageKind::Success => "OK",
        MessageKind::Warning => "WARNING",
        MessageKind::Error => "ERROR",
        MessageKind::Section => "",
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display, prefs: &OutputPreferences) -> String {
    let text = message.to_string();
    let base = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Info => text,
        _ => format!("{}: {text}", label(kind)),
    };

    if prefs.plain {
        return base;
    }

    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Info => base,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message, &preferences());
    match kind {
        MessageKind::Error => eprintln!("{formatted}"),
        MessageKind::Section => println!("\n{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

fn change(value: &str) -> String {
    if preferences().plain {
        return value.to_string();
    }
    if value.starts_with('-') {
        value.red().to_string()
    } else {
        value.green().to_string()
    }
}

pub fn render_users(users: &[User]) -> String {
    let mut out = String::new();
    for user in users {
        let _ = writeln!(
            out,
            "{:<20} start day {:>2}  {}",
            user.name,
            user.period_start_day.get(),
            user.id
        );
    }
    out
}

pub fn render_budgets(budgets: &[Budget]) -> String {
    let mut out = String::new();
    for budget in budgets {
        let _ = writeln!(
            out,
            "{:<20} {:>12}  {}  {}",
            budget.category,
            money(budget.amount),
            budget.period,
            budget.id
        );
    }
    out
}

pub fn render_expenses(expenses: &[Expense]) -> String {
    let mut out = String::new();
    for expense in expenses {
        let _ = writeln!(
            out,
            "{}  {:>10}  {}",
            expense.date,
            money(expense.amount),
            expense.description.as_deref().unwrap_or("-")
        );
    }
    out
}

pub fn render_summary(summary: &PeriodSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>12} {:>12}",
        "Category", "Budget", "Spent"
    );
    for line in &summary.lines {
        let budget = line.budget_amount.map(money).unwrap_or_else(|| "n/a".into());
        let marker = if line.over_budget {
            if preferences().plain {
                "  OVER".to_string()
            } else {
                "  OVER".red().bold().to_string()
            }
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{:<20} {:>12} {:>12}{marker}",
            line.category,
            budget,
            money(line.spent_amount)
        );
    }
    out
}

pub fn render_stats(stats: &DashboardStats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Period {} ({} .. {}), day {} as of {}",
        stats.period, stats.bounds.start, stats.bounds.end, stats.days_elapsed, stats.as_of
    );
    let rows = [
        ("Total budget", stats.total_budget, &stats.budget_change),
        ("Total spent", stats.total_spent, &stats.spent_change),
        ("Avg daily spend", stats.avg_daily_spend, &stats.avg_daily_change),
        ("Savings", stats.savings, &stats.savings_change),
    ];
    for (name, value, delta) in rows {
        let _ = writeln!(out, "{name:<16} {:>12}  {}", money(value), change(delta));
    }
    out
}

pub fn render_rollover(report: &RolloverReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Rollover {} -> {}: {} copied, {} skipped, {} failed",
        report.previous,
        report.current,
        report.copied_count(),
        report.skipped_count(),
        report.failures().count()
    );
    for item in &report.items {
        let status = match &item.outcome {
            RolloverOutcome::Copied { .. } => "copied".to_string(),
            RolloverOutcome::Skipped(SkipReason::AlreadyPresent) => "already budgeted".to_string(),
            RolloverOutcome::Skipped(SkipReason::LostRace) => "created concurrently".to_string(),
            RolloverOutcome::Failed(reason) => format!("failed: {reason}"),
        };
        let _ = writeln!(out, "  {:<20} {status}", item.category);
    }
    out
}

pub fn render_sweep(report: &SweepReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Sweep {} ({:?}): {} users checked, {} eligible, {} budgets copied",
        report.as_of,
        report.policy,
        report.users_checked,
        report.entries.len(),
        report.copied_total()
    );
    for entry in &report.entries {
        let status = match &entry.action {
            SweepAction::Applied(rollover) => format!("rolled over {}", rollover.copied_count()),
            SweepAction::Flagged => "period starts today; run `rollover` to copy budgets".into(),
            SweepAction::Failed(reason) => format!("failed: {reason}"),
        };
        let _ = writeln!(out, "  {:<20} {status}", entry.user_name);
    }
    out
}

pub fn render_entries(entries: &[ReportEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{:<20} {:>12}", entry.label, money(entry.value));
    }
    out
}
