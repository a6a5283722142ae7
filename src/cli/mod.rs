//! Command-line interface over [`FinPeriods`].

pub mod config;
pub mod output;

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use finperiod_config::ConfigManager;
use finperiod_core::{Clock, FixedClock, Store};
use finperiod_storage_json::JsonStore;
use tracing::debug;
use uuid::Uuid;

use crate::{app::FinPeriods, clock::SystemClock, errors::AppError};
use config::{run_config, ConfigCommand};
use output::OutputPreferences;

#[derive(Debug, Parser)]
#[command(
    name = "finperiod",
    version,
    about = "Budgets and spend tracked in user-defined financial months"
)]
pub struct Cli {
    /// JSON data file. Defaults to `finperiod.json` in the configured data root.
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Configuration file. Defaults to the platform config directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Evaluate as if today were this date (YYYY-MM-DD).
    #[arg(long, global = true, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Disable colours in human-readable output.
    #[arg(long, global = true)]
    pub plain: bool,

    /// Let the sweep copy budgets instead of only flagging users.
    #[arg(long, global = true)]
    pub auto_apply: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage users and their period start day
    #[command(subcommand)]
    User(UserCommand),

    /// Show a user's current financial period
    Period {
        #[arg(short, long)]
        user: String,
    },

    /// Create, list and delete budgets
    #[command(subcommand)]
    Budget(BudgetCommand),

    /// Record and list expenses
    #[command(subcommand)]
    Expense(ExpenseCommand),

    /// Copy the previous period's budgets into the current one
    Rollover {
        #[arg(short, long)]
        user: String,
    },

    /// Spend against each budget of a period
    Summary {
        #[arg(short, long)]
        user: String,
        /// Period as YYYY-MM (defaults to the current one)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Dashboard figures compared with the previous period
    Stats {
        #[arg(short, long)]
        user: String,
        #[arg(long)]
        json: bool,
    },

    /// Spend by category or by month
    Report {
        #[arg(short, long)]
        user: String,
        #[arg(value_enum)]
        kind: ReportKind,
        /// Cover every expense instead of the last six months
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },

    /// Check which users start a new period today and apply the rollover policy
    Sweep {
        /// Keep running and sweep once per day until interrupted
        #[arg(long)]
        watch: bool,
    },

    /// Show or change saved settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user
    Add {
        name: String,
        /// Day of month (1-28) on which periods begin
        #[arg(long)]
        start_day: Option<u32>,
    },
    /// Change the day of month on which the user's periods begin
    StartDay { user: String, day: u32 },
    /// List users
    List,
}

#[derive(Debug, Subcommand)]
pub enum BudgetCommand {
    /// Create or update a category budget in the current period
    Set {
        #[arg(short, long)]
        user: String,
        category: String,
        amount: f64,
    },
    /// List budgets of the current or a given period
    List {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        period: Option<String>,
    },
    /// Delete a budget and its expenses
    Delete {
        #[arg(short, long)]
        user: String,
        id: Uuid,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExpenseCommand {
    /// Record spend against a category budget
    Add {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        category: String,
        amount: f64,
        /// Expense date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Most recently recorded expenses
    Recent {
        #[arg(short, long)]
        user: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete an expense
    Delete {
        #[arg(short, long)]
        user: String,
        id: Uuid,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Category,
    Trend,
}

/// Parses process arguments and runs the selected command.
pub fn run_cli() -> Result<(), AppError> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<(), AppError> {
    let Cli {
        store,
        config: config_path,
        as_of,
        plain,
        auto_apply,
        command,
    } = cli;
    if as_of.is_some() && matches!(command, Command::Sweep { watch: true }) {
        return Err(AppError::Input(
            "`sweep --watch` follows the system clock and cannot be combined with --as-of".into(),
        ));
    }

    let manager = match config_path {
        Some(path) => ConfigManager::new(path),
        None => ConfigManager::default_location()?,
    };
    let mut config = manager.load()?;
    output::set_preferences(OutputPreferences {
        plain: plain || !config.ui_color_enabled,
    });
    let command = match command {
        Command::Config(command) => return run_config(&manager, config, command),
        other => other,
    };
    if auto_apply {
        config.rollover.auto_apply = true;
    }

    let store_path = store.unwrap_or_else(|| config.store_path());
    debug!(config = %manager.config_path().display(), store = %store_path.display(), "opening data");
    let store = JsonStore::open(store_path)?;

    let clock: Box<dyn Clock> = match as_of {
        Some(date) => Box::new(FixedClock::on(date)),
        None => Box::new(SystemClock),
    };

    let app = FinPeriods::new(store, clock, config);
    dispatch(&app, command)
}

fn dispatch<S: Store>(app: &FinPeriods<S>, command: Command) -> Result<(), AppError> {
    match command {
        Command::User(command) => run_user(app, command),
        Command::Config(_) => Err(AppError::Input(
            "`config` runs before the data file is opened".into(),
        )),
        Command::Period { user } => {
            let user = app.resolve_user(&user)?;
            let (period, bounds) = app.current_period(&user);
            output::info(format!(
                "{period} ({} .. {}), start day {}",
                bounds.start, bounds.end, user.period_start_day
            ));
            Ok(())
        }
        Command::Budget(command) => run_budget(app, command),
        Command::Expense(command) => run_expense(app, command),
        Command::Rollover { user } => {
            let user = app.resolve_user(&user)?;
            let report = app.rollover(&user)?;
            print!("{}", output::render_rollover(&report));
            if report.failures().count() > 0 {
                output::warning("some budgets could not be copied; run `rollover` again to retry");
            }
            Ok(())
        }
        Command::Summary { user, period } => {
            let user = app.resolve_user(&user)?;
            let summary = app.summary(&user, period.as_deref())?;
            output::section(format!("{} {}", user.name, summary.period));
            print!("{}", output::render_summary(&summary));
            if !summary.data_quality.is_clean() {
                output::warning(format!(
                    "{} budgets and {} expenses with malformed amounts were left out",
                    summary.data_quality.skipped_budgets, summary.data_quality.skipped_expenses
                ));
            }
            Ok(())
        }
        Command::Stats { user, json } => {
            let user = app.resolve_user(&user)?;
            let stats = app.dashboard(&user)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", output::render_stats(&stats));
            }
            Ok(())
        }
        Command::Report {
            user,
            kind,
            all,
            json,
        } => {
            let user = app.resolve_user(&user)?;
            let range = app.report_range(all);
            let entries = match kind {
                ReportKind::Category => app.expenses_by_category(&user, range)?,
                ReportKind::Trend => app.monthly_trend(&user, range)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print!("{}", output::render_entries(&entries));
            }
            Ok(())
        }
        Command::Sweep { watch } => {
            if watch {
                let stop = Arc::new(AtomicBool::new(false));
                let flag = Arc::clone(&stop);
                ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;
                output::info("watching for new periods; press Ctrl-C to stop");
                let sweeps = app.watch(&stop)?;
                output::info(format!("watch stopped after {sweeps} sweeps"));
            } else {
                let report = app.sweep()?;
                print!("{}", output::render_sweep(&report));
            }
            Ok(())
        }
    }
}

fn run_user<S: Store>(app: &FinPeriods<S>, command: UserCommand) -> Result<(), AppError> {
    match command {
        UserCommand::Add { name, start_day } => {
            let user = app.add_user(&name, start_day)?;
            output::success(format!(
                "user {} created with start day {} ({})",
                user.name, user.period_start_day, user.id
            ));
        }
        UserCommand::StartDay { user, day } => {
            let user = app.resolve_user(&user)?;
            let updated = app.set_start_day(&user, day)?;
            output::success(format!(
                "{} now starts periods on day {}",
                updated.name, updated.period_start_day
            ));
        }
        UserCommand::List => print!("{}", output::render_users(&app.users()?)),
    }
    Ok(())
}

fn run_budget<S: Store>(app: &FinPeriods<S>, command: BudgetCommand) -> Result<(), AppError> {
    match command {
        BudgetCommand::Set {
            user,
            category,
            amount,
        } => {
            let user = app.resolve_user(&user)?;
            let budget = app.save_budget(&user, &category, amount)?;
            output::success(format!(
                "{} budget for {} set to {:.2}",
                budget.category, budget.period, budget.amount
            ));
        }
        BudgetCommand::List { user, period } => {
            let user = app.resolve_user(&user)?;
            let budgets = app.budgets(&user, period.as_deref())?;
            if budgets.is_empty() {
                output::info("no budgets");
            } else {
                print!("{}", output::render_budgets(&budgets));
            }
        }
        BudgetCommand::Delete { user, id } => {
            let user = app.resolve_user(&user)?;
            app.delete_budget(&user, id)?;
            output::success(format!("budget {id} deleted"));
        }
    }
    Ok(())
}

fn run_expense<S: Store>(app: &FinPeriods<S>, command: ExpenseCommand) -> Result<(), AppError> {
    match command {
        ExpenseCommand::Add {
            user,
            category,
            amount,
            date,
            note,
        } => {
            let user = app.resolve_user(&user)?;
            let (expense, budget) = app.record_expense(&user, &category, amount, date, note)?;
            output::success(format!(
                "{:.2} recorded on {} against {} ({})",
                expense.amount, expense.date, budget.category, budget.period
            ));
        }
        ExpenseCommand::Recent { user, limit } => {
            let user = app.resolve_user(&user)?;
            print!("{}", output::render_expenses(&app.recent_expenses(&user, limit)?));
        }
        ExpenseCommand::Delete { user, id } => {
            let user = app.resolve_user(&user)?;
            app.delete_expense(&user, id)?;
            output::success(format!("expense {id} deleted"));
        }
    }
    Ok(())
}
