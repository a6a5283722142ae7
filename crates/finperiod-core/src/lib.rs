//! finperiod-core
//!
//! The financial-period engine: period resolution, budget rollover,
//! aggregation for summaries and dashboards, and the daily rollover sweep.
//! Depends on finperiod-domain. No CLI, no terminal I/O; persistence is
//! reached only through the traits in [`storage`].

pub mod budget_service;
pub mod dashboard_service;
pub mod error;
pub mod expense_service;
pub mod format;
pub mod memory;
pub mod period_service;
pub mod preference_service;
pub mod report_service;
pub mod rollover_service;
pub mod scheduler;
pub mod storage;
pub mod summary_service;
pub mod time;

pub use budget_service::*;
pub use dashboard_service::*;
pub use error::CoreError;
pub use expense_service::*;
pub use format::*;
pub use memory::MemoryStore;
pub use period_service::*;
pub use preference_service::*;
pub use report_service::*;
pub use rollover_service::*;
pub use scheduler::*;
pub use storage::{BudgetStore, ExpenseStore, Store, UserStore};
pub use summary_service::*;
pub use time::{Clock, FixedClock};
