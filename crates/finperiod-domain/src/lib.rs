//! finperiod-domain
//!
//! Pure domain models (User, Budget, Expense, Period) and the report shapes
//! produced by the period engine. No I/O, no CLI, no storage.

pub mod budget;
pub mod common;
pub mod dataset;
pub mod expense;
pub mod period;
pub mod report;
pub mod user;

pub use budget::*;
pub use common::*;
pub use dataset::*;
pub use expense::*;
pub use period::*;
pub use report::*;
pub use user::*;
