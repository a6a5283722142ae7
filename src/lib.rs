#![doc(test(attr(deny(warnings))))]

//! finperiod tracks budgets and expenses in user-defined financial months,
//! rolls budgets forward when a new period begins, and reports spend
//! against them.

pub mod app;
pub mod cli;
pub mod clock;
pub mod errors;
pub mod utils;

pub use app::FinPeriods;
pub use errors::AppError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!(version = env!("CARGO_PKG_VERSION"), "finperiod tracing initialized");
    });
}
