//! Resolution of a user's active financial month.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use finperiod_domain::{Period, PeriodBounds, PeriodStartDay};

use crate::{
    storage::{require_user, UserStore},
    CoreError,
};

/// Maps calendar dates onto user-specific accounting periods.
pub struct PeriodResolver;

impl PeriodResolver {
    /// The period `reference` belongs to: the previous calendar month while the
    /// day is before `start_day`, otherwise the reference's own month.
    pub fn effective_period(reference: NaiveDate, start_day: PeriodStartDay) -> Period {
        let month = Period::from_date(reference);
        if reference.day() < start_day.get() {
            month.pred()
        } else {
            month
        }
    }

    pub fn previous_period(period: Period) -> Period {
        period.pred()
    }

    pub fn next_period(period: Period) -> Period {
        period.succ()
    }

    /// Inclusive start/end dates of `period` under `start_day`.
    pub fn period_bounds(period: Period, start_day: PeriodStartDay) -> PeriodBounds {
        period.bounds(start_day)
    }

    /// Returns `(current, previous)` for the reference date.
    pub fn current_and_previous(
        reference: NaiveDate,
        start_day: PeriodStartDay,
    ) -> (Period, Period) {
        let current = Self::effective_period(reference, start_day);
        (current, Self::previous_period(current))
    }

    /// Looks the user up and resolves their period on `as_of`.
    pub fn resolve_current_period(
        users: &dyn UserStore,
        user_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Period, CoreError> {
        let user = require_user(users, user_id)?;
        Ok(Self::effective_period(as_of, user.period_start_day))
    }

    /// Parses an externally supplied `YYYY-MM` identifier.
    pub fn parse_period(raw: &str) -> Result<Period, CoreError> {
        raw.parse::<Period>().map_err(CoreError::from)
    }
}
