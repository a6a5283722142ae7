//! Financial-month identifiers, start days, and calendar arithmetic.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Day of the month on which a user's accounting cycle begins.
///
/// Capped at 28 so the day exists in every calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PeriodStartDay(u32);

impl PeriodStartDay {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 28;

    pub fn new(day: u32) -> Result<Self, PeriodError> {
        if (Self::MIN..=Self::MAX).contains(&day) {
            Ok(Self(day))
        } else {
            Err(PeriodError::InvalidStartDay(day))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` when a new period begins on `date`.
    pub fn starts_on(self, date: NaiveDate) -> bool {
        date.day() == self.0
    }
}

impl Default for PeriodStartDay {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u32> for PeriodStartDay {
    type Error = PeriodError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PeriodStartDay> for u32 {
    fn from(value: PeriodStartDay) -> Self {
        value.0
    }
}

impl fmt::Display for PeriodStartDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A (year, month) anchor naming one accounting cycle.
///
/// Serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Accepts only months whose neighbours are also representable, so
    /// [`Period::bounds`] is defined for every constructed value.
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        let invalid = || PeriodError::InvalidFormat(format!("{year:04}-{month:02}"));
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        let period = Self { year, month };
        for neighbour in [period.pred(), period, period.succ()] {
            if NaiveDate::from_ymd_opt(neighbour.year, neighbour.month, 1).is_none() {
                return Err(invalid());
            }
        }
        Ok(period)
    }

    /// The calendar month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// Moves the anchor by `months` calendar months (negative goes back).
    pub fn shift(self, months: i32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn pred(self) -> Self {
        self.shift(-1)
    }

    pub fn succ(self) -> Self {
        self.shift(1)
    }

    /// The date within this calendar month on the given start day.
    ///
    /// Saturates at chrono's calendar limits for months built from extreme dates.
    pub fn on_day(self, day: PeriodStartDay) -> NaiveDate {
        self.checked_on_day(day).unwrap_or(if self.year < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
    }

    fn checked_on_day(self, day: PeriodStartDay) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day.get())
    }

    /// The day before the next period on `day` starts.
    fn end_before_next(self, day: PeriodStartDay) -> NaiveDate {
        self.succ()
            .checked_on_day(day)
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn first_day(self) -> NaiveDate {
        self.on_day(PeriodStartDay::default())
    }

    pub fn last_day(self) -> NaiveDate {
        self.end_before_next(PeriodStartDay::default())
    }

    /// Inclusive date range covered by this period for the given start day.
    pub fn bounds(self, start_day: PeriodStartDay) -> PeriodBounds {
        let start = self.on_day(start_day);
        let end = self.end_before_next(start_day);
        PeriodBounds { start, end }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || PeriodError::InvalidFormat(raw.to_string());
        let trimmed = raw.trim();
        let (year_part, month_part) = trimmed.rsplit_once('-').ok_or_else(invalid)?;
        let digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
        if year_part.len() < 4 || !digits(year_part) || month_part.len() != 2 || !digits(month_part)
        {
            return Err(invalid());
        }
        let year = year_part.parse::<i32>().map_err(|_| invalid())?;
        let month = month_part.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

/// Inclusive `[start, end]` date range of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodBounds {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the range, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Truncates the range so it never extends past `limit`.
    pub fn through(&self, limit: NaiveDate) -> Self {
        Self {
            start: self.start,
            end: self.end.min(limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors raised when constructing [`Period`] or [`PeriodStartDay`] values.
pub enum PeriodError {
    InvalidFormat(String),
    InvalidStartDay(u32),
}

impl fmt::Display for PeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodError::InvalidFormat(raw) => {
                write!(f, "invalid period `{raw}`, expected YYYY-MM")
            }
            PeriodError::InvalidStartDay(day) => write!(
                f,
                "period start day {day} outside {}..={}",
                PeriodStartDay::MIN,
                PeriodStartDay::MAX
            ),
        }
    }
}

impl std::error::Error for PeriodError {}
