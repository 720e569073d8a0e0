//! # Financial Calendar
//!
//! Rules tying documents to the current financial year, and the period
//! bounds reports are built on.
//!
//! ## Period Bounds
//! ```text
//! Closing date: June 30th            Year: 2025
//!
//!   financial  2024-07-01 ─────────────────────► 2025-06-30
//!   previous   2023-07-01 ─────────────────────► 2024-06-30
//!
//!   calendar   2025-01-01 ─────────────────────► 2025-12-31
//!   previous   2024-01-01 ─────────────────────► 2024-12-31
//! ```

use chrono::{Datelike, NaiveDate};

use crate::error::{CoreError, CoreResult};
use crate::types::{FinancialYear, Period, YearKind, YearPeriods};

/// An issue date must fall in the calendar year flagged as current.
///
/// ## User Workflow
/// ```text
/// New invoice dated 2023-12-30
///      │
///      ▼
/// current year? ── none ──► "First you have to set the current financial year."
///      │
///      ▼ 2024
/// 2023 != 2024 ──────────► "The selected date is not within the current year."
/// ```
pub fn check_in_current_year(
    issue_date: NaiveDate,
    current: Option<&FinancialYear>,
) -> CoreResult<()> {
    let current = current.ok_or(CoreError::NoCurrentFinancialYear)?;
    if issue_date.year() != current.year_number() {
        return Err(CoreError::OutsideCurrentYear);
    }
    Ok(())
}

/// A financial year may not predate the company.
pub fn check_year_not_before_creation(year: i32, creation_date: NaiveDate) -> CoreResult<()> {
    if year < creation_date.year() {
        return Err(CoreError::YearBeforeCreation {
            year,
            creation_year: creation_date.year(),
        });
    }
    Ok(())
}

/// The closing day in `year`. February 29th becomes the 28th in common years.
pub fn closing_day_in(year: i32, closing_date: NaiveDate) -> NaiveDate {
    let month = closing_date.month();
    let mut day = closing_date.day();
    loop {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return date;
        }
        day -= 1;
    }
}

/// Bounds of `year` and of the year before, for the given kind.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use tally_core::calendar::year_periods;
/// use tally_core::YearKind;
///
/// let closing = NaiveDate::from_ymd_opt(2020, 6, 30).unwrap();
/// let periods = year_periods(YearKind::Financial, 2025, closing);
///
/// assert_eq!(periods.current.start, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
/// assert_eq!(periods.current.end, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
/// ```
pub fn year_periods(kind: YearKind, year: i32, closing_date: NaiveDate) -> YearPeriods {
    let period_of = |y: i32| match kind {
        YearKind::Financial => {
            let end = closing_day_in(y, closing_date);
            let start = closing_day_in(y - 1, closing_date)
                .succ_opt()
                .unwrap_or(end);
            Period { start, end }
        }
        YearKind::Calendar => Period {
            start: NaiveDate::from_ymd_opt(y, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(y, 12, 31).unwrap_or_default(),
        },
    };

    YearPeriods {
        year,
        kind,
        current: period_of(year),
        previous: period_of(year - 1),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
