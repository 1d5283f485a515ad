//! Billing catalog - who is billable, for which period, due when.
//!
//! A read-only view over the student-directory projection. The raw
//! directory fields (`fee_policy`, `join_date`) are validated here into a
//! typed [`BillingProfile`]; one student's malformed record becomes an
//! isolated [`Error::InvalidBillingConfiguration`] instead of poisoning a
//! batch. The module also owns the calendar arithmetic for billing
//! periods: month names, next/previous period, due dates, join-date
//! gating.

use crate::{
    entities::{FeePolicy, student},
    errors::{Error, Result},
};
use chrono::{Datelike, Days, NaiveDate};

/// Day of the month every fee falls due on.
const DUE_DAY: u32 = 10;

/// English month names, indexed by month number minus one.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Resolves a month name to its 1-based number, case-insensitively.
#[must_use]
pub fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name.trim()))
        .map(|idx| idx as u32 + 1)
}

/// One calendar month of billing, e.g. January 2025.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    /// 1-based month number, always in `1..=12`
    pub month: u32,
    /// Calendar year
    pub year: i32,
}

impl BillingPeriod {
    /// Creates a period from a 1-based month number, rejecting anything
    /// outside `1..=12`.
    #[must_use]
    pub fn new(month: u32, year: i32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { month, year })
    }

    /// Creates a period from a month name (e.g. "January").
    #[must_use]
    pub fn from_name(month: &str, year: i32) -> Option<Self> {
        month_number(month).map(|m| Self { month: m, year })
    }

    /// The period containing a calendar date.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    /// The month name of this period.
    #[must_use]
    pub fn name(self) -> &'static str {
        MONTH_NAMES[self.month as usize - 1]
    }

    /// The period one calendar month later.
    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                month: 1,
                year: self.year + 1,
            }
        } else {
            Self {
                month: self.month + 1,
                year: self.year,
            }
        }
    }

    /// The period one calendar month earlier.
    #[must_use]
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                month: 12,
                year: self.year - 1,
            }
        } else {
            Self {
                month: self.month - 1,
                year: self.year,
            }
        }
    }

    /// First calendar day of the period.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        self.day(1)
    }

    /// Last calendar day of the period.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.next().first_day() - Days::new(1)
    }

    /// Due date of this period's fee under a policy: the 10th of the
    /// period for advance billing, the 10th of the following month for
    /// pay-after-study.
    #[must_use]
    pub fn due_date(self, policy: FeePolicy) -> NaiveDate {
        match policy {
            FeePolicy::Advance => self.day(DUE_DAY),
            FeePolicy::PayAfterStudy => self.next().day(DUE_DAY),
        }
    }

    fn day(self, day: u32) -> NaiveDate {
        // month is validated at construction and day never exceeds 10
        NaiveDate::from_ymd_opt(self.year, self.month, day).expect("valid calendar day")
    }
}

/// A student's validated billing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingProfile {
    /// Monthly tuition amount, strictly positive
    pub monthly_fee: i64,
    /// Due-date policy
    pub policy: FeePolicy,
    /// Enrollment date
    pub join_date: NaiveDate,
}

/// Validates a student's raw directory record into a [`BillingProfile`].
///
/// Returns `Ok(None)` for students that are simply not billable (inactive,
/// archived, or without a positive monthly fee) and
/// `Err(InvalidBillingConfiguration)` for students that are meant to be
/// billed but whose policy or join date cannot be understood.
pub fn billing_profile(student: &student::Model) -> Result<Option<BillingProfile>> {
    if !student.is_active || student.archived {
        return Ok(None);
    }
    let monthly_fee = match student.monthly_fee {
        Some(amount) if amount > 0 => amount,
        _ => return Ok(None),
    };

    let policy = FeePolicy::parse(&student.fee_policy).ok_or_else(|| {
        Error::InvalidBillingConfiguration {
            student_id: student.id,
            message: format!("unrecognized fee policy '{}'", student.fee_policy),
        }
    })?;

    let join_date = NaiveDate::parse_from_str(student.join_date.trim(), "%Y-%m-%d").map_err(
        |e| Error::InvalidBillingConfiguration {
            student_id: student.id,
            message: format!("unparsable join date '{}': {e}", student.join_date),
        },
    )?;

    Ok(Some(BillingProfile {
        monthly_fee,
        policy,
        join_date,
    }))
}

/// Whether a period may be billed for a student who enrolled on
/// `join_date`: a month that ended strictly before enrollment is never
/// billed retroactively.
#[must_use]
pub fn period_billable(period: BillingPeriod, join_date: NaiveDate) -> bool {
    period.last_day() >= join_date
}

/// Whether a period is the student's very first billed month, i.e. the
/// month they joined in.
#[must_use]
pub fn is_first_month(period: BillingPeriod, join_date: NaiveDate) -> bool {
    period.month == join_date.month() && period.year == join_date.year()
}

/// The single period the scheduler bills for a policy as of `today`: the
/// current month for advance billing, the just-finished month for
/// pay-after-study.
#[must_use]
pub fn target_period(policy: FeePolicy, today: NaiveDate) -> BillingPeriod {
    let current = BillingPeriod::containing(today);
    match policy {
        FeePolicy::Advance => current,
        FeePolicy::PayAfterStudy => current.previous(),
    }
}
