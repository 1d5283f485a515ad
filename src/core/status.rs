//! Fee status derivation.
//!
//! Status is a derived view over immutable facts: the fee amount, the due
//! date, and the payment ledger. The persisted `status` column is only a
//! write-refreshed cache for query convenience; anything that needs "is it
//! overdue right now" semantics must re-derive through these functions,
//! since a fee quietly becomes overdue purely by the calendar.

use crate::entities::{FeeStatus, fee, payment};
use chrono::NaiveDate;

/// Sums the full payment ledger for a fee. Totals are always obtained this
/// way, never by incrementing a cached counter.
#[must_use]
pub fn total_paid(payments: &[payment::Model]) -> i64 {
    payments.iter().map(|p| p.amount).sum()
}

/// Derives a fee's status from its amount, the ledger total, and the
/// calendar. Pure and side-effect free; safe on any thread.
///
/// 1. The ledger covers the amount -> paid.
/// 2. Otherwise, today is past the due date -> overdue (date-only
///    comparison; the due date itself is still pending).
/// 3. Otherwise -> pending.
#[must_use]
pub fn derive_status(amount: i64, total_paid: i64, due_date: NaiveDate, today: NaiveDate) -> FeeStatus {
    if total_paid >= amount {
        FeeStatus::Paid
    } else if today > due_date {
        FeeStatus::Overdue
    } else {
        FeeStatus::Pending
    }
}

/// Live status of a stored fee as of `today`.
///
/// A fee whose cache already says paid stays paid: `paid_on` is set once
/// and immutable, and the manual mark-paid override records no itemized
/// payment, so the ledger alone may undercount a settled fee. For every
/// other fee the cache is ignored and the status re-derived.
#[must_use]
pub fn live_status(fee: &fee::Model, payments: &[payment::Model], today: NaiveDate) -> FeeStatus {
    if fee.status == FeeStatus::Paid {
        return FeeStatus::Paid;
    }
    derive_status(fee.amount, total_paid(payments), fee.due_date, today)
}
