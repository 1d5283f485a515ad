//! Recurring billing scheduler.
//!
//! A background task ticks once at startup and then on a fixed interval
//! (nominally daily). Each tick is a full, independent pass: every
//! billable student gets the single period their policy implies — the
//! current month under advance billing, the just-finished month under
//! pay-after-study. The tick keeps no last-run bookkeeping; idempotency
//! is entirely the generator's existence check, so ticking arbitrarily
//! often is safe. A roster-level storage failure aborts the tick and is
//! retried on the next interval; a single student's failure is isolated.

use crate::{
    core::{catalog, invoice, invoice::MonthlyFeeOutcome},
    entities::{Student, student},
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseConnection, prelude::*};
use std::time::Duration;
use tokio::time;
use tracing::{info, warn};

/// Aggregate counters of one scheduler tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Fees newly created by this tick
    pub created: usize,
    /// Students whose target period was already billed
    pub skipped: usize,
    /// Students whose processing failed and was isolated
    pub failed: usize,
}

/// Runs the scheduler loop forever: one tick immediately, then one per
/// `interval`.
pub async fn run(db: DatabaseConnection, interval: Duration) {
    let mut ticker = time::interval(interval);
    loop {
        ticker.tick().await;
        let today = Utc::now().date_naive();
        match process_tick(&db, today).await {
            Ok(summary) => info!(
                created = summary.created,
                skipped = summary.skipped,
                failed = summary.failed,
                "billing tick complete"
            ),
            Err(err) => warn!(%err, "billing tick failed"),
        }
    }
}

/// Spawns [`run`] as a background tokio task.
pub fn spawn(db: DatabaseConnection, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run(db, interval))
}

/// One idempotent pass over every billable student of every tenant,
/// billing each student's policy-implied target period as of `today`.
pub async fn process_tick(db: &DatabaseConnection, today: NaiveDate) -> Result<TickSummary> {
    // A failure here aborts the whole tick; the next interval retries.
    let students = Student::find()
        .filter(student::Column::IsActive.eq(true))
        .filter(student::Column::Archived.eq(false))
        .all(db)
        .await?;

    let mut summary = TickSummary::default();
    for student in &students {
        let profile = match catalog::billing_profile(student) {
            Ok(Some(profile)) => profile,
            Ok(None) => continue,
            Err(err) => {
                warn!(student_id = student.id, %err, "skipping student in billing tick");
                summary.failed += 1;
                continue;
            }
        };
        let period = catalog::target_period(profile.policy, today);
        match invoice::ensure_monthly_fee(db, student, &profile, period).await {
            Ok(MonthlyFeeOutcome::Created(fee)) => {
                info!(
                    student_id = student.id,
                    fee_id = fee.id,
                    month = %fee.month,
                    year = fee.year,
                    "billed student for target period"
                );
                summary.created += 1;
            }
            Ok(MonthlyFeeOutcome::AlreadyBilled) => summary.skipped += 1,
            Ok(MonthlyFeeOutcome::NotEligible) => {}
            Err(err) => {
                warn!(student_id = student.id, %err, "skipping student in billing tick");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
