//! Invoice generation - idempotent creation of monthly fees.
//!
//! The manual entry point bills one explicit (month, year) across all
//! eligible students of one tenant; the scheduler reuses the same
//! per-student core with the policy-implied target period. Idempotency is
//! the existence check on (tenant, student, month, year, monthly), backed
//! by a storage-level unique index so that two racing passes cannot
//! produce a duplicate: the loser's insert fails the constraint and is
//! absorbed as a skip.

use crate::{
    core::catalog::{self, BillingPeriod, BillingProfile},
    core::tenant::TenantScope,
    entities::{Fee, FeeStatus, FeeType, Student, fee, student},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, Set, SqlErr, prelude::*};
use serde::Serialize;
use tracing::{info, warn};

/// Years a manual generation request may name.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2100;

/// Outcome of ensuring one student's fee for one period.
#[derive(Debug, Clone, PartialEq)]
pub enum MonthlyFeeOutcome {
    /// A new pending fee was inserted
    Created(fee::Model),
    /// The period is already billed for this student
    AlreadyBilled,
    /// The period ended before the student enrolled
    NotEligible,
}

/// Result of one generation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationSummary {
    /// Fees newly created by this pass
    pub created: usize,
    /// Students whose period was already billed
    pub skipped: usize,
    /// Students whose processing failed and was isolated
    pub failed: usize,
    /// The fees created by this pass
    pub fees: Vec<fee::Model>,
}

/// Generates the monthly fees of one period for every eligible student of
/// one tenant.
///
/// A single student's failure (invalid billing configuration, storage
/// error on their row) is logged and counted, never aborting the rest of
/// the batch. Only a bad request or a failure to load the roster at all is
/// a hard error.
pub async fn generate_monthly_fees(
    db: &DatabaseConnection,
    scope: &TenantScope,
    month: &str,
    year: i32,
) -> Result<GenerationSummary> {
    let teacher_id = scope
        .teacher_id()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| Error::GenerationValidation {
            message: "generation requires a concrete tenant".to_string(),
        })?;
    let period =
        BillingPeriod::from_name(month, year).ok_or_else(|| Error::GenerationValidation {
            message: format!("unrecognized month '{month}'"),
        })?;
    if !YEAR_RANGE.contains(&year) {
        return Err(Error::GenerationValidation {
            message: format!("year {year} is out of range"),
        });
    }

    let students = Student::find()
        .filter(student::Column::TeacherId.eq(teacher_id))
        .all(db)
        .await?;

    let mut summary = GenerationSummary::default();
    for student in &students {
        let profile = match catalog::billing_profile(student) {
            Ok(Some(profile)) => profile,
            Ok(None) => continue,
            Err(err) => {
                warn!(student_id = student.id, %err, "skipping student in generation pass");
                summary.failed += 1;
                continue;
            }
        };
        match ensure_monthly_fee(db, student, &profile, period).await {
            Ok(MonthlyFeeOutcome::Created(fee)) => {
                summary.created += 1;
                summary.fees.push(fee);
            }
            Ok(MonthlyFeeOutcome::AlreadyBilled) => summary.skipped += 1,
            Ok(MonthlyFeeOutcome::NotEligible) => {}
            Err(err) => {
                warn!(student_id = student.id, %err, "skipping student in generation pass");
                summary.failed += 1;
            }
        }
    }

    info!(
        teacher_id,
        month = period.name(),
        year,
        created = summary.created,
        skipped = summary.skipped,
        failed = summary.failed,
        "generated monthly fees"
    );
    Ok(summary)
}

/// The shared idempotent core: bill one student for one period, unless the
/// period is gated by the join date or already billed.
pub(crate) async fn ensure_monthly_fee<C: ConnectionTrait>(
    db: &C,
    student: &student::Model,
    profile: &BillingProfile,
    period: BillingPeriod,
) -> Result<MonthlyFeeOutcome> {
    if !catalog::period_billable(period, profile.join_date) {
        return Ok(MonthlyFeeOutcome::NotEligible);
    }

    let existing = Fee::find()
        .filter(fee::Column::TeacherId.eq(student.teacher_id.as_str()))
        .filter(fee::Column::StudentId.eq(student.id))
        .filter(fee::Column::Month.eq(period.name()))
        .filter(fee::Column::Year.eq(period.year))
        .filter(fee::Column::FeeType.eq(FeeType::Monthly))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(MonthlyFeeOutcome::AlreadyBilled);
    }

    let new_fee = fee::ActiveModel {
        teacher_id: Set(student.teacher_id.clone()),
        student_id: Set(student.id),
        amount: Set(profile.monthly_fee),
        due_date: Set(period.due_date(profile.policy)),
        status: Set(FeeStatus::Pending),
        fee_type: Set(FeeType::Monthly),
        month: Set(period.name().to_string()),
        year: Set(period.year),
        fee_policy: Set(profile.policy),
        is_first_month: Set(catalog::is_first_month(period, profile.join_date)),
        paid_on: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    match new_fee.insert(db).await {
        Ok(fee) => Ok(MonthlyFeeOutcome::Created(fee)),
        // A concurrent pass won the race; the unique period index turns the
        // duplicate into a deterministic skip.
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Ok(MonthlyFeeOutcome::AlreadyBilled)
        }
        Err(err) => Err(err.into()),
    }
}
