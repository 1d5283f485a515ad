//! Payment application and rollover.
//!
//! Recording a payment is one database transaction: insert the ledger row,
//! re-sum the full ledger, re-derive the status, stamp `paid_on` on the
//! first transition into paid, persist the refreshed cache. The rollover
//! to the next billing period fires exactly on the not-paid -> paid
//! transition of a monthly fee, observed inside that same transaction, so
//! an over-payment against an already-paid fee can never re-trigger it.

use crate::{
    core::catalog::BillingPeriod,
    core::status,
    core::tenant::TenantScope,
    entities::{Fee, FeeStatus, FeeType, Payment, PaymentMethod, fee, payment},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

/// A payment to record against a fee.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    /// Amount received, in integer currency units; must be positive
    pub amount: i64,
    /// Calendar date the money was received
    pub date: NaiveDate,
    /// How the money arrived
    pub method: PaymentMethod,
    /// Optional free-form note
    pub note: Option<String>,
}

/// Records a payment against a fee and refreshes the fee's cached status,
/// as one atomic unit of work.
///
/// The full ledger is re-summed rather than incremented so concurrent
/// partial payments are both counted regardless of commit order.
/// Overpayment is accepted and recorded in full; the surplus stays visible
/// in the ledger. Returns the new payment and the refreshed fee.
pub async fn record_payment(
    db: &DatabaseConnection,
    scope: &TenantScope,
    fee_id: i64,
    new_payment: NewPayment,
) -> Result<(payment::Model, fee::Model)> {
    if new_payment.amount <= 0 {
        return Err(Error::InvalidAmount {
            amount: new_payment.amount,
        });
    }

    let txn = db.begin().await?;

    let fee = scope
        .apply(Fee::find_by_id(fee_id), fee::Column::TeacherId)
        .one(&txn)
        .await?
        .ok_or(Error::FeeNotFound { fee_id })?;
    let previous_status = fee.status;

    let payment = payment::ActiveModel {
        fee_id: Set(fee.id),
        amount: Set(new_payment.amount),
        date: Set(new_payment.date),
        method: Set(new_payment.method),
        note: Set(new_payment.note),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let ledger = Payment::find()
        .filter(payment::Column::FeeId.eq(fee.id))
        .all(&txn)
        .await?;
    let today = Utc::now().date_naive();
    // A settled fee stays settled; extra money is recorded, nothing more.
    let new_status = if previous_status == FeeStatus::Paid {
        FeeStatus::Paid
    } else {
        status::derive_status(fee.amount, status::total_paid(&ledger), fee.due_date, today)
    };

    let mut active: fee::ActiveModel = fee.clone().into();
    active.status = Set(new_status);
    if new_status == FeeStatus::Paid && fee.paid_on.is_none() {
        active.paid_on = Set(Some(new_payment.date));
    }
    let updated = active.update(&txn).await?;

    if new_status == FeeStatus::Paid && previous_status != FeeStatus::Paid {
        roll_over(&txn, &updated).await?;
    }

    txn.commit().await?;

    info!(
        fee_id = updated.id,
        payment_id = payment.id,
        amount = payment.amount,
        status = ?updated.status,
        "recorded payment"
    );
    Ok((payment, updated))
}

/// Manually overrides a fee's status without recording an itemized
/// payment (the teacher marking a fee paid at the front desk).
///
/// A transition into paid stamps `paid_on` with today's date if unset and
/// triggers the same rollover rule as an itemized payment.
pub async fn set_fee_status(
    db: &DatabaseConnection,
    scope: &TenantScope,
    fee_id: i64,
    new_status: FeeStatus,
) -> Result<fee::Model> {
    let txn = db.begin().await?;

    let fee = scope
        .apply(Fee::find_by_id(fee_id), fee::Column::TeacherId)
        .one(&txn)
        .await?
        .ok_or(Error::FeeNotFound { fee_id })?;
    let previous_status = fee.status;

    let mut active: fee::ActiveModel = fee.clone().into();
    active.status = Set(new_status);
    if new_status == FeeStatus::Paid && fee.paid_on.is_none() {
        active.paid_on = Set(Some(Utc::now().date_naive()));
    }
    let updated = active.update(&txn).await?;

    if new_status == FeeStatus::Paid && previous_status != FeeStatus::Paid {
        roll_over(&txn, &updated).await?;
    }

    txn.commit().await?;

    info!(fee_id = updated.id, status = ?updated.status, "manually set fee status");
    Ok(updated)
}

/// Creates the following month's fee after a monthly fee was fully paid:
/// same student, amount, and policy; month advanced by one; due date
/// recomputed under the same policy rule; pending and no longer flagged as
/// a first month.
///
/// Runs inside the caller's transaction. Re-checks for an existing
/// next-period fee so a scheduler pass that already billed the month keeps
/// the rollover idempotent.
async fn roll_over<C: ConnectionTrait>(txn: &C, paid_fee: &fee::Model) -> Result<Option<fee::Model>> {
    if paid_fee.fee_type != FeeType::Monthly {
        return Ok(None);
    }
    let period = BillingPeriod::from_name(&paid_fee.month, paid_fee.year).ok_or_else(|| {
        Error::Config {
            message: format!(
                "fee {} stores unrecognized month '{}'",
                paid_fee.id, paid_fee.month
            ),
        }
    })?;
    let next = period.next();

    let existing = Fee::find()
        .filter(fee::Column::TeacherId.eq(paid_fee.teacher_id.as_str()))
        .filter(fee::Column::StudentId.eq(paid_fee.student_id))
        .filter(fee::Column::Month.eq(next.name()))
        .filter(fee::Column::Year.eq(next.year))
        .filter(fee::Column::FeeType.eq(FeeType::Monthly))
        .one(txn)
        .await?;
    if existing.is_some() {
        return Ok(None);
    }

    let rolled = fee::ActiveModel {
        teacher_id: Set(paid_fee.teacher_id.clone()),
        student_id: Set(paid_fee.student_id),
        amount: Set(paid_fee.amount),
        due_date: Set(next.due_date(paid_fee.fee_policy)),
        status: Set(FeeStatus::Pending),
        fee_type: Set(FeeType::Monthly),
        month: Set(next.name().to_string()),
        year: Set(next.year),
        fee_policy: Set(paid_fee.fee_policy),
        is_first_month: Set(false),
        paid_on: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    info!(
        fee_id = paid_fee.id,
        rolled_fee_id = rolled.id,
        month = %rolled.month,
        year = rolled.year,
        "rolled over to next billing period"
    );
    Ok(Some(rolled))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::QueryOrder;

    fn cash(amount: i64, y: i32, m: u32, d: u32) -> NewPayment {
        NewPayment {
            amount,
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            method: PaymentMethod::Cash,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_record_payment_validation() -> Result<()> {
        let (db, _student, fee) = setup_with_fee().await?;
        let scope = TenantScope::tenant("t1");

        let result = record_payment(&db, &scope, fee.id, cash(0, 2030, 1, 5)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: 0 }));

        let result = record_payment(&db, &scope, fee.id, cash(-100, 2030, 1, 5)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -100 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_unknown_fee() -> Result<()> {
        let db = setup_test_db().await?;

        let result =
            record_payment(&db, &TenantScope::tenant("t1"), 999, cash(100, 2030, 1, 5)).await;
        assert!(matches!(result.unwrap_err(), Error::FeeNotFound { fee_id: 999 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_is_tenant_scoped() -> Result<()> {
        let (db, _student, fee) = setup_with_fee().await?;

        // Another tenant cannot pay against this fee
        let result =
            record_payment(&db, &TenantScope::tenant("t2"), fee.id, cash(100, 2030, 1, 5)).await;
        assert!(matches!(result.unwrap_err(), Error::FeeNotFound { .. }));

        // Superadmin can
        let (_, updated) =
            record_payment(&db, &TenantScope::Superadmin, fee.id, cash(100, 2030, 1, 5)).await?;
        assert_eq!(updated.id, fee.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_partial_payment_keeps_fee_open() -> Result<()> {
        // Fee of 2000 for January 2030, due far in the future
        let (db, _student, fee) = setup_with_fee().await?;
        let scope = TenantScope::tenant("t1");

        let (payment, updated) =
            record_payment(&db, &scope, fee.id, cash(800, 2030, 1, 3)).await?;
        assert_eq!(payment.amount, 800);
        assert_eq!(updated.status, FeeStatus::Pending);
        assert!(updated.paid_on.is_none());

        // No rollover for a partially paid fee
        assert_eq!(Fee::find().all(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_full_payment_pays_and_rolls_over() -> Result<()> {
        let (db, student, fee) = setup_with_fee().await?;
        let scope = TenantScope::tenant("t1");

        let (_, updated) = record_payment(&db, &scope, fee.id, cash(2000, 2030, 1, 8)).await?;
        assert_eq!(updated.status, FeeStatus::Paid);
        assert_eq!(updated.paid_on, NaiveDate::from_ymd_opt(2030, 1, 8));

        // Exactly one next-period fee was created
        let fees = Fee::find().order_by_asc(fee::Column::Id).all(&db).await?;
        assert_eq!(fees.len(), 2);
        let rolled = &fees[1];
        assert_eq!(rolled.student_id, student.id);
        assert_eq!(rolled.amount, 2000);
        assert_eq!(rolled.month, "February");
        assert_eq!(rolled.year, 2030);
        assert_eq!(rolled.status, FeeStatus::Pending);
        assert_eq!(rolled.due_date, NaiveDate::from_ymd_opt(2030, 2, 10).unwrap());
        assert!(!rolled.is_first_month);

        Ok(())
    }

    #[tokio::test]
    async fn test_two_partial_payments_sum_to_paid() -> Result<()> {
        let (db, _student, fee) = setup_with_fee().await?;
        let scope = TenantScope::tenant("t1");

        let (_, after_first) = record_payment(&db, &scope, fee.id, cash(1200, 2030, 1, 3)).await?;
        assert_eq!(after_first.status, FeeStatus::Pending);

        let (_, after_second) = record_payment(&db, &scope, fee.id, cash(800, 2030, 1, 7)).await?;
        assert_eq!(after_second.status, FeeStatus::Paid);
        // paid_on carries the date of the payment that crossed the threshold
        assert_eq!(after_second.paid_on, NaiveDate::from_ymd_opt(2030, 1, 7));

        Ok(())
    }

    #[tokio::test]
    async fn test_overpayment_does_not_re_trigger_rollover() -> Result<()> {
        let (db, _student, fee) = setup_with_fee().await?;
        let scope = TenantScope::tenant("t1");

        record_payment(&db, &scope, fee.id, cash(2000, 2030, 1, 8)).await?;
        assert_eq!(Fee::find().all(&db).await?.len(), 2);

        // Overpayment on the now-paid fee is recorded but rolls nothing over
        let (payment, updated) = record_payment(&db, &scope, fee.id, cash(500, 2030, 1, 20)).await?;
        assert_eq!(payment.amount, 500);
        assert_eq!(updated.status, FeeStatus::Paid);
        // paid_on is immutable after the first paid transition
        assert_eq!(updated.paid_on, NaiveDate::from_ymd_opt(2030, 1, 8));
        assert_eq!(Fee::find().all(&db).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_rollover_crosses_year_boundary() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "S").await?;
        let fee = create_test_fee(&db, &student, "December", 2030).await?;

        let (_, updated) = record_payment(
            &db,
            &TenantScope::tenant("t1"),
            fee.id,
            cash(2000, 2030, 12, 5),
        )
        .await?;
        assert_eq!(updated.status, FeeStatus::Paid);

        let fees = Fee::find().order_by_asc(fee::Column::Id).all(&db).await?;
        assert_eq!(fees.len(), 2);
        assert_eq!(fees[1].month, "January");
        assert_eq!(fees[1].year, 2031);
        assert_eq!(fees[1].due_date, NaiveDate::from_ymd_opt(2031, 1, 10).unwrap());

        Ok(())
    }

    #[tokio::test]
    async fn test_rollover_skips_already_billed_next_period() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "S").await?;
        let january = create_test_fee(&db, &student, "January", 2030).await?;
        // The scheduler already billed February
        create_test_fee(&db, &student, "February", 2030).await?;

        record_payment(
            &db,
            &TenantScope::tenant("t1"),
            january.id,
            cash(2000, 2030, 1, 8),
        )
        .await?;

        // Still exactly two fees; no duplicate February
        let fees = Fee::find().all(&db).await?;
        assert_eq!(fees.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_fee_status_paid_stamps_and_rolls_over() -> Result<()> {
        let (db, _student, fee) = setup_with_fee().await?;
        let scope = TenantScope::tenant("t1");

        let updated = set_fee_status(&db, &scope, fee.id, FeeStatus::Paid).await?;
        assert_eq!(updated.status, FeeStatus::Paid);
        assert!(updated.paid_on.is_some());

        // The manual override rolls over exactly like an itemized payment
        assert_eq!(Fee::find().all(&db).await?.len(), 2);

        // Marking it paid again is a no-op for rollover
        let again = set_fee_status(&db, &scope, fee.id, FeeStatus::Paid).await?;
        assert_eq!(again.status, FeeStatus::Paid);
        assert_eq!(Fee::find().all(&db).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_fee_status_unknown_fee() -> Result<()> {
        let db = setup_test_db().await?;

        let result =
            set_fee_status(&db, &TenantScope::tenant("t1"), 42, FeeStatus::Paid).await;
        assert!(matches!(result.unwrap_err(), Error::FeeNotFound { fee_id: 42 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_note_and_method_stored() -> Result<()> {
        let (db, _student, fee) = setup_with_fee().await?;

        let (payment, _) = record_payment(
            &db,
            &TenantScope::tenant("t1"),
            fee.id,
            NewPayment {
                amount: 300,
                date: NaiveDate::from_ymd_opt(2030, 1, 4).unwrap(),
                method: PaymentMethod::Upi,
                note: Some("first installment".to_string()),
            },
        )
        .await?;

        let stored = Payment::find_by_id(payment.id).one(&db).await?.unwrap();
        assert_eq!(stored.method, PaymentMethod::Upi);
        assert_eq!(stored.note.as_deref(), Some("first installment"));

        Ok(())
    }
}
