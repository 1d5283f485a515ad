//! Fee queries and deletion.
//!
//! Reads never trust the persisted status cache: every returned fee
//! carries the status re-derived from its ledger and today's calendar, so
//! a fee that quietly became overdue shows up as overdue without any
//! write having happened. Deletion is guarded (a paid fee is never
//! deleted) and cascades the fee's payments.

use crate::{
    core::status,
    core::tenant::TenantScope,
    entities::{Fee, FeeStatus, Payment, fee, payment},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ModelTrait, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::info;

/// A fee with its full payment ledger, status re-derived as of today.
#[derive(Debug, Clone, Serialize)]
pub struct FeeWithPayments {
    /// The fee, with live status
    pub fee: fee::Model,
    /// Every payment recorded against it, oldest first
    pub payments: Vec<payment::Model>,
}

/// Lists a tenant's fees with their embedded payments, optionally
/// narrowed to one student. Statuses are derived live.
pub async fn list_fees(
    db: &DatabaseConnection,
    scope: &TenantScope,
    student_id: Option<i64>,
) -> Result<Vec<FeeWithPayments>> {
    let mut select = scope.apply(Fee::find(), fee::Column::TeacherId);
    if let Some(student_id) = student_id {
        select = select.filter(fee::Column::StudentId.eq(student_id));
    }
    let rows = select.find_with_related(Payment).all(db).await?;

    let today = Utc::now().date_naive();
    Ok(rows
        .into_iter()
        .map(|(mut fee, payments)| {
            fee.status = status::live_status(&fee, &payments, today);
            FeeWithPayments { fee, payments }
        })
        .collect())
}

/// Fetches one fee with its ledger, status derived live.
pub async fn get_fee(
    db: &DatabaseConnection,
    scope: &TenantScope,
    fee_id: i64,
) -> Result<FeeWithPayments> {
    let mut fee = scope
        .apply(Fee::find_by_id(fee_id), fee::Column::TeacherId)
        .one(db)
        .await?
        .ok_or(Error::FeeNotFound { fee_id })?;
    let payments = Payment::find()
        .filter(payment::Column::FeeId.eq(fee.id))
        .all(db)
        .await?;
    fee.status = status::live_status(&fee, &payments, Utc::now().date_naive());
    Ok(FeeWithPayments { fee, payments })
}

/// Deletes a non-paid fee together with its payments.
///
/// A paid fee (by cache or by ledger) is never deleted and fails with
/// [`Error::PaidFeeDeletionForbidden`]; the fee and its payments are left
/// untouched.
pub async fn delete_fee(db: &DatabaseConnection, scope: &TenantScope, fee_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let fee = scope
        .apply(Fee::find_by_id(fee_id), fee::Column::TeacherId)
        .one(&txn)
        .await?
        .ok_or(Error::FeeNotFound { fee_id })?;

    let payments = Payment::find()
        .filter(payment::Column::FeeId.eq(fee.id))
        .all(&txn)
        .await?;
    if status::live_status(&fee, &payments, Utc::now().date_naive()) == FeeStatus::Paid {
        return Err(Error::PaidFeeDeletionForbidden { fee_id });
    }

    Payment::delete_many()
        .filter(payment::Column::FeeId.eq(fee.id))
        .exec(&txn)
        .await?;
    fee.delete(&txn).await?;

    txn.commit().await?;

    info!(fee_id, "deleted fee and its payments");
    Ok(())
}
