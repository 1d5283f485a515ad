//! Collection reporting.
//!
//! Aggregates one billing period's fees into the numbers the dashboard
//! shows: how much was billed, how much actually arrived, what is still
//! outstanding, and how the fees split by status. Statuses are derived
//! live, so an aging unpaid fee counts as overdue here even though no
//! write ever touched it.

use crate::{
    core::catalog::BillingPeriod,
    core::status,
    core::tenant::TenantScope,
    entities::{Fee, FeeStatus, Payment, fee},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::prelude::*;
use serde::Serialize;

/// Aggregate collection numbers for one tenant and one billing period.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    /// Billed month name
    pub month: String,
    /// Billed year
    pub year: i32,
    /// Sum of fee amounts billed in the period
    pub total_billed: i64,
    /// Sum of all payments recorded against those fees
    pub total_collected: i64,
    /// Sum of per-fee shortfalls (surplus from overpayment never offsets
    /// another fee's balance)
    pub outstanding: i64,
    /// Fees fully paid
    pub paid_count: usize,
    /// Fees open and not yet due
    pub pending_count: usize,
    /// Fees open and past due
    pub overdue_count: usize,
}

/// Builds the collection summary for one (month, year) within the scope.
pub async fn collection_summary(
    db: &DatabaseConnection,
    scope: &TenantScope,
    month: &str,
    year: i32,
) -> Result<CollectionSummary> {
    let period =
        BillingPeriod::from_name(month, year).ok_or_else(|| Error::GenerationValidation {
            message: format!("unrecognized month '{month}'"),
        })?;

    let rows = scope
        .apply(Fee::find(), fee::Column::TeacherId)
        .filter(fee::Column::Month.eq(period.name()))
        .filter(fee::Column::Year.eq(period.year))
        .find_with_related(Payment)
        .all(db)
        .await?;

    let today = Utc::now().date_naive();
    let mut summary = CollectionSummary {
        month: period.name().to_string(),
        year: period.year,
        total_billed: 0,
        total_collected: 0,
        outstanding: 0,
        paid_count: 0,
        pending_count: 0,
        overdue_count: 0,
    };

    for (fee, payments) in &rows {
        let collected = status::total_paid(payments);
        summary.total_billed += fee.amount;
        summary.total_collected += collected;
        summary.outstanding += (fee.amount - collected).max(0);
        match status::live_status(fee, payments, today) {
            FeeStatus::Paid => summary.paid_count += 1,
            FeeStatus::Pending => summary.pending_count += 1,
            FeeStatus::Overdue => summary.overdue_count += 1,
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::payment::{NewPayment, record_payment};
    use crate::core::tenant::TenantScope;
    use crate::entities::PaymentMethod;
    use crate::test_utils::*;
    use chrono::NaiveDate;

    fn cash(amount: i64, y: i32, m: u32, d: u32) -> NewPayment {
        NewPayment {
            amount,
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            method: PaymentMethod::Cash,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_collection_summary_aggregates_period() -> Result<()> {
        let db = setup_test_db().await?;
        let scope = TenantScope::tenant("t1");

        let paid_up = create_test_student(&db, "PaidUp").await?;
        let partial = create_test_student(&db, "Partial").await?;
        let silent = create_test_student(&db, "Silent").await?;

        let fee_paid = create_test_fee(&db, &paid_up, "January", 2030).await?;
        let fee_partial = create_test_fee(&db, &partial, "January", 2030).await?;
        create_test_fee(&db, &silent, "January", 2030).await?;
        // A different period must not leak into the summary
        create_test_fee(&db, &silent, "February", 2030).await?;

        record_payment(&db, &scope, fee_paid.id, cash(2000, 2030, 1, 5)).await?;
        record_payment(&db, &scope, fee_partial.id, cash(600, 2030, 1, 6)).await?;

        let summary = collection_summary(&db, &scope, "January", 2030).await?;
        // The paid fee rolled February over; only January is aggregated here
        assert_eq!(summary.total_billed, 6000);
        assert_eq!(summary.total_collected, 2600);
        assert_eq!(summary.outstanding, 3400);
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.overdue_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_collection_summary_counts_overdue_live() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "S").await?;
        create_test_fee(&db, &student, "January", 2020).await?;

        let summary =
            collection_summary(&db, &TenantScope::tenant("t1"), "January", 2020).await?;
        assert_eq!(summary.overdue_count, 1);
        assert_eq!(summary.pending_count, 0);
        assert_eq!(summary.outstanding, 2000);

        Ok(())
    }

    #[tokio::test]
    async fn test_collection_summary_rejects_bad_month() -> Result<()> {
        let db = setup_test_db().await?;

        let result = collection_summary(&db, &TenantScope::tenant("t1"), "Sextilis", 2030).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::GenerationValidation { .. }
        ));

        Ok(())
    }
}
