//! Shared test utilities for the billing engine.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults.

use crate::{
    core::catalog::BillingPeriod,
    entities::{self, FeePolicy, FeeStatus, FeeType, fee, student},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test student with sensible defaults.
///
/// # Defaults
/// * `teacher_id`: "t1"
/// * `monthly_fee`: 2000
/// * `fee_policy`: "advance"
/// * `join_date`: "2025-01-05"
/// * active, not archived
pub async fn create_test_student(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::student::Model> {
    create_custom_student(db, "t1", name, Some(2000), "advance", "2025-01-05", true, false).await
}

/// Creates a test student with custom parameters.
/// Use this when you need a specific billing configuration.
#[allow(clippy::too_many_arguments)]
pub async fn create_custom_student(
    db: &DatabaseConnection,
    teacher_id: &str,
    name: &str,
    monthly_fee: Option<i64>,
    fee_policy: &str,
    join_date: &str,
    is_active: bool,
    archived: bool,
) -> Result<entities::student::Model> {
    let student = student::ActiveModel {
        teacher_id: Set(teacher_id.to_string()),
        name: Set(name.to_string()),
        monthly_fee: Set(monthly_fee),
        fee_policy: Set(fee_policy.to_string()),
        join_date: Set(join_date.to_string()),
        is_active: Set(is_active),
        archived: Set(archived),
        ..Default::default()
    };
    student.insert(db).await.map_err(Into::into)
}

/// Creates a pending monthly fee for a student's period, amount 2000,
/// due date computed under advance billing (the 10th of the month).
pub async fn create_test_fee(
    db: &DatabaseConnection,
    student: &entities::student::Model,
    month: &str,
    year: i32,
) -> Result<entities::fee::Model> {
    create_custom_fee(db, &student.teacher_id, student.id, 2000, month, year).await
}

/// Creates a pending monthly fee with custom tenant, student, and amount.
pub async fn create_custom_fee(
    db: &DatabaseConnection,
    teacher_id: &str,
    student_id: i64,
    amount: i64,
    month: &str,
    year: i32,
) -> Result<entities::fee::Model> {
    let period = BillingPeriod::from_name(month, year).ok_or_else(|| Error::Config {
        message: format!("test fee uses unrecognized month '{month}'"),
    })?;
    let new_fee = fee::ActiveModel {
        teacher_id: Set(teacher_id.to_string()),
        student_id: Set(student_id),
        amount: Set(amount),
        due_date: Set(period.due_date(FeePolicy::Advance)),
        status: Set(FeeStatus::Pending),
        fee_type: Set(FeeType::Monthly),
        month: Set(period.name().to_string()),
        year: Set(period.year),
        fee_policy: Set(FeePolicy::Advance),
        is_first_month: Set(false),
        paid_on: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    new_fee.insert(db).await.map_err(Into::into)
}

/// Sets up a complete test environment with one student and their January
/// 2030 fee of 2000. Returns (db, student, fee) for common scenarios.
pub async fn setup_with_fee() -> Result<(
    DatabaseConnection,
    entities::student::Model,
    entities::fee::Model,
)> {
    let db = setup_test_db().await?;
    let student = create_test_student(&db, "Test Student").await?;
    let fee = create_test_fee(&db, &student, "January", 2030).await?;
    Ok((db, student, fee))
}
