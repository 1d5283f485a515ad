//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Table
//! creation uses `Schema::create_table_from_entity` so the schema always
//! matches the entity definitions without hand-written SQL, plus one
//! hand-written unique index: the billing-period index that turns a racing
//! duplicate generation into a deterministic constraint failure.

use crate::entities::{Fee, Payment, Student};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the environment or returns the default local
/// `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/tuition_billing.sqlite?mode=rwc".to_string())
}

/// Establishes the database connection from [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all tables and the billing-period unique index. Safe to call on
/// every startup; everything is `IF NOT EXISTS`.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Students first: fees reference them, payments reference fees
    let mut student_table = schema.create_table_from_entity(Student);
    let mut fee_table = schema.create_table_from_entity(Fee);
    let mut payment_table = schema.create_table_from_entity(Payment);

    db.execute(builder.build(student_table.if_not_exists())).await?;
    db.execute(builder.build(fee_table.if_not_exists())).await?;
    db.execute(builder.build(payment_table.if_not_exists())).await?;

    // At most one monthly fee per tenant, student, and period; concurrent
    // generation passes race on check-then-insert and the loser must fail.
    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_fees_billing_period \
         ON fees (teacher_id, student_id, month, year, fee_type)",
    )
    .await?;

    Ok(())
}
