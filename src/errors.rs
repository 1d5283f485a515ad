//! Unified error types and result handling for the billing engine.
//!
//! Domain errors (unknown fee, deletion guard, bad billing configuration)
//! are distinct variants so callers can map them onto their own surface;
//! storage errors propagate through the `Database` variant.

use thiserror::Error;

/// All errors the billing engine can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// A payment or lookup referenced a fee that does not exist (or sits
    /// outside the caller's tenant scope).
    #[error("Fee {fee_id} not found")]
    FeeNotFound {
        /// The fee id that failed to resolve
        fee_id: i64,
    },

    /// A paid fee was targeted for deletion.
    #[error("Fee {fee_id} is paid and cannot be deleted")]
    PaidFeeDeletionForbidden {
        /// The fee id whose deletion was refused
        fee_id: i64,
    },

    /// A student meant to be billed carries a missing or invalid billing
    /// configuration (amount, policy, or join date).
    #[error("Student {student_id} has an invalid billing configuration: {message}")]
    InvalidBillingConfiguration {
        /// The student whose record is invalid
        student_id: i64,
        /// What exactly is wrong with the record
        message: String,
    },

    /// A manual generation request carried a bad month, year, or tenant.
    #[error("Invalid generation request: {message}")]
    GenerationValidation {
        /// What exactly is wrong with the request
        message: String,
    },

    /// A payment amount was zero or negative.
    #[error("Invalid payment amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// Configuration error (settings file, malformed stored value)
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
