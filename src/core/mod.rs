//! Core business logic - framework-agnostic billing operations.
//!
//! Everything here works over a plain `DatabaseConnection` and returns
//! structured data; the surrounding application (HTTP layer, UI, chat) is
//! a caller, not a concern. This is the crate's public surface.

/// Billable-student catalog and billing-period calendar rules
pub mod catalog;
/// Fee listing, lookup, and guarded deletion
pub mod fee;
/// Idempotent monthly invoice generation
pub mod invoice;
/// Payment application, manual overrides, and period rollover
pub mod payment;
/// Per-period collection summaries
pub mod report;
/// Pure fee-status derivation
pub mod status;
/// Tenant scoping threaded through every operation
pub mod tenant;
