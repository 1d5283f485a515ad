//! Fee entity - a billable obligation for one student and one period.
//!
//! The `status` column is a denormalized cache: it is refreshed after every
//! ledger-mutating write, but the ground truth is always recomputable from
//! the amount, the due date, and the payment ledger. Monthly fees carry the
//! billed `month` name and `year`; the pair plus the tenant and student is
//! unique for `fee_type = monthly`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Derived payment status of a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum FeeStatus {
    /// Not fully paid, due date not yet passed
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Not fully paid and past the due date
    #[sea_orm(string_value = "overdue")]
    Overdue,
    /// Ledger total covers the fee amount (or a manual override)
    #[sea_orm(string_value = "paid")]
    Paid,
}

/// Kind of billing obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum FeeType {
    /// Recurring monthly tuition fee, the only type the generator produces
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// One-off charge (admission, materials)
    #[sea_orm(string_value = "one-time")]
    OneTime,
    /// Prepaid package of classes
    #[sea_orm(string_value = "package")]
    Package,
    /// Billed per attended class
    #[sea_orm(string_value = "per-class")]
    PerClass,
    /// Anything else the teacher bills manually
    #[sea_orm(string_value = "custom")]
    Custom,
}

/// When a monthly fee falls due relative to the studied month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum FeePolicy {
    /// Billed ahead: the fee for month M is due on the 10th of M
    #[sea_orm(string_value = "advance")]
    Advance,
    /// Billed after study: the fee for month M is due on the 10th of M+1
    #[sea_orm(string_value = "pay-after-study")]
    PayAfterStudy,
}

impl FeePolicy {
    /// Parses a raw policy value as stored by the external student
    /// directory. Returns `None` for anything unrecognized.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "advance" => Some(Self::Advance),
            "pay-after-study" => Some(Self::PayAfterStudy),
            _ => None,
        }
    }
}

/// Fee database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fees")]
pub struct Model {
    /// Unique identifier for the fee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant (teacher account) id
    pub teacher_id: String,
    /// The student this fee bills
    pub student_id: i64,
    /// Amount owed, in integer currency units
    pub amount: i64,
    /// Calendar date the fee falls due
    pub due_date: Date,
    /// Cached payment status, recomputable from the ledger at any time
    pub status: FeeStatus,
    /// Kind of obligation; the generator only ever creates `monthly`
    pub fee_type: FeeType,
    /// Billed month name (e.g. "January") for monthly fees
    pub month: String,
    /// Billed year for monthly fees
    pub year: i32,
    /// Due-date policy inherited from the student at generation time
    pub fee_policy: FeePolicy,
    /// Whether this is the student's very first billed month
    pub is_first_month: bool,
    /// Date the fee became fully paid; set once, never changed after
    pub paid_on: Option<Date>,
    /// When the fee record was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Fee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One fee has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    /// Each fee belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
