//! Payment entity - an immutable ledger entry of money received against a fee.
//!
//! Payments are append-only: they are never edited, and they are only ever
//! deleted as a cascade when their owning non-paid fee is deleted. Totals
//! are always obtained by summing the ledger, never from a cached counter.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How the money arrived. Informational only; no behavior depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentMethod {
    /// Cash at the front desk
    #[sea_orm(string_value = "cash")]
    Cash,
    /// UPI transfer
    #[sea_orm(string_value = "upi")]
    Upi,
    /// Card payment
    #[sea_orm(string_value = "card")]
    Card,
    /// Direct bank transfer
    #[sea_orm(string_value = "bank-transfer")]
    BankTransfer,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The fee this payment is recorded against
    pub fee_id: i64,
    /// Amount received, in integer currency units
    pub amount: i64,
    /// Calendar date the money was received
    pub date: Date,
    /// How the money arrived
    pub method: PaymentMethod,
    /// Optional free-form note from the teacher
    pub note: Option<String>,
    /// When the payment record was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one fee
    #[sea_orm(
        belongs_to = "super::fee::Entity",
        from = "Column::FeeId",
        to = "super::fee::Column::Id"
    )]
    Fee,
}

impl Related<super::fee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
