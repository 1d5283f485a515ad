//! Student entity - the billing-relevant projection of the student directory.
//!
//! The full student record is owned by the external directory; this table
//! mirrors only the fields the billing engine needs. `fee_policy` and
//! `join_date` are kept as the raw directory strings and validated at the
//! catalog boundary, so one student's malformed record never poisons a
//! whole generation batch.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student billing profile database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Unique identifier for the student
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning tenant (teacher account) id
    pub teacher_id: String,
    /// Display name, carried for logging only
    pub name: String,
    /// Monthly tuition amount; absent means the student is not billable
    pub monthly_fee: Option<i64>,
    /// Raw due-date policy value ("advance" or "pay-after-study")
    pub fee_policy: String,
    /// Raw enrollment date, `YYYY-MM-DD`
    pub join_date: String,
    /// Whether the student is currently enrolled
    pub is_active: bool,
    /// Whether the student has been archived by the teacher
    pub archived: bool,
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One student has many fees
    #[sea_orm(has_many = "super::fee::Entity")]
    Fees,
}

impl Related<super::fee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
