//! Tenant scoping for every read and write.
//!
//! Each tenant is one teacher account whose data is isolated from every
//! other tenant. The scope is a first-class value threaded through every
//! operation, never an optional filter a call site can forget; the single
//! privileged superadmin scope queries across tenants.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};

/// The tenant context of a call into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantScope {
    /// Scoped to one teacher account's data
    Tenant(String),
    /// Privileged cross-tenant access
    Superadmin,
}

impl TenantScope {
    /// Convenience constructor for a concrete tenant scope.
    pub fn tenant(teacher_id: impl Into<String>) -> Self {
        Self::Tenant(teacher_id.into())
    }

    /// Applies the scope to a query by filtering on the entity's owning
    /// teacher-id column. Superadmin leaves the query unfiltered.
    pub fn apply<E: EntityTrait, C: ColumnTrait>(&self, select: Select<E>, column: C) -> Select<E> {
        match self {
            Self::Tenant(teacher_id) => select.filter(column.eq(teacher_id.as_str())),
            Self::Superadmin => select,
        }
    }

    /// The concrete teacher id, if this scope is tenant-bound.
    #[must_use]
    pub fn teacher_id(&self) -> Option<&str> {
        match self {
            Self::Tenant(teacher_id) => Some(teacher_id),
            Self::Superadmin => None,
        }
    }
}
