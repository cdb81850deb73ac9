//! Grant store: which (role, resource) pairs are active across the five
//! resource classes, plus the atomic role-grant synchronizer.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use warden_core::{ResourceClass, ResourceId, RoleId, UserId};

use crate::sync::{InvalidIds, SyncOutcome, SyncRequest};

mod in_memory;
mod postgres;

pub use in_memory::InMemoryGrantStore;
pub use postgres::PgGrantStore;

/// A role as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Error)]
pub enum GrantStoreError {
    #[error("unknown role {0}")]
    UnknownRole(RoleId),

    #[error(transparent)]
    Validation(#[from] InvalidIds),

    #[error("grant store failure: {0}")]
    Store(String),
}

/// Storage of role grants.
///
/// Grant rows are soft-deactivated, never deleted: synchronization toggles
/// `active` on an existing row or inserts a new one only if none exists, so
/// audit history survives.
#[async_trait]
pub trait GrantStore: Send + Sync {
    async fn find_role(&self, role_id: RoleId) -> Result<Option<RoleRecord>, GrantStoreError>;

    /// Resource ids with an active grant for `(role, class)`, ascending.
    async fn active_resource_ids(
        &self,
        role_id: RoleId,
        class: ResourceClass,
    ) -> Result<BTreeSet<ResourceId>, GrantStoreError>;

    /// Existence check on an active grant row. No side effects; used both by
    /// the authorization engine and for ad-hoc capability probes.
    async fn has_grant(
        &self,
        role_id: RoleId,
        class: ResourceClass,
        resource_id: ResourceId,
    ) -> Result<bool, GrantStoreError>;

    /// Replace the role's grant membership for every class supplied in
    /// `desired`, atomically: after the call either every supplied class
    /// reflects its desired set, or (on any failure) none does.
    ///
    /// Classes omitted from `desired` are untouched.
    async fn sync_role(
        &self,
        role_id: RoleId,
        desired: &SyncRequest,
        actor: Option<UserId>,
    ) -> Result<SyncOutcome, GrantStoreError>;
}
