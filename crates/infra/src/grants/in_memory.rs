//! In-memory grant store.
//!
//! Intended for tests/dev. The whole store sits behind one mutex, which gives
//! sync the same all-or-nothing visibility the Postgres transaction provides.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warden_core::{ResourceClass, ResourceId, RoleId, UserId};

use super::{GrantStore, GrantStoreError, RoleRecord};
use crate::sync::{ClassOutcome, GrantDiff, SyncOutcome, SyncRequest};

#[derive(Debug, Clone)]
struct GrantRow {
    active: bool,
    granted_at: DateTime<Utc>,
    granted_by: Option<UserId>,
    revoked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Inner {
    roles: HashMap<RoleId, RoleRecord>,
    grants: HashMap<(RoleId, ResourceClass, ResourceId), GrantRow>,
}

#[derive(Debug, Default)]
pub struct InMemoryGrantStore {
    inner: Mutex<Inner>,
}

impl InMemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, GrantStoreError> {
        self.inner
            .lock()
            .map_err(|_| GrantStoreError::Store("lock poisoned".to_string()))
    }

    pub fn add_role(&self, role: RoleRecord) {
        let mut inner = self.inner.lock().expect("grant store lock poisoned");
        inner.roles.insert(role.id, role);
    }

    /// Total grant rows, active or not. Lets tests observe that
    /// reactivation toggles rather than duplicates.
    pub fn row_count(&self) -> usize {
        self.inner.lock().expect("grant store lock poisoned").grants.len()
    }

    /// Audit columns of one row: `(active, granted_at, granted_by, revoked_at)`.
    pub fn audit_row(
        &self,
        role_id: RoleId,
        class: ResourceClass,
        resource_id: ResourceId,
    ) -> Option<(bool, DateTime<Utc>, Option<UserId>, Option<DateTime<Utc>>)> {
        let inner = self.inner.lock().expect("grant store lock poisoned");
        inner
            .grants
            .get(&(role_id, class, resource_id))
            .map(|row| (row.active, row.granted_at, row.granted_by, row.revoked_at))
    }
}

#[async_trait]
impl GrantStore for InMemoryGrantStore {
    async fn find_role(&self, role_id: RoleId) -> Result<Option<RoleRecord>, GrantStoreError> {
        let inner = self.lock()?;
        Ok(inner.roles.get(&role_id).cloned())
    }

    async fn active_resource_ids(
        &self,
        role_id: RoleId,
        class: ResourceClass,
    ) -> Result<BTreeSet<ResourceId>, GrantStoreError> {
        let inner = self.lock()?;
        Ok(inner
            .grants
            .iter()
            .filter(|((r, c, _), row)| *r == role_id && *c == class && row.active)
            .map(|((_, _, id), _)| *id)
            .collect())
    }

    async fn has_grant(
        &self,
        role_id: RoleId,
        class: ResourceClass,
        resource_id: ResourceId,
    ) -> Result<bool, GrantStoreError> {
        let inner = self.lock()?;
        Ok(inner
            .grants
            .get(&(role_id, class, resource_id))
            .is_some_and(|row| row.active))
    }

    async fn sync_role(
        &self,
        role_id: RoleId,
        desired: &SyncRequest,
        actor: Option<UserId>,
    ) -> Result<SyncOutcome, GrantStoreError> {
        desired.validate()?;

        let mut inner = self.lock()?;
        if !inner.roles.contains_key(&role_id) {
            return Err(GrantStoreError::UnknownRole(role_id));
        }

        let now = Utc::now();
        let mut outcome = SyncOutcome::default();

        for class in ResourceClass::ALL {
            let Some(desired_set) = desired.desired(class) else {
                continue;
            };

            let current: BTreeSet<ResourceId> = inner
                .grants
                .iter()
                .filter(|((r, c, _), row)| *r == role_id && *c == class && row.active)
                .map(|((_, _, id), _)| *id)
                .collect();

            let diff = GrantDiff::compute(&current, &desired_set);

            for id in &diff.activate {
                inner
                    .grants
                    .entry((role_id, class, *id))
                    .and_modify(|row| {
                        row.active = true;
                        row.granted_at = now;
                        row.granted_by = actor;
                        row.revoked_at = None;
                    })
                    .or_insert(GrantRow {
                        active: true,
                        granted_at: now,
                        granted_by: actor,
                        revoked_at: None,
                    });
            }

            for id in &diff.deactivate {
                if let Some(row) = inner.grants.get_mut(&(role_id, class, *id)) {
                    row.active = false;
                    row.revoked_at = Some(now);
                }
            }

            outcome.set(
                class,
                ClassOutcome {
                    active: desired_set.iter().copied().collect(),
                    activated: diff.activate.len(),
                    deactivated: diff.deactivate.len(),
                },
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_role(role_id: i64) -> InMemoryGrantStore {
        let store = InMemoryGrantStore::new();
        store.add_role(RoleRecord {
            id: RoleId::new(role_id),
            name: format!("role-{role_id}"),
            active: true,
        });
        store
    }

    fn ids(set: &BTreeSet<ResourceId>) -> Vec<i64> {
        set.iter().map(|r| r.as_i64()).collect()
    }

    #[tokio::test]
    async fn sync_replaces_supplied_classes_and_leaves_omitted_ones() {
        let store = store_with_role(5);
        let role = RoleId::new(5);

        // Start: menus {2,3}, topics {9}.
        store
            .sync_role(
                role,
                &SyncRequest {
                    menus: Some(vec![2, 3]),
                    topics: Some(vec![9]),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        // Sync menus to {1,2}, subMenus to empty; topics omitted.
        let outcome = store
            .sync_role(
                role,
                &SyncRequest {
                    menus: Some(vec![1, 2]),
                    sub_menus: Some(vec![]),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        let menus = store
            .active_resource_ids(role, ResourceClass::Menu)
            .await
            .unwrap();
        assert_eq!(ids(&menus), vec![1, 2]);

        let menu_outcome = outcome.class(ResourceClass::Menu).unwrap();
        assert_eq!(menu_outcome.activated, 1); // 1 activated
        assert_eq!(menu_outcome.deactivated, 1); // 3 deactivated

        let sub_menus = store
            .active_resource_ids(role, ResourceClass::SubMenu)
            .await
            .unwrap();
        assert!(sub_menus.is_empty());

        // Omitted class untouched.
        let topics = store
            .active_resource_ids(role, ResourceClass::Topic)
            .await
            .unwrap();
        assert_eq!(ids(&topics), vec![9]);
        assert!(outcome.class(ResourceClass::Topic).is_none());
    }

    #[tokio::test]
    async fn sync_is_idempotent() {
        let store = store_with_role(1);
        let role = RoleId::new(1);
        let request = SyncRequest {
            menus: Some(vec![1, 2]),
            questions: Some(vec![7]),
            ..Default::default()
        };

        let first = store.sync_role(role, &request, None).await.unwrap();
        assert_eq!(first.total_changes(), 3);
        let rows = store.row_count();

        let second = store.sync_role(role, &request, None).await.unwrap();
        assert_eq!(second.total_changes(), 0);
        assert_eq!(store.row_count(), rows);
        assert_eq!(first.class(ResourceClass::Menu).unwrap().active,
                   second.class(ResourceClass::Menu).unwrap().active);
    }

    #[tokio::test]
    async fn empty_lists_deactivate_every_class() {
        let store = store_with_role(2);
        let role = RoleId::new(2);

        store
            .sync_role(
                role,
                &SyncRequest {
                    menus: Some(vec![1]),
                    sub_menus: Some(vec![2]),
                    topics: Some(vec![3]),
                    questions: Some(vec![4]),
                    permissions: Some(vec![5]),
                },
                None,
            )
            .await
            .unwrap();

        let cleared = SyncRequest {
            menus: Some(vec![]),
            sub_menus: Some(vec![]),
            topics: Some(vec![]),
            questions: Some(vec![]),
            permissions: Some(vec![]),
        };
        let outcome = store.sync_role(role, &cleared, None).await.unwrap();

        for class in ResourceClass::ALL {
            let active = store.active_resource_ids(role, class).await.unwrap();
            assert!(active.is_empty(), "{class} still has active grants");
            assert_eq!(outcome.class(class).unwrap().deactivated, 1);
        }

        // Soft-deactivated, not deleted.
        assert_eq!(store.row_count(), 5);
    }

    #[tokio::test]
    async fn reactivation_toggles_instead_of_duplicating() {
        let store = store_with_role(3);
        let role = RoleId::new(3);

        let grant = SyncRequest {
            menus: Some(vec![1]),
            ..Default::default()
        };
        let revoke = SyncRequest {
            menus: Some(vec![]),
            ..Default::default()
        };

        let actor = UserId::new(42);
        store.sync_role(role, &grant, Some(actor)).await.unwrap();
        store.sync_role(role, &revoke, None).await.unwrap();

        let (active, _, _, revoked_at) = store
            .audit_row(role, ResourceClass::Menu, ResourceId::new(1))
            .unwrap();
        assert!(!active);
        assert!(revoked_at.is_some());

        store.sync_role(role, &grant, Some(actor)).await.unwrap();

        assert_eq!(store.row_count(), 1);
        assert!(store
            .has_grant(role, ResourceClass::Menu, ResourceId::new(1))
            .await
            .unwrap());
        let (active, _, granted_by, revoked_at) = store
            .audit_row(role, ResourceClass::Menu, ResourceId::new(1))
            .unwrap();
        assert!(active);
        assert_eq!(granted_by, Some(actor));
        assert!(revoked_at.is_none());
    }

    #[tokio::test]
    async fn invalid_ids_reject_the_whole_call() {
        let store = store_with_role(4);
        let role = RoleId::new(4);

        store
            .sync_role(
                role,
                &SyncRequest {
                    menus: Some(vec![1]),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        let err = store
            .sync_role(
                role,
                &SyncRequest {
                    menus: Some(vec![2]),
                    topics: Some(vec![-7]),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GrantStoreError::Validation(_)));

        // Pre-state preserved: no class was partially updated.
        let menus = store
            .active_resource_ids(role, ResourceClass::Menu)
            .await
            .unwrap();
        assert_eq!(ids(&menus), vec![1]);
    }

    #[tokio::test]
    async fn unknown_role_rejected() {
        let store = InMemoryGrantStore::new();
        let err = store
            .sync_role(RoleId::new(99), &SyncRequest::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GrantStoreError::UnknownRole(r) if r == RoleId::new(99)));
    }

    #[tokio::test]
    async fn has_grant_is_false_for_deactivated_rows() {
        let store = store_with_role(6);
        let role = RoleId::new(6);

        store
            .sync_role(
                role,
                &SyncRequest {
                    permissions: Some(vec![7]),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert!(store
            .has_grant(role, ResourceClass::Permission, ResourceId::new(7))
            .await
            .unwrap());

        store
            .sync_role(
                role,
                &SyncRequest {
                    permissions: Some(vec![]),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert!(!store
            .has_grant(role, ResourceClass::Permission, ResourceId::new(7))
            .await
            .unwrap());
    }
}
