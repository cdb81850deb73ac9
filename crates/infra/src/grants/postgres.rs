//! Postgres-backed grant store.
//!
//! Synchronization runs inside a single transaction across all five resource
//! classes, so a concurrent authorization check observes either the old state
//! or the new state, never a half-applied sync. Reactivation is an
//! `ON CONFLICT` upsert on the `(role_id, resource_class, resource_id)` key,
//! which also makes duplicate rows impossible at the schema level.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::instrument;

use warden_core::{ResourceClass, ResourceId, RoleId, UserId};

use super::{GrantStore, GrantStoreError, RoleRecord};
use crate::sync::{ClassOutcome, GrantDiff, SyncOutcome, SyncRequest};

#[derive(Debug, Clone)]
pub struct PgGrantStore {
    pool: PgPool,
}

impl PgGrantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_active(
        tx: &mut Transaction<'_, Postgres>,
        role_id: RoleId,
        class: ResourceClass,
    ) -> Result<BTreeSet<ResourceId>, GrantStoreError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT resource_id
            FROM role_grants
            WHERE role_id = $1 AND resource_class = $2 AND active = TRUE
            "#,
        )
        .bind(role_id.as_i64())
        .bind(class.as_str())
        .fetch_all(&mut **tx)
        .await
        .map_err(store_error)?;

        Ok(ids.into_iter().map(ResourceId::new).collect())
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    active: bool,
}

impl From<RoleRow> for RoleRecord {
    fn from(row: RoleRow) -> Self {
        Self {
            id: RoleId::new(row.id),
            name: row.name,
            active: row.active,
        }
    }
}

fn store_error(e: sqlx::Error) -> GrantStoreError {
    GrantStoreError::Store(e.to_string())
}

#[async_trait]
impl GrantStore for PgGrantStore {
    #[instrument(skip(self), err)]
    async fn find_role(&self, role_id: RoleId) -> Result<Option<RoleRecord>, GrantStoreError> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"SELECT id, name, active FROM roles WHERE id = $1"#,
        )
        .bind(role_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(RoleRecord::from))
    }

    #[instrument(skip(self), err)]
    async fn active_resource_ids(
        &self,
        role_id: RoleId,
        class: ResourceClass,
    ) -> Result<BTreeSet<ResourceId>, GrantStoreError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT resource_id
            FROM role_grants
            WHERE role_id = $1 AND resource_class = $2 AND active = TRUE
            ORDER BY resource_id ASC
            "#,
        )
        .bind(role_id.as_i64())
        .bind(class.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(ids.into_iter().map(ResourceId::new).collect())
    }

    #[instrument(skip(self), err)]
    async fn has_grant(
        &self,
        role_id: RoleId,
        class: ResourceClass,
        resource_id: ResourceId,
    ) -> Result<bool, GrantStoreError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM role_grants
                WHERE role_id = $1
                  AND resource_class = $2
                  AND resource_id = $3
                  AND active = TRUE
            )
            "#,
        )
        .bind(role_id.as_i64())
        .bind(class.as_str())
        .bind(resource_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(exists)
    }

    #[instrument(skip(self, desired), fields(role = %role_id), err)]
    async fn sync_role(
        &self,
        role_id: RoleId,
        desired: &SyncRequest,
        actor: Option<UserId>,
    ) -> Result<SyncOutcome, GrantStoreError> {
        desired.validate()?;

        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let known: Option<i64> = sqlx::query_scalar(r#"SELECT id FROM roles WHERE id = $1"#)
            .bind(role_id.as_i64())
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_error)?;
        if known.is_none() {
            return Err(GrantStoreError::UnknownRole(role_id));
        }

        let mut outcome = SyncOutcome::default();

        for class in ResourceClass::ALL {
            let Some(desired_set) = desired.desired(class) else {
                continue;
            };

            let current = Self::current_active(&mut tx, role_id, class).await?;
            let diff = GrantDiff::compute(&current, &desired_set);

            for id in &diff.activate {
                sqlx::query(
                    r#"
                    INSERT INTO role_grants
                        (role_id, resource_class, resource_id, active, granted_at, granted_by)
                    VALUES ($1, $2, $3, TRUE, NOW(), $4)
                    ON CONFLICT (role_id, resource_class, resource_id)
                    DO UPDATE SET
                        active = TRUE,
                        granted_at = NOW(),
                        granted_by = EXCLUDED.granted_by,
                        revoked_at = NULL
                    "#,
                )
                .bind(role_id.as_i64())
                .bind(class.as_str())
                .bind(id.as_i64())
                .bind(actor.map(|a| a.as_i64()))
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
            }

            if !diff.deactivate.is_empty() {
                let ids: Vec<i64> = diff.deactivate.iter().map(|r| r.as_i64()).collect();
                sqlx::query(
                    r#"
                    UPDATE role_grants
                    SET active = FALSE, revoked_at = NOW()
                    WHERE role_id = $1 AND resource_class = $2 AND resource_id = ANY($3)
                    "#,
                )
                .bind(role_id.as_i64())
                .bind(class.as_str())
                .bind(&ids)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
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

        tx.commit().await.map_err(store_error)?;

        tracing::info!(
            role = %role_id,
            changes = outcome.total_changes(),
            "role grants synchronized"
        );

        Ok(outcome)
    }
}
