//! Postgres-backed permission catalog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use warden_core::PermissionId;

use super::{CatalogError, Permission, PermissionCatalog};

/// Postgres-backed read access to the `permissions` table.
///
/// Thread safety comes from the SQLx connection pool; the catalog itself
/// holds no mutable state.
#[derive(Debug, Clone)]
pub struct PgPermissionCatalog {
    pool: PgPool,
}

impl PgPermissionCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: i64,
    name: String,
    url_template: String,
    http_method: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Self {
            id: PermissionId::new(row.id),
            name: row.name,
            url_template: row.url_template,
            http_method: row.http_method,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PermissionCatalog for PgPermissionCatalog {
    #[instrument(skip(self), err)]
    async fn list_active(&self) -> Result<Vec<Permission>, CatalogError> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, url_template, http_method, active, created_at
            FROM permissions
            WHERE active = TRUE
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::Store(e.to_string()))?;

        Ok(rows.into_iter().map(Permission::from).collect())
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(&self, id: PermissionId) -> Result<Option<Permission>, CatalogError> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, url_template, http_method, active, created_at
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::Store(e.to_string()))?;

        Ok(row.map(Permission::from))
    }
}
