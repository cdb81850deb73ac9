//! Permission catalog: read-only store of permission records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use warden_auth::CatalogEntry;
use warden_core::PermissionId;

mod in_memory;
mod postgres;

pub use in_memory::InMemoryCatalog;
pub use postgres::PgPermissionCatalog;

/// A permission record as persisted: a logical action bound to a URL template
/// and (optionally) an HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub url_template: String,
    pub http_method: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Permission {
    /// Project to the matcher's view of the record.
    pub fn to_entry(&self) -> CatalogEntry {
        CatalogEntry {
            id: self.id,
            name: self.name.clone(),
            url_template: self.url_template.clone(),
            http_method: self.http_method.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog store failure: {0}")]
    Store(String),
}

/// Read access to the permission catalog.
///
/// Implementations must return only records an administrator has not
/// deactivated; `active = false` permanently excludes a record from matching
/// without deleting its history.
#[async_trait]
pub trait PermissionCatalog: Send + Sync {
    /// All active records, ascending id (creation order).
    async fn list_active(&self) -> Result<Vec<Permission>, CatalogError>;

    async fn find_by_id(&self, id: PermissionId) -> Result<Option<Permission>, CatalogError>;
}
