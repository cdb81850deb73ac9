//! In-memory permission catalog.
//!
//! Intended for tests/dev. Not optimized for performance.

use std::sync::RwLock;

use async_trait::async_trait;

use warden_core::PermissionId;

use super::{CatalogError, Permission, PermissionCatalog};

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    records: RwLock<Vec<Permission>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, replacing any existing record with the same id.
    pub fn upsert(&self, permission: Permission) {
        let mut records = self.records.write().expect("catalog lock poisoned");
        records.retain(|p| p.id != permission.id);
        records.push(permission);
        records.sort_by_key(|p| p.id);
    }

    pub fn deactivate(&self, id: PermissionId) {
        let mut records = self.records.write().expect("catalog lock poisoned");
        if let Some(p) = records.iter_mut().find(|p| p.id == id) {
            p.active = false;
        }
    }
}

#[async_trait]
impl PermissionCatalog for InMemoryCatalog {
    async fn list_active(&self) -> Result<Vec<Permission>, CatalogError> {
        let records = self
            .records
            .read()
            .map_err(|_| CatalogError::Store("lock poisoned".to_string()))?;
        Ok(records.iter().filter(|p| p.active).cloned().collect())
    }

    async fn find_by_id(&self, id: PermissionId) -> Result<Option<Permission>, CatalogError> {
        let records = self
            .records
            .read()
            .map_err(|_| CatalogError::Store("lock poisoned".to_string()))?;
        Ok(records.iter().find(|p| p.id == id).cloned())
    }
}
