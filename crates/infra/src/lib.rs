//! Infrastructure layer: permission catalog and grant stores, the role-grant
//! synchronizer, and the authorization engine that composes them.

pub mod catalog;
pub mod engine;
pub mod grants;
pub mod sync;

pub use catalog::{CatalogError, InMemoryCatalog, Permission, PermissionCatalog, PgPermissionCatalog};
pub use engine::{AuthorizationEngine, EngineConfig};
pub use grants::{GrantStore, GrantStoreError, InMemoryGrantStore, PgGrantStore, RoleRecord};
pub use sync::{ClassOutcome, GrantDiff, InvalidIds, SyncOutcome, SyncRequest};
