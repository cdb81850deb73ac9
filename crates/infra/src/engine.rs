//! Authorization engine: token verification + route resolution + grant lookup.
//!
//! Read-only; the engine never writes. Store failures fail closed — a request
//! is denied, never waved through, when the backing store is unreachable.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::instrument;

use warden_auth::{candidate_paths, AccessGrant, Denial, IdentityVerifier, RouteTable};
use warden_core::ResourceClass;

use crate::catalog::PermissionCatalog;
use crate::grants::GrantStore;

/// Engine construction parameters.
///
/// Nothing inside the engine reads the environment; the caller constructs
/// this at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a compiled route table is served before the catalog is
    /// re-read.
    pub catalog_refresh: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_refresh: Duration::from_secs(30),
        }
    }
}

struct CachedTable {
    table: Arc<RouteTable>,
    loaded_at: Instant,
}

/// Composes the identity verifier, the compiled route table and the grant
/// store into a single allow/deny decision per request.
pub struct AuthorizationEngine {
    verifier: Arc<dyn IdentityVerifier>,
    catalog: Arc<dyn PermissionCatalog>,
    grants: Arc<dyn GrantStore>,
    config: EngineConfig,
    cache: RwLock<Option<CachedTable>>,
}

impl AuthorizationEngine {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        catalog: Arc<dyn PermissionCatalog>,
        grants: Arc<dyn GrantStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            verifier,
            catalog,
            grants,
            config,
            cache: RwLock::new(None),
        }
    }

    /// Decide whether the bearer of `token` may invoke `method path`.
    ///
    /// On success the resolved subject and permission are returned for the
    /// caller to attach to the request context.
    #[instrument(skip(self, token), err(Debug))]
    pub async fn authorize(
        &self,
        token: &str,
        path: &str,
        method: &str,
    ) -> Result<AccessGrant, Denial> {
        let subject = self
            .verifier
            .verify(token, Utc::now())
            .map_err(|e| {
                tracing::debug!(error = %e, "token verification failed");
                Denial::Unauthenticated
            })?;

        if !subject.active {
            return Err(Denial::Unauthenticated);
        }

        let role = self
            .grants
            .find_role(subject.role_id)
            .await
            .map_err(store_failure)?;
        match role {
            Some(r) if r.active => {}
            _ => return Err(Denial::Unauthenticated),
        }

        let table = self.route_table().await?;
        let candidates = candidate_paths(path);
        let candidate_refs: Vec<&str> = candidates.iter().map(String::as_str).collect();

        let entry = table
            .resolve(method, &candidate_refs)
            .cloned()
            .ok_or_else(|| Denial::NoPermissionForRoute {
                method: method.to_string(),
                path: path.to_string(),
            })?;

        let granted = self
            .grants
            .has_grant(subject.role_id, ResourceClass::Permission, entry.id.into())
            .await
            .map_err(store_failure)?;
        if !granted {
            return Err(Denial::InsufficientGrant {
                role: subject.role_id,
                permission: entry.id,
            });
        }

        Ok(AccessGrant {
            subject,
            permission: entry,
        })
    }

    /// The compiled route table, re-reading the catalog when the refresh
    /// interval has elapsed. Readers are served the previous table while a
    /// refresh is in flight; the swap is atomic.
    async fn route_table(&self) -> Result<Arc<RouteTable>, Denial> {
        {
            let cache = self.cache.read().expect("route table lock poisoned");
            if let Some(cached) = cache.as_ref() {
                if cached.loaded_at.elapsed() < self.config.catalog_refresh {
                    return Ok(Arc::clone(&cached.table));
                }
            }
        }

        let records = self.catalog.list_active().await.map_err(store_failure)?;
        let table = Arc::new(RouteTable::compile(
            records.iter().map(|p| p.to_entry()).collect(),
        ));
        tracing::debug!(entries = table.len(), "route table compiled");

        let mut cache = self.cache.write().expect("route table lock poisoned");
        *cache = Some(CachedTable {
            table: Arc::clone(&table),
            loaded_at: Instant::now(),
        });

        Ok(table)
    }

    /// Drop the compiled table so the next authorization re-reads the
    /// catalog. Called after catalog mutations.
    pub fn invalidate_catalog(&self) {
        self.cache
            .write()
            .expect("route table lock poisoned")
            .take();
    }
}

fn store_failure(e: impl std::fmt::Display) -> Denial {
    tracing::error!(error = %e, "authorization store failure");
    Denial::StoreFailure(e.to_string())
}
