//! Infrastructure wiring: store selection and engine construction.

use std::sync::Arc;

use warden_auth::{Hs256Verifier, IdentityVerifier};
use warden_infra::{
    AuthorizationEngine, EngineConfig, GrantStore, InMemoryCatalog, InMemoryGrantStore,
    PermissionCatalog, PgGrantStore, PgPermissionCatalog,
};

use crate::config::AppConfig;

/// Shared services handed to every handler via request extensions.
pub struct AppServices {
    pub engine: Arc<AuthorizationEngine>,
    pub catalog: Arc<dyn PermissionCatalog>,
    pub grants: Arc<dyn GrantStore>,
}

impl AppServices {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        catalog: Arc<dyn PermissionCatalog>,
        grants: Arc<dyn GrantStore>,
        engine_config: EngineConfig,
    ) -> Self {
        let engine = Arc::new(AuthorizationEngine::new(
            verifier,
            Arc::clone(&catalog),
            Arc::clone(&grants),
            engine_config,
        ));

        Self {
            engine,
            catalog,
            grants,
        }
    }
}

/// Wire stores from configuration: Postgres when a database URL is present,
/// in-memory otherwise (dev/test mode).
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let verifier: Arc<dyn IdentityVerifier> =
        Arc::new(Hs256Verifier::new(config.jwt_secret.as_bytes()));

    let (catalog, grants): (Arc<dyn PermissionCatalog>, Arc<dyn GrantStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(8)
                    .connect(url)
                    .await?;
                (
                    Arc::new(PgPermissionCatalog::new(pool.clone())),
                    Arc::new(PgGrantStore::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory stores");
                (
                    Arc::new(InMemoryCatalog::new()),
                    Arc::new(InMemoryGrantStore::new()),
                )
            }
        };

    Ok(AppServices::new(
        verifier,
        catalog,
        grants,
        EngineConfig {
            catalog_refresh: config.catalog_refresh,
        },
    ))
}
