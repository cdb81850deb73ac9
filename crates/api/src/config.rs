//! Process configuration.
//!
//! The environment is read here and nowhere else; everything downstream
//! receives explicitly constructed values.

use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,

    /// HS256 secret for bearer-token verification.
    pub jwt_secret: String,

    /// When unset, the in-memory stores are wired instead (dev/test mode).
    pub database_url: Option<String>,

    /// How long the compiled route table is served before the permission
    /// catalog is re-read.
    pub catalog_refresh: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let database_url = std::env::var("DATABASE_URL").ok();

        let catalog_refresh = match std::env::var("CATALOG_REFRESH_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .context("CATALOG_REFRESH_SECS must be a number of seconds")?,
            ),
            Err(_) => Duration::from_secs(30),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url,
            catalog_refresh,
        })
    }
}
