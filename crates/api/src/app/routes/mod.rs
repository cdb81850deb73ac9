use axum::{routing::get, Router};

pub mod permissions;
pub mod roles;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/permissions", get(permissions::list_permissions))
        .nest("/roles", roles::router())
}
