//! Permission catalog endpoints.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use warden_auth::authorize_role_in;

use crate::app::{errors, services::AppServices};
use crate::context::AccessContext;

/// Roles allowed to inspect the catalog, on top of their route grant.
const CATALOG_READERS: &[&str] = &["admin", "super_admin"];

/// GET /permissions - list active catalog records.
pub async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(access): Extension<AccessContext>,
) -> axum::response::Response {
    if let Err(denial) = authorize_role_in(access.subject(), CATALOG_READERS) {
        return errors::denial_to_response(&denial);
    }

    match services.catalog.list_active().await {
        Ok(records) => (
            StatusCode::OK,
            Json(serde_json::json!({ "permissions": records })),
        )
            .into_response(),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            e.to_string(),
        ),
    }
}
