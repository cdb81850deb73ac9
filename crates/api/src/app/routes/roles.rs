//! Role grant endpoints: bulk synchronization, listing and capability probes.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use warden_core::{ResourceClass, ResourceId, RoleId};
use warden_infra::SyncRequest;

use crate::app::{dto, errors, services::AppServices};
use crate::context::AccessContext;

pub fn router() -> Router {
    Router::new()
        .route("/:id/grants", post(sync_grants).get(list_grants))
        .route("/:id/grants/probe", get(probe_grants))
}

/// POST /roles/:id/grants - replace the role's grant membership for every
/// class present in the body, atomically.
pub async fn sync_grants(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(access): Extension<AccessContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SyncGrantsRequest>,
) -> axum::response::Response {
    let role_id: RoleId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id")
        }
    };

    let request = SyncRequest::from(body);
    let actor = access.subject().user_id;

    match services
        .grants
        .sync_role(role_id, &request, Some(actor))
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "roleId": role_id,
                "grants": outcome,
            })),
        )
            .into_response(),
        Err(e) => errors::grant_store_error_to_response(e),
    }
}

/// GET /roles/:id/grants - the role's active grant ids per class.
pub async fn list_grants(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let role_id: RoleId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id")
        }
    };

    match services.grants.find_role(role_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(
                StatusCode::NOT_FOUND,
                "unknown_role",
                format!("role {role_id} does not exist"),
            )
        }
        Err(e) => return errors::grant_store_error_to_response(e),
    }

    let mut grants = serde_json::Map::new();
    for class in ResourceClass::ALL {
        match services.grants.active_resource_ids(role_id, class).await {
            Ok(ids) => {
                let ids: Vec<i64> = ids.iter().map(|r| r.as_i64()).collect();
                grants.insert(dto::class_key(class).to_string(), serde_json::json!(ids));
            }
            Err(e) => return errors::grant_store_error_to_response(e),
        }
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "roleId": role_id,
            "grants": grants,
        })),
    )
        .into_response()
}

/// GET /roles/:id/grants/probe - ad-hoc capability checks, one boolean per
/// supplied query parameter.
pub async fn probe_grants(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::ProbeQuery>,
) -> axum::response::Response {
    let role_id: RoleId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id")
        }
    };

    let probes = [
        ("permission", ResourceClass::Permission, query.permission_id),
        ("menu", ResourceClass::Menu, query.menu_id),
        ("subMenu", ResourceClass::SubMenu, query.sub_menu_id),
    ];

    let mut results = serde_json::Map::new();
    for (key, class, id) in probes {
        let Some(id) = id else { continue };
        match services
            .grants
            .has_grant(role_id, class, ResourceId::new(id))
            .await
        {
            Ok(granted) => {
                results.insert(key.to_string(), serde_json::json!(granted));
            }
            Err(e) => return errors::grant_store_error_to_response(e),
        }
    }

    (StatusCode::OK, Json(serde_json::Value::Object(results))).into_response()
}
