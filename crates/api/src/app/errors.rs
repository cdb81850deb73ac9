use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use warden_auth::Denial;
use warden_infra::GrantStoreError;

/// Map an authorization denial to its HTTP rejection.
///
/// Denials are terminal; the body names the reason so operators can tell a
/// missing catalog entry from a missing grant.
pub fn denial_to_response(denial: &Denial) -> axum::response::Response {
    match denial {
        Denial::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", denial.to_string())
        }
        Denial::NoPermissionForRoute { .. } => json_error(
            StatusCode::FORBIDDEN,
            "no_permission_for_route",
            denial.to_string(),
        ),
        Denial::InsufficientGrant { .. } => json_error(
            StatusCode::FORBIDDEN,
            "insufficient_grant",
            denial.to_string(),
        ),
        Denial::RoleNotAllowed { .. } => {
            json_error(StatusCode::FORBIDDEN, "role_not_allowed", denial.to_string())
        }
        // Fail closed without leaking store internals to the caller.
        Denial::StoreFailure(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_failure",
            "authorization backend unavailable",
        ),
    }
}

pub fn grant_store_error_to_response(err: GrantStoreError) -> axum::response::Response {
    match err {
        GrantStoreError::UnknownRole(role) => json_error(
            StatusCode::NOT_FOUND,
            "unknown_role",
            format!("role {role} does not exist"),
        ),
        GrantStoreError::Validation(e) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        GrantStoreError::Store(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
