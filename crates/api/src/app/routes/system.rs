use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(access): Extension<crate::context::AccessContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": access.subject().user_id,
        "role_id": access.subject().role_id,
        "role": access.subject().role_name,
        "permission": access.permission(),
    }))
}
