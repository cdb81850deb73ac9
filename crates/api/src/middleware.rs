use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use warden_auth::Denial;

use crate::app::{errors, services::AppServices};
use crate::context::AccessContext;

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

/// Per-request authorization: verify the bearer token, resolve the route to
/// a permission, check the role's grant. Denials never reach the handler.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return errors::denial_to_response(&Denial::Unauthenticated);
    };
    let token = token.to_string();

    let path = req.uri().path().to_string();
    let method = req.method().as_str().to_string();

    match state.services.engine.authorize(&token, &path, &method).await {
        Ok(grant) => {
            req.extensions_mut().insert(AccessContext::new(grant));
            next.run(req).await
        }
        Err(denial) => errors::denial_to_response(&denial),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token)
}
