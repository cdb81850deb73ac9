use serde::{Deserialize, Serialize};

use warden_core::{RoleId, UserId};

use crate::claims::JwtClaims;

/// The verified identity attached to a request after token validation.
///
/// Not persisted; produced by an [`crate::IdentityVerifier`] and carried in
/// the request context for the lifetime of one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub role_name: String,
    pub active: bool,
}

impl From<JwtClaims> for Subject {
    fn from(claims: JwtClaims) -> Self {
        Self {
            user_id: claims.sub,
            role_id: claims.role_id,
            role_name: claims.role,
            active: claims.active,
        }
    }
}
