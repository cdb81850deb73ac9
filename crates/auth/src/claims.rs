use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{RoleId, UserId};

use crate::verifier::TokenError;

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims Warden expects once a token has been
/// decoded/verified by whatever transport/security layer is in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Role the subject acts under.
    pub role_id: RoleId,

    /// Role name, for coarse-grained allow-list checks.
    pub role: String,

    /// Whether the underlying user account is active.
    pub active: bool,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// lives in [`crate::verifier`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenError::Malformed);
    }
    if now < claims.issued_at {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}
