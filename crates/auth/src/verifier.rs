//! Bearer-token verification.
//!
//! Token *issuance* is out of scope; this side only decodes and checks what
//! some external issuer minted.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, JwtClaims};
use crate::subject::Subject;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("missing bearer token")]
    Missing,

    #[error("malformed token")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,
}

/// Verifies a bearer token and produces the subject it identifies.
///
/// Object-safe so the HTTP layer can hold it as `Arc<dyn IdentityVerifier>`.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Subject, TokenError>;
}

/// HS256 JWT verifier.
///
/// Claim-window validation is delegated to [`validate_claims`] rather than
/// jsonwebtoken's numeric `exp` handling, because claims carry RFC3339
/// timestamps.
pub struct Hs256Verifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Hs256Verifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl IdentityVerifier for Hs256Verifier {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Subject, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        validate_claims(&data.claims, now)?;

        Ok(Subject::from(data.claims))
    }
}
