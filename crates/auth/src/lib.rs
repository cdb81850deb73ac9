//! `warden-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod route;
pub mod subject;
pub mod verifier;

pub use authorize::{authorize_role_in, AccessGrant, Denial};
pub use claims::{validate_claims, JwtClaims};
pub use route::{candidate_paths, CatalogEntry, PathTemplate, RouteTable};
pub use subject::Subject;
pub use verifier::{Hs256Verifier, IdentityVerifier, TokenError};
