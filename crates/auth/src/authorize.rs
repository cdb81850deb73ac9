//! Authorization decisions and the deny taxonomy.

use serde::Serialize;
use thiserror::Error;

use warden_core::{PermissionId, RoleId};

use crate::route::CatalogEntry;
use crate::subject::Subject;

/// A successful authorization: the verified subject plus the catalog entry it
/// was admitted under, attached to the request context for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessGrant {
    pub subject: Subject,
    pub permission: CatalogEntry,
}

/// Why a request was denied.
///
/// Denials are local, terminal decisions; nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Denial {
    /// Missing/malformed/expired token, or an inactive user or role.
    #[error("unauthenticated")]
    Unauthenticated,

    /// No catalog entry matches the request path under either matching phase.
    /// Indicates missing catalog configuration, not a transient fault.
    #[error("no permission is configured for {method} {path}")]
    NoPermissionForRoute { method: String, path: String },

    /// A matching permission exists but the role lacks an active grant.
    #[error("role {role} lacks an active grant for permission {permission}")]
    InsufficientGrant {
        role: RoleId,
        permission: PermissionId,
    },

    /// The subject's role is outside a fixed allow-list.
    #[error("role '{role}' is not in the allowed set")]
    RoleNotAllowed { role: String },

    /// The backing store failed; authorization fails closed.
    #[error("authorization backend unavailable: {0}")]
    StoreFailure(String),
}

/// Coarse-grained variant of authorization: succeed iff the subject's role
/// name is in a fixed allow-list. Used by endpoints that don't carry
/// per-route permission rows.
pub fn authorize_role_in(subject: &Subject, allowed_roles: &[&str]) -> Result<(), Denial> {
    if !subject.active {
        return Err(Denial::Unauthenticated);
    }

    if allowed_roles.iter().any(|r| *r == subject.role_name) {
        Ok(())
    } else {
        Err(Denial::RoleNotAllowed {
            role: subject.role_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::UserId;

    fn subject(role_name: &str, active: bool) -> Subject {
        Subject {
            user_id: UserId::new(1),
            role_id: RoleId::new(2),
            role_name: role_name.to_string(),
            active,
        }
    }

    #[test]
    fn allows_member_of_allow_list() {
        let s = subject("admin", true);
        assert!(authorize_role_in(&s, &["admin", "supervisor"]).is_ok());
    }

    #[test]
    fn denies_role_outside_allow_list() {
        let s = subject("clerk", true);
        assert_eq!(
            authorize_role_in(&s, &["admin"]),
            Err(Denial::RoleNotAllowed {
                role: "clerk".to_string()
            })
        );
    }

    #[test]
    fn denies_inactive_subject() {
        let s = subject("admin", false);
        assert_eq!(authorize_role_in(&s, &["admin"]), Err(Denial::Unauthenticated));
    }
}
