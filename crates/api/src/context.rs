use warden_auth::{AccessGrant, CatalogEntry, Subject};

/// Authorization context for a request.
///
/// Present on every protected route: the verified subject plus the catalog
/// entry the request was admitted under, for downstream auditing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    grant: AccessGrant,
}

impl AccessContext {
    pub fn new(grant: AccessGrant) -> Self {
        Self { grant }
    }

    pub fn subject(&self) -> &Subject {
        &self.grant.subject
    }

    pub fn permission(&self) -> &CatalogEntry {
        &self.grant.permission
    }
}
