use serde::Deserialize;

use warden_core::ResourceClass;
use warden_infra::SyncRequest;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /roles/:id/grants`.
///
/// Omitted keys leave their class untouched; an explicit empty array revokes
/// every grant in the class.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SyncGrantsRequest {
    pub menus: Option<Vec<i64>>,
    pub sub_menus: Option<Vec<i64>>,
    pub topics: Option<Vec<i64>>,
    pub questions: Option<Vec<i64>>,
    pub permissions: Option<Vec<i64>>,
}

impl From<SyncGrantsRequest> for SyncRequest {
    fn from(body: SyncGrantsRequest) -> Self {
        Self {
            menus: body.menus,
            sub_menus: body.sub_menus,
            topics: body.topics,
            questions: body.questions,
            permissions: body.permissions,
        }
    }
}

/// Query of `GET /roles/:id/grants/probe`.
#[derive(Debug, Deserialize)]
pub struct ProbeQuery {
    pub permission_id: Option<i64>,
    pub menu_id: Option<i64>,
    pub sub_menu_id: Option<i64>,
}

/// Wire name of a class in grant listings.
pub fn class_key(class: ResourceClass) -> &'static str {
    match class {
        ResourceClass::Menu => "menus",
        ResourceClass::SubMenu => "subMenus",
        ResourceClass::Topic => "topics",
        ResourceClass::Question => "questions",
        ResourceClass::Permission => "permissions",
    }
}
