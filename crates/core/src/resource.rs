//! Resource classes a role can be granted access to.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The five classes of resources a grant can reference.
///
/// Grants are keyed `(role, class, resource)`; every class participates in
/// synchronization independently of the others.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    Permission,
    Menu,
    SubMenu,
    Topic,
    Question,
}

impl ResourceClass {
    /// All classes, in the order synchronization processes them.
    pub const ALL: [ResourceClass; 5] = [
        ResourceClass::Menu,
        ResourceClass::SubMenu,
        ResourceClass::Topic,
        ResourceClass::Question,
        ResourceClass::Permission,
    ];

    /// Stable textual form (also the database column value).
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceClass::Permission => "permission",
            ResourceClass::Menu => "menu",
            ResourceClass::SubMenu => "sub_menu",
            ResourceClass::Topic => "topic",
            ResourceClass::Question => "question",
        }
    }
}

impl core::fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "permission" => Ok(ResourceClass::Permission),
            "menu" => Ok(ResourceClass::Menu),
            "sub_menu" => Ok(ResourceClass::SubMenu),
            "topic" => Ok(ResourceClass::Topic),
            "question" => Ok(ResourceClass::Question),
            other => Err(DomainError::invalid_id(format!(
                "unknown resource class: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_round_trips_through_str() {
        for class in ResourceClass::ALL {
            assert_eq!(class.as_str().parse::<ResourceClass>().unwrap(), class);
        }
    }
}
