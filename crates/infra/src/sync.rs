//! Role-grant synchronization: desired-set validation and the per-class diff.
//!
//! The diff is pure and shared by every store implementation; stores only
//! apply it inside their own transaction.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use warden_core::{ResourceClass, ResourceId};

/// Ids supplied in a sync payload that failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {class} ids {values:?}: ids must be positive integers")]
pub struct InvalidIds {
    pub class: ResourceClass,
    pub values: Vec<i64>,
}

/// Desired grant membership per resource class.
///
/// `None` leaves a class untouched; an explicit empty list revokes every
/// grant in the class. Duplicates within a list collapse to a set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRequest {
    pub menus: Option<Vec<i64>>,
    pub sub_menus: Option<Vec<i64>>,
    pub topics: Option<Vec<i64>>,
    pub questions: Option<Vec<i64>>,
    pub permissions: Option<Vec<i64>>,
}

impl SyncRequest {
    pub fn class(&self, class: ResourceClass) -> Option<&[i64]> {
        match class {
            ResourceClass::Menu => self.menus.as_deref(),
            ResourceClass::SubMenu => self.sub_menus.as_deref(),
            ResourceClass::Topic => self.topics.as_deref(),
            ResourceClass::Question => self.questions.as_deref(),
            ResourceClass::Permission => self.permissions.as_deref(),
        }
    }

    /// Validate before any store access: every supplied id must be positive.
    ///
    /// The whole request is rejected on the first offending class, naming the
    /// class and the invalid values.
    pub fn validate(&self) -> Result<(), InvalidIds> {
        for class in ResourceClass::ALL {
            if let Some(ids) = self.class(class) {
                let values: Vec<i64> = ids.iter().copied().filter(|id| *id <= 0).collect();
                if !values.is_empty() {
                    return Err(InvalidIds { class, values });
                }
            }
        }
        Ok(())
    }

    /// The desired membership set for a class; `None` when the class was
    /// omitted from the payload.
    pub fn desired(&self, class: ResourceClass) -> Option<BTreeSet<ResourceId>> {
        self.class(class)
            .map(|ids| ids.iter().map(|id| ResourceId::new(*id)).collect())
    }

    pub fn is_empty(&self) -> bool {
        ResourceClass::ALL.iter().all(|c| self.class(*c).is_none())
    }
}

/// The row changes that reconcile a current membership with a desired one.
///
/// Ids in the intersection appear in neither list (idempotent no-op).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantDiff {
    /// desired − current: rows to insert or reactivate.
    pub activate: Vec<ResourceId>,
    /// current − desired: rows to deactivate (never delete).
    pub deactivate: Vec<ResourceId>,
}

impl GrantDiff {
    pub fn compute(current: &BTreeSet<ResourceId>, desired: &BTreeSet<ResourceId>) -> Self {
        Self {
            activate: desired.difference(current).copied().collect(),
            deactivate: current.difference(desired).copied().collect(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.activate.is_empty() && self.deactivate.is_empty()
    }
}

/// Post-sync state of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassOutcome {
    /// The full active membership after the sync, ascending.
    pub active: Vec<ResourceId>,
    pub activated: usize,
    pub deactivated: usize,
}

/// The recomputed effective grants per supplied class, returned to the
/// caller for confirmation. Omitted classes stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menus: Option<ClassOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_menus: Option<ClassOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<ClassOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<ClassOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<ClassOutcome>,
}

impl SyncOutcome {
    pub fn set(&mut self, class: ResourceClass, outcome: ClassOutcome) {
        match class {
            ResourceClass::Menu => self.menus = Some(outcome),
            ResourceClass::SubMenu => self.sub_menus = Some(outcome),
            ResourceClass::Topic => self.topics = Some(outcome),
            ResourceClass::Question => self.questions = Some(outcome),
            ResourceClass::Permission => self.permissions = Some(outcome),
        }
    }

    pub fn class(&self, class: ResourceClass) -> Option<&ClassOutcome> {
        match class {
            ResourceClass::Menu => self.menus.as_ref(),
            ResourceClass::SubMenu => self.sub_menus.as_ref(),
            ResourceClass::Topic => self.topics.as_ref(),
            ResourceClass::Question => self.questions.as_ref(),
            ResourceClass::Permission => self.permissions.as_ref(),
        }
    }

    /// Total rows touched across all classes.
    pub fn total_changes(&self) -> usize {
        ResourceClass::ALL
            .iter()
            .filter_map(|c| self.class(*c))
            .map(|o| o.activated + o.deactivated)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(ids: &[i64]) -> BTreeSet<ResourceId> {
        ids.iter().map(|id| ResourceId::new(*id)).collect()
    }

    #[test]
    fn validate_accepts_positive_ids() {
        let req = SyncRequest {
            menus: Some(vec![1, 2, 3]),
            permissions: Some(vec![]),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn validate_names_offending_class_and_values() {
        let req = SyncRequest {
            menus: Some(vec![1, 2]),
            topics: Some(vec![5, -3, 0]),
            ..Default::default()
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.class, ResourceClass::Topic);
        assert_eq!(err.values, vec![-3, 0]);
    }

    #[test]
    fn desired_collapses_duplicates() {
        let req = SyncRequest {
            menus: Some(vec![2, 1, 2, 1]),
            ..Default::default()
        };
        assert_eq!(req.desired(ResourceClass::Menu).unwrap(), set(&[1, 2]));
    }

    #[test]
    fn omitted_class_has_no_desired_set() {
        let req = SyncRequest::default();
        assert!(req.desired(ResourceClass::Menu).is_none());
        assert!(req.is_empty());
    }

    #[test]
    fn empty_list_is_an_empty_desired_set() {
        let req = SyncRequest {
            sub_menus: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(req.desired(ResourceClass::SubMenu).unwrap(), set(&[]));
    }

    #[test]
    fn diff_splits_membership_changes() {
        // Spec scenario: current {2,3}, desired {1,2}.
        let diff = GrantDiff::compute(&set(&[2, 3]), &set(&[1, 2]));
        assert_eq!(diff.activate, vec![ResourceId::new(1)]);
        assert_eq!(diff.deactivate, vec![ResourceId::new(3)]);
    }

    #[test]
    fn diff_of_identical_sets_is_noop() {
        let diff = GrantDiff::compute(&set(&[1, 2]), &set(&[1, 2]));
        assert!(diff.is_noop());
    }

    proptest! {
        /// Applying the diff to `current` always yields `desired`, and
        /// re-diffing afterwards is a no-op (sync idempotence).
        #[test]
        fn diff_reconciles_and_is_idempotent(
            current in prop::collection::btree_set(1i64..500, 0..40),
            desired in prop::collection::btree_set(1i64..500, 0..40),
        ) {
            let current: BTreeSet<ResourceId> =
                current.into_iter().map(ResourceId::new).collect();
            let desired: BTreeSet<ResourceId> =
                desired.into_iter().map(ResourceId::new).collect();

            let diff = GrantDiff::compute(&current, &desired);

            let mut applied = current.clone();
            for id in &diff.deactivate {
                applied.remove(id);
            }
            applied.extend(diff.activate.iter().copied());

            prop_assert_eq!(&applied, &desired);
            prop_assert!(GrantDiff::compute(&applied, &desired).is_noop());
        }
    }
}
