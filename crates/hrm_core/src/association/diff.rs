//! Minimal edit set between two association states.

use crate::model::EntityId;
use std::collections::BTreeSet;

/// `(removed, added)` pair between a prior and a desired id set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdDiff {
    pub removed: BTreeSet<EntityId>,
    pub added: BTreeSet<EntityId>,
}

impl IdDiff {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Returns `(old - new, new - old)`.
pub fn diff_ids(old: &BTreeSet<EntityId>, new: &BTreeSet<EntityId>) -> IdDiff {
    IdDiff {
        removed: old.difference(new).copied().collect(),
        added: new.difference(old).copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::diff_ids;
    use std::collections::BTreeSet;

    #[test]
    fn diff_against_self_is_empty() {
        let ids = BTreeSet::from([1, 4, 9]);
        assert!(diff_ids(&ids, &ids).is_empty());
        assert!(diff_ids(&BTreeSet::new(), &BTreeSet::new()).is_empty());
    }

    #[test]
    fn diff_splits_removed_and_added() {
        let old = BTreeSet::from([1, 2, 3]);
        let new = BTreeSet::from([2, 3, 4, 5]);
        let diff = diff_ids(&old, &new);
        assert_eq!(diff.removed, BTreeSet::from([1]));
        assert_eq!(diff.added, BTreeSet::from([4, 5]));
    }

    #[test]
    fn clearing_removes_everything() {
        let old = BTreeSet::from([7, 8]);
        let diff = diff_ids(&old, &BTreeSet::new());
        assert_eq!(diff.removed, old);
        assert!(diff.added.is_empty());
    }
}
