// ── Reconciliation ──
//
// Desired minus observed is added, observed minus desired is removed, and
// nothing else is touched. An empty delta never reaches the apply path.

use serde::Serialize;
use tracing::info;

use crate::address::{AddressSet, CanonicalAddress};
use crate::store::{ApplyError, ObjectStore};

/// What has to change to turn the observed set into the desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    /// Sorted by canonical string.
    pub to_add: Vec<CanonicalAddress>,
    /// Sorted by canonical string.
    pub to_remove: Vec<CanonicalAddress>,
}

impl Delta {
    pub fn compute(desired: &AddressSet, observed: &AddressSet) -> Self {
        Self {
            to_add: desired.difference(observed).cloned().collect(),
            to_remove: observed.difference(desired).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Addresses added and removed by one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub added: usize,
    pub removed: usize,
}

/// Bring `object_id` from `observed` to `desired` through `store`.
pub async fn reconcile(
    store: &ObjectStore<'_>,
    desired: &AddressSet,
    observed: &AddressSet,
    object_id: &str,
    batch_size: usize,
) -> Result<ReconcileOutcome, ApplyError> {
    let delta = Delta::compute(desired, observed);

    info!(
        current = observed.len(),
        desired = desired.len(),
        to_add = delta.to_add.len(),
        to_remove = delta.to_remove.len(),
        "computed mappings delta"
    );

    if delta.is_empty() {
        info!(object_id, "mappings already up to date");
        return Ok(ReconcileOutcome::default());
    }

    store
        .apply_delta(object_id, &delta.to_add, &delta.to_remove, batch_size)
        .await?;

    Ok(ReconcileOutcome {
        added: delta.to_add.len(),
        removed: delta.to_remove.len(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::address::canonicalize;

    fn set(tokens: &[&str]) -> AddressSet {
        tokens.iter().map(|t| canonicalize(t).unwrap()).collect()
    }

    fn strings(addrs: &[CanonicalAddress]) -> Vec<&str> {
        addrs.iter().map(CanonicalAddress::as_str).collect()
    }

    #[test]
    fn delta_is_symmetric_difference() {
        let desired = set(&["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
        let observed = set(&["10.0.0.2", "10.0.0.3", "10.0.0.4"]);

        let delta = Delta::compute(&desired, &observed);

        assert_eq!(strings(&delta.to_add), vec!["10.0.0.1/32"]);
        assert_eq!(strings(&delta.to_remove), vec!["10.0.0.4/32"]);
    }

    #[test]
    fn delta_lists_are_sorted() {
        let desired = set(&["9.9.9.9", "2001:db8::1", "10.0.0.1"]);
        let delta = Delta::compute(&desired, &AddressSet::new());

        assert_eq!(
            strings(&delta.to_add),
            vec!["10.0.0.1/32", "2001:db8::1/128", "9.9.9.9/32"]
        );
        assert!(delta.to_remove.is_empty());
    }

    #[test]
    fn equal_sets_produce_empty_delta() {
        let both = set(&["10.0.0.1", "10.0.0.0/8"]);
        assert!(Delta::compute(&both, &both).is_empty());
    }

    #[test]
    fn equivalent_notations_do_not_churn() {
        let desired = set(&["10.0.0.1", "10.1.2.3/8"]);
        let observed = set(&["10.0.0.1/32", "10.0.0.0/8"]);
        assert!(Delta::compute(&desired, &observed).is_empty());
    }
}
