//! The combined reducing function.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::action::Action;
use crate::slice::{DynReducer, SliceKey};
use crate::state::StateTree;

/// Snapshot of the reducer map, applied slice by slice.
///
/// Built from the registry and cached until the next registration change.
pub(crate) struct CombinedReducer {
    reducers: Vec<(SliceKey, Arc<dyn DynReducer>)>,
}

impl CombinedReducer {
    pub(crate) fn build<'a>(
        reducers: impl Iterator<Item = (&'a SliceKey, &'a Arc<dyn DynReducer>)>,
    ) -> Self {
        Self {
            reducers: reducers
                .map(|(key, reducer)| (key.clone(), Arc::clone(reducer)))
                .collect(),
        }
    }

    /// Run every reducer against its slice of `state`.
    ///
    /// The result holds exactly the reducer keys. Slices of `state` with
    /// no reducer are dropped.
    pub(crate) fn apply(
        &self,
        state: &StateTree,
        action: &Action,
        log_unexpected: bool,
    ) -> StateTree {
        if log_unexpected {
            let unexpected: Vec<&str> = state
                .keys()
                .filter(|key| !self.reducers.iter().any(|(k, _)| k == *key))
                .map(SliceKey::as_str)
                .collect();
            if !unexpected.is_empty() {
                tracing::debug!(
                    keys = ?unexpected,
                    action = %action.kind,
                    "Dropping state for slices without a reducer"
                );
            }
        }

        let slices: BTreeMap<_, _> = self
            .reducers
            .iter()
            .map(|(key, reducer)| {
                let next = reducer.reduce_dyn(state.slice(key.as_str()), action);
                (key.clone(), next)
            })
            .collect();

        StateTree::from_slices(slices)
    }

    pub(crate) fn len(&self) -> usize {
        self.reducers.len()
    }
}
