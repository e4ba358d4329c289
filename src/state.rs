//! The combined state tree.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::slice::{AnySlice, SharedSlice, SliceKey, SliceState};

/// Mapping from slice key to that slice's current state.
///
/// Values are shared, so cloning a tree is cheap and snapshots taken
/// before a dispatch stay valid afterwards.
#[derive(Clone, Default)]
pub struct StateTree {
    slices: BTreeMap<SliceKey, SharedSlice>,
}

impl StateTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mainly for preloaded state.
    pub fn with_slice<S: SliceState>(
        mut self,
        key: impl Into<String>,
        state: S,
    ) -> Result<Self, RegistryError> {
        self.insert(SliceKey::new(key)?, state);
        Ok(self)
    }

    pub fn insert<S: SliceState>(&mut self, key: SliceKey, state: S) {
        self.slices.insert(key, Arc::new(state));
    }

    /// Typed access to a slice. `None` if the key is absent or holds
    /// another type.
    pub fn get<S: SliceState>(&self, key: &str) -> Option<&S> {
        self.slices
            .get(key)
            .and_then(|value| AnySlice::as_any(&**value).downcast_ref::<S>())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slices.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SliceKey> {
        self.slices.keys()
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// True if both trees hold the very same value for `key`.
    pub fn same_slice(&self, other: &StateTree, key: &str) -> bool {
        match (self.slices.get(key), other.slices.get(key)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// True if both trees have the same keys and share every value.
    pub fn is_same(&self, other: &StateTree) -> bool {
        self.slices.len() == other.slices.len()
            && self
                .slices
                .iter()
                .zip(other.slices.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && Arc::ptr_eq(va, vb))
    }

    pub(crate) fn slice(&self, key: &str) -> Option<&SharedSlice> {
        self.slices.get(key)
    }

    pub(crate) fn from_slices(slices: BTreeMap<SliceKey, SharedSlice>) -> Self {
        Self { slices }
    }
}

impl fmt::Debug for StateTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slices.iter().map(|(key, value)| (key.as_str(), value)))
            .finish()
    }
}
