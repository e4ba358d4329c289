//! Dynamic reducer registry.
//!
//! Maps slice keys to reducers and lets features attach and detach slices
//! while the store is running. Registration only marks the registry dirty.
//! The combined reducer is rebuilt once, at the start of the next `reduce`,
//! so a burst of registrations costs a single rebuild and the action that
//! follows sees all of them.

mod combined;
mod owner;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::action::Action;
use crate::config::{CollisionPolicy, RegistryConfig};
use crate::error::RegistryError;
use crate::slice::{DynReducer, IntoReducer, SliceKey};
use crate::state::StateTree;

use combined::CombinedReducer;
pub use owner::{FeatureId, Owner};

/// Snapshot of slice key → reducer.
pub type ReducerMap = BTreeMap<SliceKey, Arc<dyn DynReducer>>;

struct Registration {
    reducer: Arc<dyn DynReducer>,
    owner: Owner,
}

/// Registry of slice reducers with a lazily rebuilt combined reducer.
///
/// Two observable states: clean (combined reducer up to date) and dirty
/// (registered or removed since the last `reduce`).
pub struct ReducerRegistry {
    entries: BTreeMap<SliceKey, Registration>,
    combined: CombinedReducer,
    dirty: bool,
    rebuilds: u64,
    policy: CollisionPolicy,
    log_unexpected_keys: bool,
}

impl ReducerRegistry {
    /// Create a registry holding the always-present base slices.
    pub fn new(base: ReducerMap) -> Self {
        Self::with_config(base, &RegistryConfig::default())
    }

    pub fn with_config(base: ReducerMap, config: &RegistryConfig) -> Self {
        let entries: BTreeMap<SliceKey, Registration> = base
            .into_iter()
            .map(|(key, reducer)| {
                (
                    key,
                    Registration {
                        reducer,
                        owner: Owner::Base,
                    },
                )
            })
            .collect();
        let combined = CombinedReducer::build(entries.iter().map(|(k, r)| (k, &r.reducer)));

        Self {
            entries,
            combined,
            dirty: false,
            rebuilds: 0,
            policy: config.collision_policy,
            log_unexpected_keys: config.log_unexpected_keys,
        }
    }

    /// Insert or replace the reducer for `key` (last write wins).
    ///
    /// The slice's state appears after the next `reduce`, starting from
    /// the state's default.
    pub fn register(
        &mut self,
        key: impl AsRef<str>,
        reducer: impl IntoReducer,
    ) -> Result<(), RegistryError> {
        let key = SliceKey::new(key.as_ref())?;
        self.install(key, reducer.into_reducer(), Owner::Anonymous);
        Ok(())
    }

    /// Register on behalf of `feature`.
    ///
    /// Re-registering a key the same feature already owns replaces it. A key
    /// owned by anyone else is a collision: rejected under
    /// [`CollisionPolicy::Reject`], overwritten with a warning under
    /// [`CollisionPolicy::Replace`]. The registry is unchanged on error.
    pub fn register_as(
        &mut self,
        feature: &FeatureId,
        key: impl AsRef<str>,
        reducer: impl IntoReducer,
    ) -> Result<(), RegistryError> {
        let key = SliceKey::new(key.as_ref())?;
        let requested = Owner::Feature(feature.clone());
        self.check_collision(&key, &requested)?;
        self.install(key, reducer.into_reducer(), requested);
        Ok(())
    }

    /// Take over `key` for `feature` whoever owns it now.
    pub fn replace(
        &mut self,
        feature: &FeatureId,
        key: impl AsRef<str>,
        reducer: impl IntoReducer,
    ) -> Result<(), RegistryError> {
        let key = SliceKey::new(key.as_ref())?;
        self.install(key, reducer.into_reducer(), Owner::Feature(feature.clone()));
        Ok(())
    }

    /// Delete the reducer for `key`. Returns false (and changes nothing)
    /// if there was none.
    pub fn remove(&mut self, key: impl AsRef<str>) -> bool {
        let key = key.as_ref();
        match self.entries.remove(key) {
            Some(registration) => {
                self.dirty = true;
                tracing::debug!(key = %key, owner = %registration.owner, "Slice reducer removed");
                true
            }
            None => false,
        }
    }

    /// Remove `key` only if `feature` still owns it.
    pub(crate) fn remove_owned(&mut self, feature: &FeatureId, key: &SliceKey) -> bool {
        let owned = matches!(
            self.entries.get(key),
            Some(Registration { owner: Owner::Feature(id), .. }) if id == feature
        );
        if !owned {
            tracing::debug!(key = %key, feature = %feature, "Slice no longer owned, leaving it");
            return false;
        }
        self.remove(key)
    }

    /// Fail if `requested` may not register `key` under the current policy.
    pub(crate) fn check_collision(
        &self,
        key: &SliceKey,
        requested: &Owner,
    ) -> Result<(), RegistryError> {
        let Some(existing) = self.entries.get(key) else {
            return Ok(());
        };
        if existing.owner == *requested {
            return Ok(());
        }

        match self.policy {
            CollisionPolicy::Reject => Err(RegistryError::KeyCollision {
                key: key.clone(),
                existing: existing.owner.clone(),
                requested: requested.clone(),
            }),
            CollisionPolicy::Replace => {
                tracing::warn!(
                    key = %key,
                    existing = %existing.owner,
                    requested = %requested,
                    "Slice key collision, overwriting"
                );
                Ok(())
            }
        }
    }

    fn install(&mut self, key: SliceKey, reducer: Arc<dyn DynReducer>, owner: Owner) {
        let state_type = reducer.state_type();
        let previous = self.entries.insert(
            key.clone(),
            Registration {
                reducer,
                owner: owner.clone(),
            },
        );
        self.dirty = true;

        match previous {
            Some(previous) => tracing::debug!(
                key = %key,
                previous_owner = %previous.owner,
                owner = %owner,
                state_type,
                "Slice reducer replaced"
            ),
            None => tracing::debug!(
                key = %key,
                owner = %owner,
                state_type,
                "Slice reducer registered"
            ),
        }
    }

    /// Current snapshot of slice key → reducer.
    pub fn get_reducer_map(&self) -> ReducerMap {
        self.entries
            .iter()
            .map(|(key, registration)| (key.clone(), Arc::clone(&registration.reducer)))
            .collect()
    }

    pub fn owner_of(&self, key: &str) -> Option<&Owner> {
        self.entries.get(key).map(|registration| &registration.owner)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SliceKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if reducers changed since the last `reduce`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many times the combined reducer has been rebuilt.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Root reducing function of the store.
    ///
    /// Rebuilds the combined reducer first if the registry is dirty, then
    /// applies it. The returned tree holds exactly the registered keys.
    pub fn reduce(&mut self, state: &StateTree, action: &Action) -> StateTree {
        if self.dirty {
            self.combined =
                CombinedReducer::build(self.entries.iter().map(|(k, r)| (k, &r.reducer)));
            self.dirty = false;
            self.rebuilds += 1;
            tracing::debug!(
                slices = self.combined.len(),
                rebuilds = self.rebuilds,
                "Combined reducer rebuilt"
            );
        }
        self.combined.apply(state, action, self.log_unexpected_keys)
    }
}

impl fmt::Debug for ReducerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slices: Vec<String> = self
            .entries
            .iter()
            .map(|(key, r)| format!("{} ({}, {})", key, r.owner, r.reducer.state_type()))
            .collect();
        f.debug_struct("ReducerRegistry")
            .field("slices", &slices)
            .field("dirty", &self.dirty)
            .field("policy", &self.policy)
            .finish()
    }
}
