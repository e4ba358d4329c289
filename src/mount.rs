//! Scoped slice registration for feature modules.
//!
//! A feature mounts its slices when it becomes active and holds the
//! returned [`SliceMount`] for as long as it is active. Dropping the guard
//! (or calling [`SliceMount::unmount`]) releases the slices.

use std::fmt;
use std::sync::Arc;

use crate::action::Action;
use crate::config::CollisionPolicy;
use crate::error::RegistryError;
use crate::registry::{FeatureId, Owner};
use crate::slice::{DynReducer, IntoReducer, SliceKey};
use crate::store::{DeferredOp, Store};

/// Slices a feature brings along.
#[derive(Clone, Default)]
pub struct ReducerList {
    entries: Vec<(String, Arc<dyn DynReducer>)>,
}

impl ReducerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, reducer: impl IntoReducer) -> Self {
        self.entries.push((key.into(), reducer.into_reducer()));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ReducerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(key, _)| key))
            .finish()
    }
}

/// How a mount behaves on release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountOptions {
    /// Remove the slices (and so their state) on release. Without it the
    /// slices stay and a later mount resumes from their state.
    pub remove_on_unmount: bool,
}

impl MountOptions {
    pub fn remove_on_unmount() -> Self {
        Self {
            remove_on_unmount: true,
        }
    }

    pub fn retain() -> Self {
        Self {
            remove_on_unmount: false,
        }
    }
}

impl Store {
    /// Register `slices` for `feature` and return a guard that releases
    /// them.
    ///
    /// Keys that are already registered are left as they are and keep
    /// their state, except that a key owned by another registrant fails
    /// with a collision under [`CollisionPolicy::Reject`]. Collisions are
    /// checked before anything is registered. A key listed twice keeps
    /// the last reducer. Every newly added key gets an
    /// `@INIT <key> reducer` dispatch.
    ///
    /// Fails with [`RegistryError::MountDuringReduce`] when called from
    /// inside a reducer.
    pub fn mount(
        &self,
        feature: FeatureId,
        slices: ReducerList,
        options: MountOptions,
    ) -> Result<SliceMount, RegistryError> {
        if self.in_reduction() {
            return Err(RegistryError::MountDuringReduce { feature });
        }

        let mut listed: Vec<(SliceKey, Arc<dyn DynReducer>)> =
            Vec::with_capacity(slices.entries.len());
        for (key, reducer) in slices.entries {
            let key = SliceKey::new(key)?;
            match listed.iter_mut().find(|entry| entry.0 == key) {
                Some(entry) => {
                    tracing::debug!(
                        key = %key,
                        feature = %feature,
                        "Slice listed twice, keeping the last reducer"
                    );
                    entry.1 = reducer;
                }
                None => listed.push((key, reducer)),
            }
        }

        let added = {
            let mut inner = self.lock_inner();
            let registry = &mut inner.registry;
            let owner = Owner::Feature(feature.clone());

            let mut pending = Vec::with_capacity(listed.len());
            for (key, reducer) in listed {
                if registry.contains(key.as_str()) {
                    if registry.policy() == CollisionPolicy::Reject {
                        registry.check_collision(&key, &owner)?;
                    }
                    tracing::debug!(
                        key = %key,
                        feature = %feature,
                        "Slice already mounted, resuming"
                    );
                    continue;
                }
                pending.push((key, reducer));
            }

            let mut added = Vec::with_capacity(pending.len());
            for (key, reducer) in pending {
                registry.register_as(&feature, key.as_str(), reducer)?;
                added.push(key);
            }
            added
        };

        for key in &added {
            self.dispatch(Action::slice_init(key));
        }

        tracing::debug!(
            feature = %feature,
            added = added.len(),
            remove_on_unmount = options.remove_on_unmount,
            "Feature mounted"
        );

        Ok(SliceMount {
            store: self.clone(),
            feature,
            keys: added,
            remove_on_unmount: options.remove_on_unmount,
            released: false,
        })
    }
}

/// Guard for slices registered by [`Store::mount`].
pub struct SliceMount {
    store: Store,
    feature: FeatureId,
    keys: Vec<SliceKey>,
    remove_on_unmount: bool,
    released: bool,
}

impl SliceMount {
    pub fn feature(&self) -> &FeatureId {
        &self.feature
    }

    /// Keys this mount added. Keys that were already registered when it
    /// mounted are not listed and are never removed by it.
    pub fn keys(&self) -> &[SliceKey] {
        &self.keys
    }

    /// Release now instead of at drop.
    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if std::mem::replace(&mut self.released, true) {
            return;
        }

        if !self.remove_on_unmount {
            tracing::debug!(feature = %self.feature, "Feature unmounted, slices retained");
            return;
        }

        if self.store.in_reduction() {
            for key in &self.keys {
                self.store.defer(DeferredOp::RemoveOwned {
                    feature: self.feature.clone(),
                    key: key.clone(),
                });
                self.store.dispatch(Action::slice_destroy(key));
            }
            tracing::debug!(
                feature = %self.feature,
                "Feature unmounted from a reducer, removal queued"
            );
            return;
        }

        let mut removed = Vec::with_capacity(self.keys.len());
        {
            let mut inner = self.store.lock_inner();
            for key in &self.keys {
                if inner.registry.remove_owned(&self.feature, key) {
                    removed.push(key);
                }
            }
        }

        for key in removed.iter().copied() {
            self.store.dispatch(Action::slice_destroy(key));
        }

        tracing::debug!(
            feature = %self.feature,
            removed = removed.len(),
            "Feature unmounted"
        );
    }
}

impl Drop for SliceMount {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for SliceMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceMount")
            .field("feature", &self.feature)
            .field("keys", &self.keys)
            .field("remove_on_unmount", &self.remove_on_unmount)
            .field("released", &self.released)
            .finish()
    }
}
