//! Store handle.
//!
//! Owns the reducer registry and the current state tree. Dispatch and
//! registration are serialised by one lock, so a registration that arrives
//! while an action is being reduced takes effect on the next dispatch.
//!
//! A reducer may hold a store handle. Registry changes it makes while
//! reducing are queued and applied once the reduction finishes, and
//! actions it dispatches run after the current one.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, MutexGuard};

use crate::action::Action;
use crate::config::StoreConfig;
use crate::error::RegistryError;
use crate::registry::{FeatureId, Owner, ReducerMap, ReducerRegistry};
use crate::slice::{DynReducer, IntoReducer, SliceKey, SliceState};
use crate::state::StateTree;

/// Identifies a listener registered with [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&StateTree) + Send + Sync>;

/// Builds a [`Store`] from base slices and optional preloaded state.
pub struct StoreBuilder {
    config: StoreConfig,
    base: Vec<(String, Arc<dyn DynReducer>)>,
    preloaded: StateTree,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            base: Vec::new(),
            preloaded: StateTree::new(),
        }
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Add an always-present slice.
    pub fn slice(mut self, key: impl Into<String>, reducer: impl IntoReducer) -> Self {
        self.base.push((key.into(), reducer.into_reducer()));
        self
    }

    /// State to start from. Slices without a base reducer are dropped by
    /// the init dispatch.
    pub fn preloaded(mut self, state: StateTree) -> Self {
        self.preloaded = state;
        self
    }

    /// Build the store and dispatch the store init action.
    ///
    /// Fails if a base slice key is empty. A base key given twice keeps
    /// the last reducer.
    pub fn build(self) -> Result<Store, RegistryError> {
        let mut base = ReducerMap::new();
        for (key, reducer) in self.base {
            let key = SliceKey::new(key)?;
            if base.insert(key.clone(), reducer).is_some() {
                tracing::warn!(key = %key, "Base slice given twice, keeping the last reducer");
            }
        }

        let mut registry = ReducerRegistry::with_config(base, &self.config.registry);
        let state = registry.reduce(&self.preloaded, &Action::store_init());
        tracing::debug!(slices = state.len(), "Store built");

        Ok(Store {
            inner: Arc::new(Mutex::new(StoreInner { registry, state })),
            listeners: Arc::new(Mutex::new(Listeners::default())),
            reducing: Arc::new(Mutex::new(None)),
            deferred: Arc::new(Mutex::new(Deferred::default())),
        })
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe store handle. Clones share the same store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<StoreInner>>,
    listeners: Arc<Mutex<Listeners>>,
    /// Thread currently running reducers, if any.
    reducing: Arc<Mutex<Option<ThreadId>>>,
    deferred: Arc<Mutex<Deferred>>,
}

pub(crate) struct StoreInner {
    pub(crate) registry: ReducerRegistry,
    state: StateTree,
}

/// Registry change requested by a reducer while it was running.
pub(crate) enum DeferredOp {
    Register {
        key: SliceKey,
        reducer: Arc<dyn DynReducer>,
    },
    RegisterAs {
        feature: FeatureId,
        key: SliceKey,
        reducer: Arc<dyn DynReducer>,
    },
    Replace {
        feature: FeatureId,
        key: SliceKey,
        reducer: Arc<dyn DynReducer>,
    },
    Remove {
        key: SliceKey,
    },
    RemoveOwned {
        feature: FeatureId,
        key: SliceKey,
    },
}

impl DeferredOp {
    fn apply(self, registry: &mut ReducerRegistry) {
        let result = match self {
            DeferredOp::Register { key, reducer } => registry.register(key, reducer),
            DeferredOp::RegisterAs {
                feature,
                key,
                reducer,
            } => registry.register_as(&feature, key, reducer),
            DeferredOp::Replace {
                feature,
                key,
                reducer,
            } => registry.replace(&feature, key, reducer),
            DeferredOp::Remove { key } => {
                registry.remove(key);
                Ok(())
            }
            DeferredOp::RemoveOwned { feature, key } => {
                registry.remove_owned(&feature, &key);
                Ok(())
            }
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Registration queued during reduce was rejected");
        }
    }
}

#[derive(Default)]
struct Deferred {
    ops: Vec<DeferredOp>,
    actions: VecDeque<Action>,
}

/// Marks the current thread as reducing until dropped, also on unwind.
struct ReducingGuard<'a> {
    reducing: &'a Mutex<Option<ThreadId>>,
}

impl<'a> ReducingGuard<'a> {
    fn enter(reducing: &'a Mutex<Option<ThreadId>>) -> Self {
        *reducing.lock() = Some(thread::current().id());
        Self { reducing }
    }
}

impl Drop for ReducingGuard<'_> {
    fn drop(&mut self) {
        *self.reducing.lock() = None;
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, Listener>,
}

impl Store {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Reduce `action` into a new state tree.
    ///
    /// Listeners are called afterwards, outside the lock, and only if the
    /// tree changed. Called from inside a reducer, the action is queued
    /// and reduced after the current one.
    pub fn dispatch(&self, action: Action) {
        if self.in_reduction() {
            tracing::debug!(action = %action.kind, "Dispatch from a reducer, queued");
            self.deferred.lock().actions.push_back(action);
            return;
        }

        let mut next = Some(action);
        while let Some(action) = next {
            self.dispatch_one(action);
            next = self.deferred.lock().actions.pop_front();
        }
    }

    fn dispatch_one(&self, action: Action) {
        let changed = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let next = {
                let _reducing = ReducingGuard::enter(&self.reducing);
                inner.registry.reduce(&inner.state, &action)
            };
            let ops = std::mem::take(&mut self.deferred.lock().ops);
            for op in ops {
                op.apply(&mut inner.registry);
            }
            let changed = !next.is_same(&inner.state);
            inner.state = next;
            changed.then(|| inner.state.clone())
        };

        tracing::trace!(action = %action.kind, changed = changed.is_some(), "Action dispatched");

        if let Some(state) = changed {
            self.notify(&state);
        }
    }

    /// True while the calling thread is inside a reducer of this store.
    pub(crate) fn in_reduction(&self) -> bool {
        *self.reducing.lock() == Some(thread::current().id())
    }

    pub(crate) fn defer(&self, op: DeferredOp) {
        self.deferred.lock().ops.push(op);
    }

    /// Lock the registry and state. Reads from inside a reducer would wait
    /// on the dispatch holding the lock, so they panic instead.
    pub(crate) fn lock_inner(&self) -> MutexGuard<'_, StoreInner> {
        assert!(
            !self.in_reduction(),
            "store state read from inside a reducer; reducers get their state as an argument"
        );
        self.inner.lock()
    }

    /// Snapshot of the current state tree.
    pub fn state(&self) -> StateTree {
        self.lock_inner().state.clone()
    }

    /// Clone of one slice's state, if present and of type `S`.
    pub fn select<S: SliceState>(&self, key: &str) -> Option<S> {
        self.lock_inner().state.get::<S>(key).cloned()
    }

    /// See [`ReducerRegistry::register`].
    ///
    /// From inside a reducer the key is validated at once and the
    /// registration applied when the reduction finishes.
    pub fn register(
        &self,
        key: impl AsRef<str>,
        reducer: impl IntoReducer,
    ) -> Result<(), RegistryError> {
        if self.in_reduction() {
            let key = SliceKey::new(key.as_ref())?;
            self.defer(DeferredOp::Register {
                key,
                reducer: reducer.into_reducer(),
            });
            return Ok(());
        }
        self.lock_inner().registry.register(key, reducer)
    }

    /// See [`ReducerRegistry::register_as`].
    ///
    /// From inside a reducer, collisions are only detected when the queued
    /// registration is applied, and are logged instead of returned.
    pub fn register_as(
        &self,
        feature: &FeatureId,
        key: impl AsRef<str>,
        reducer: impl IntoReducer,
    ) -> Result<(), RegistryError> {
        if self.in_reduction() {
            let key = SliceKey::new(key.as_ref())?;
            self.defer(DeferredOp::RegisterAs {
                feature: feature.clone(),
                key,
                reducer: reducer.into_reducer(),
            });
            return Ok(());
        }
        self.lock_inner().registry.register_as(feature, key, reducer)
    }

    /// See [`ReducerRegistry::replace`].
    pub fn replace(
        &self,
        feature: &FeatureId,
        key: impl AsRef<str>,
        reducer: impl IntoReducer,
    ) -> Result<(), RegistryError> {
        if self.in_reduction() {
            let key = SliceKey::new(key.as_ref())?;
            self.defer(DeferredOp::Replace {
                feature: feature.clone(),
                key,
                reducer: reducer.into_reducer(),
            });
            return Ok(());
        }
        self.lock_inner().registry.replace(feature, key, reducer)
    }

    /// See [`ReducerRegistry::remove`].
    ///
    /// From inside a reducer the removal is queued and `false` is returned,
    /// since whether the key exists is only known once it is applied.
    pub fn remove(&self, key: impl AsRef<str>) -> bool {
        if self.in_reduction() {
            if let Ok(key) = SliceKey::new(key.as_ref()) {
                self.defer(DeferredOp::Remove { key });
            }
            return false;
        }
        self.lock_inner().registry.remove(key)
    }

    pub fn reducer_keys(&self) -> Vec<SliceKey> {
        self.lock_inner().registry.keys().cloned().collect()
    }

    pub fn owner_of(&self, key: &str) -> Option<Owner> {
        self.lock_inner().registry.owner_of(key).cloned()
    }

    /// Snapshot of the registered reducers.
    pub fn reducer_map(&self) -> ReducerMap {
        self.lock_inner().registry.get_reducer_map()
    }

    /// Call `listener` with the new state after every dispatch that
    /// changed it.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&StateTree) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(id, Arc::new(listener));
        SubscriptionId(id)
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.lock().entries.remove(&id.0).is_some()
    }

    fn notify(&self, state: &StateTree) {
        let listeners: Vec<Listener> = self.listeners.lock().entries.values().cloned().collect();
        for listener in listeners {
            listener(state);
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(inner) => f
                .debug_struct("Store")
                .field("registry", &inner.registry)
                .field("state", &inner.state)
                .finish(),
            None => f.debug_struct("Store").finish_non_exhaustive(),
        }
    }
}
