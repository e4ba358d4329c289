//! Type-erased reducers and slice values.
//!
//! The registry holds slices of unrelated types side by side, so it works
//! with `dyn` versions of [`SliceReducer`] and [`SliceState`].

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use crate::action::Action;

use super::reducer::SliceReducer;
use super::state::SliceState;

/// Object-safe view of a slice value.
pub trait AnySlice: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// Rust type name of the concrete state, for diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T: SliceState> AnySlice for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Shared slice value. Unchanged slices keep the same allocation across
/// dispatches.
pub type SharedSlice = Arc<dyn AnySlice>;

/// Object-safe reducer as stored in the registry.
pub trait DynReducer: Send + Sync {
    /// Reduce the previous value of a slice.
    ///
    /// `previous` is `None` for a slice that has no state yet. A previous
    /// value of another type (left behind by a replaced reducer) is treated
    /// the same way.
    fn reduce_dyn(&self, previous: Option<&SharedSlice>, action: &Action) -> SharedSlice;

    /// Rust type name of the state this reducer produces.
    fn state_type(&self) -> &'static str;
}

impl<R: SliceReducer> DynReducer for R {
    fn reduce_dyn(&self, previous: Option<&SharedSlice>, action: &Action) -> SharedSlice {
        let typed = previous.and_then(|value| value.as_any().downcast_ref::<R::State>());
        if let (Some(value), None) = (previous, typed) {
            tracing::debug!(
                found = value.type_name(),
                expected = std::any::type_name::<R::State>(),
                "Slice state type changed, starting from default"
            );
        }

        let next = self.reduce(typed.cloned().unwrap_or_default(), action);

        match (previous, typed) {
            (Some(value), Some(old)) if *old == next => Arc::clone(value),
            _ => Arc::new(next),
        }
    }

    fn state_type(&self) -> &'static str {
        std::any::type_name::<R::State>()
    }
}

/// Anything that can be installed as a slice reducer.
pub trait IntoReducer {
    fn into_reducer(self) -> Arc<dyn DynReducer>;
}

impl<R: SliceReducer> IntoReducer for R {
    fn into_reducer(self) -> Arc<dyn DynReducer> {
        Arc::new(self)
    }
}

impl IntoReducer for Arc<dyn DynReducer> {
    fn into_reducer(self) -> Arc<dyn DynReducer> {
        self
    }
}
