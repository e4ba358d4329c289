//! Reducer trait for slices.

use std::fmt;
use std::marker::PhantomData;

use crate::action::Action;

use super::state::SliceState;

/// Reducer transforms one slice based on dispatched actions.
///
/// Every registered reducer sees every action. Reducers ignore actions
/// they do not handle by returning the state unchanged.
/// It must be a pure function: (State, Action) -> State
pub trait SliceReducer: Send + Sync + 'static {
    /// The state type of the slice this reducer owns.
    type State: SliceState;

    /// Process an action and return the new slice state.
    ///
    /// A slice with no prior state is reduced from `State::default()`.
    fn reduce(&self, state: Self::State, action: &Action) -> Self::State;
}

/// Reducer backed by a closure. Built with [`reducer_fn`].
pub struct FnReducer<S, F> {
    f: F,
    _state: PhantomData<fn() -> S>,
}

impl<S, F> SliceReducer for FnReducer<S, F>
where
    S: SliceState,
    F: Fn(S, &Action) -> S + Send + Sync + 'static,
{
    type State = S;

    fn reduce(&self, state: S, action: &Action) -> S {
        (self.f)(state, action)
    }
}

impl<S, F> fmt::Debug for FnReducer<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnReducer")
            .field("state", &std::any::type_name::<S>())
            .finish()
    }
}

/// Wrap a closure as a [`SliceReducer`].
///
/// ```
/// use slicestore::{reducer_fn, Action};
///
/// let counter = reducer_fn(|count: i64, action: &Action| {
///     if action.is("increment") { count + 1 } else { count }
/// });
/// # let _ = counter;
/// ```
pub fn reducer_fn<S, F>(f: F) -> FnReducer<S, F>
where
    S: SliceState,
    F: Fn(S, &Action) -> S + Send + Sync + 'static,
{
    FnReducer {
        f,
        _state: PhantomData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler;

    impl SliceReducer for Doubler {
        type State = u32;

        fn reduce(&self, state: u32, action: &Action) -> u32 {
            if action.is("double") {
                state.max(1) * 2
            } else {
                state
            }
        }
    }

    #[test]
    fn trait_reducer_handles_own_action() {
        assert_eq!(Doubler.reduce(3, &Action::new("double")), 6);
        assert_eq!(Doubler.reduce(0, &Action::new("double")), 2);
    }

    #[test]
    fn trait_reducer_ignores_unknown_action() {
        assert_eq!(Doubler.reduce(3, &Action::new("other")), 3);
    }

    #[test]
    fn fn_reducer_delegates_to_closure() {
        let reducer = reducer_fn(|state: Vec<String>, action: &Action| {
            let mut state = state;
            state.push(action.kind.clone());
            state
        });
        let state = reducer.reduce(Vec::new(), &Action::new("a"));
        let state = reducer.reduce(state, &Action::new("b"));
        assert_eq!(state, vec!["a".to_string(), "b".to_string()]);
    }
}
