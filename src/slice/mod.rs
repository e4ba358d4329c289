//! Slice primitives.
//!
//! A slice is one named subtree of the store's state, owned and updated
//! by a single reducer.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ SliceReducer ──→ SliceState
//!                 ↑                │
//!                 └────────────────┘
//! ```
//!
//! - **SliceKey**: validated name of a slice
//! - **SliceState**: value held by a slice
//! - **SliceReducer**: pure function that transforms a slice on every action
//! - **DynReducer**: type-erased reducer as stored by the registry

mod erased;
mod key;
mod reducer;
mod state;

pub use erased::{AnySlice, DynReducer, IntoReducer, SharedSlice};
pub use key::SliceKey;
pub use reducer::{reducer_fn, FnReducer, SliceReducer};
pub use state::SliceState;
