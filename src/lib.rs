//! Slice-based state store with runtime reducer registration.
//!
//! The global state is a tree of named slices. Each slice has its own
//! reducer. Base slices are supplied when the store is built; feature
//! modules mount further slices while they are active and release them
//! when they go away.
//!
//! ```
//! use slicestore::{reducer_fn, Action, FeatureId, MountOptions, ReducerList, Store};
//!
//! let store = Store::builder()
//!     .slice("user", reducer_fn(|name: String, action: &Action| {
//!         action.payload_as::<String>().filter(|_| action.is("user/set")).unwrap_or(name)
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let mount = store
//!     .mount(
//!         FeatureId::new("ArticleDetails"),
//!         ReducerList::new().with("articleDetails", reducer_fn(|loading: bool, action: &Action| {
//!             if action.is("article/fetch") { true } else { loading }
//!         })),
//!         MountOptions::remove_on_unmount(),
//!     )
//!     .unwrap();
//! assert!(store.state().contains("articleDetails"));
//!
//! drop(mount);
//! assert!(!store.state().contains("articleDetails"));
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod logging;
pub mod mount;
pub mod registry;
pub mod slice;
pub mod state;
pub mod store;

pub use action::Action;
pub use config::{CollisionPolicy, ConfigError, StoreConfig};
pub use error::RegistryError;
pub use mount::{MountOptions, ReducerList, SliceMount};
pub use registry::{FeatureId, Owner, ReducerMap, ReducerRegistry};
pub use slice::{reducer_fn, IntoReducer, SliceKey, SliceReducer, SliceState};
pub use state::StateTree;
pub use store::{Store, StoreBuilder, SubscriptionId};
