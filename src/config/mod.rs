//! Store configuration.
//!
//! Loaded from `~/.config/slicestore/config.toml` when present, defaults
//! otherwise. Only the registry policy and logging are configurable;
//! reducers are always supplied in code.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{CollisionPolicy, LoggingConfig, RegistryConfig, StoreConfig};
