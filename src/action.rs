//! Actions dispatched to the store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::slice::SliceKey;

/// Dispatched once when a store is built, so base slices initialise.
pub const STORE_INIT: &str = "@@slicestore/INIT";

/// Immutable descriptor of an intended state change.
///
/// Every registered reducer receives every action and decides by `kind`
/// whether it applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl Action {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Decode the payload. Returns `None` if it does not fit `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Option<T> {
        T::deserialize(&self.payload).ok()
    }

    pub fn store_init() -> Self {
        Self::new(STORE_INIT)
    }

    /// Dispatched right after a mounted feature registered `key`.
    pub fn slice_init(key: &SliceKey) -> Self {
        Self::new(format!("@INIT {key} reducer"))
    }

    /// Dispatched right after a mounted feature removed `key`.
    pub fn slice_destroy(key: &SliceKey) -> Self {
        Self::new(format!("@DESTROY {key} reducer"))
    }

    /// True for the store's own bookkeeping actions.
    pub fn is_lifecycle(&self) -> bool {
        self.kind == STORE_INIT
            || ((self.kind.starts_with("@INIT ") || self.kind.starts_with("@DESTROY "))
                && self.kind.ends_with(" reducer"))
    }
}
