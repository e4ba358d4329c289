use thiserror::Error;

use crate::registry::{FeatureId, Owner};
use crate::slice::SliceKey;

/// Errors returned by reducer registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Slice key must not be empty")]
    EmptyKey,

    #[error("Slice '{key}' is owned by {existing}, refusing registration by {requested}")]
    KeyCollision {
        key: SliceKey,
        existing: Owner,
        requested: Owner,
    },

    #[error("Feature '{feature}' cannot be mounted from inside a reducer")]
    MountDuringReduce { feature: FeatureId },
}
