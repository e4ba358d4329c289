use std::borrow::Borrow;
use std::fmt;

use crate::error::RegistryError;

/// Name of one slice in the state tree (e.g. "user", "articleDetails").
///
/// Never empty. Construct with [`SliceKey::new`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SliceKey(String);

impl SliceKey {
    /// Create a key. Fails with [`RegistryError::EmptyKey`] for empty or
    /// whitespace-only names.
    pub fn new(key: impl Into<String>) -> Result<Self, RegistryError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(RegistryError::EmptyKey);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SliceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SliceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SliceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for SliceKey {
    type Error = RegistryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
