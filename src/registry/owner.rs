use std::fmt;

/// Identity of a feature module that registers slices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureId(String);

impl FeatureId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who installed a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// Supplied when the store was built.
    Base,
    /// Installed through plain `register`, no identity given.
    Anonymous,
    /// Installed by a named feature.
    Feature(FeatureId),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Base => f.write_str("base store"),
            Owner::Anonymous => f.write_str("anonymous registrant"),
            Owner::Feature(id) => write!(f, "feature '{}'", id),
        }
    }
}
