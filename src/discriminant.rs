//! The discriminant: the one field of every enum value that names its variant.
use std::fmt;
use serde::{Deserialize, Serialize};

/// Field name used when none is given.
pub const DEFAULT_DISCRIMINANT: &str = "_type";

/// Name of the field holding the variant name.
///
/// Read once when a builder, matcher or helper is set up; there is no global
/// mutable default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Discriminant(String);

impl Discriminant {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Discriminant {
    fn default() -> Self {
        Self(DEFAULT_DISCRIMINANT.to_string())
    }
}

impl From<&str> for Discriminant {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Discriminant {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for Discriminant {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Discriminant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_underscore_type() {
        assert_eq!(Discriminant::default().as_str(), "_type");
        assert_eq!(Discriminant::from("kind").to_string(), "kind");
    }
}
