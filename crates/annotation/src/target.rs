use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of program element an annotation is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The class-like entity itself
    Entity,
    /// A public method of the entity
    Operation,
}

impl Target {
    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Operation => "operation",
        }
    }

    /// Check whether a handler declaring `targets` may run against this target
    #[must_use]
    pub fn is_in(self, targets: &[Target]) -> bool {
        targets.contains(&self)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
