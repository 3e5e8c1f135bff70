use serde::{Deserialize, Serialize};

use crate::metadata::NAMESPACE_SEPARATOR;

/// Configuration for annotation resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Namespace searched for built-in handlers when a declared name does not
    /// resolve as written (e.g. `Route` declared without an import)
    pub builtin_namespace: String,

    /// Name of the declaration-marker type, which is never treated as an annotation
    pub marker: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            builtin_namespace: "Attrwire\\Annotations\\".to_string(),
            marker: "Attribute".to_string(),
        }
    }
}

impl AnnotatorConfig {
    /// Built-in namespace with exactly one trailing separator
    #[must_use]
    pub fn builtin_prefix(&self) -> String {
        let trimmed = self.builtin_namespace.trim_end_matches(NAMESPACE_SEPARATOR);
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}{NAMESPACE_SEPARATOR}")
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.marker.trim().is_empty() {
            return Err("marker must not be empty".to_string());
        }

        if self
            .builtin_namespace
            .trim_matches(NAMESPACE_SEPARATOR)
            .contains(&format!("{NAMESPACE_SEPARATOR}{NAMESPACE_SEPARATOR}"))
        {
            return Err(format!(
                "builtin_namespace ({}) contains an empty segment",
                self.builtin_namespace
            ));
        }

        Ok(())
    }
}
