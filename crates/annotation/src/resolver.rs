use crate::config::AnnotatorConfig;
use crate::container::{TypeCatalog, TypeKind};
use crate::error::{AnnotationError, Result};
use crate::metadata::{simple_name, MetadataEntry, NAMESPACE_SEPARATOR};
use serde_json::Value;

/// One step of name resolution
pub trait NameResolver: Send + Sync {
    /// Type name `declared` resolves to under this strategy, if it exists
    fn candidate(&self, declared: &str, catalog: &dyn TypeCatalog) -> Option<String>;

    /// Short label used in logs
    fn label(&self) -> &'static str;
}

/// Resolve the declared name as written
pub struct ExactName {
    marker: String,
}

impl ExactName {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl NameResolver for ExactName {
    fn candidate(&self, declared: &str, catalog: &dyn TypeCatalog) -> Option<String> {
        if is_marker(declared, &self.marker) || !catalog.exists(declared) {
            return None;
        }
        Some(declared.to_string())
    }

    fn label(&self) -> &'static str {
        "exact"
    }
}

/// Resolve the simple name inside the built-in namespace
pub struct BuiltinNamespace {
    prefix: String,
}

impl BuiltinNamespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl NameResolver for BuiltinNamespace {
    fn candidate(&self, declared: &str, catalog: &dyn TypeCatalog) -> Option<String> {
        let builtin = format!("{}{}", self.prefix, simple_name(declared));
        catalog.exists(&builtin).then_some(builtin)
    }

    fn label(&self) -> &'static str {
        "builtin"
    }
}

/// Outcome of normalizing one metadata entry
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Declaration marker, ignored
    Skip,
    /// Merged into the context as-is
    Fact { key: String, value: Value },
    /// Handler type to instantiate and queue
    Handler { class: String },
}

/// Turns declared metadata into facts or handler types
pub struct Normalizer {
    marker: String,
    resolvers: Vec<Box<dyn NameResolver>>,
}

impl Normalizer {
    /// Exact-name resolution followed by the built-in namespace fallback
    #[must_use]
    pub fn new(config: &AnnotatorConfig) -> Self {
        Self::with_resolvers(
            config.marker.clone(),
            vec![
                Box::new(ExactName::new(config.marker.clone())),
                Box::new(BuiltinNamespace::new(config.builtin_prefix())),
            ],
        )
    }

    /// Use a custom ordered list of resolvers
    pub fn with_resolvers(marker: impl Into<String>, resolvers: Vec<Box<dyn NameResolver>>) -> Self {
        Self {
            marker: marker.into(),
            resolvers,
        }
    }

    /// Classify `entry` against the known types
    pub fn resolve(&self, entry: &MetadataEntry, catalog: &dyn TypeCatalog) -> Result<Resolution> {
        if is_marker(&entry.name, &self.marker) {
            return Ok(Resolution::Skip);
        }

        let candidate = self.resolvers.iter().find_map(|resolver| {
            let class = resolver.candidate(&entry.name, catalog)?;
            log::debug!("{} resolved by {} to {class}", entry.name, resolver.label());
            Some(class)
        });

        let Some(class) = candidate else {
            return Ok(Self::fact(entry));
        };

        match catalog.kind_of(&class) {
            Some(TypeKind::Handler) => Ok(Resolution::Handler { class }),
            Some(TypeKind::AbstractHandler) => Err(AnnotationError::Uninstantiable(class)),
            Some(TypeKind::Plain) | None => Ok(Self::fact(entry)),
        }
    }

    fn fact(entry: &MetadataEntry) -> Resolution {
        Resolution::Fact {
            key: entry.fact_key(),
            value: entry.arguments.to_value(),
        }
    }
}

fn is_marker(name: &str, marker: &str) -> bool {
    name.trim_start_matches(NAMESPACE_SEPARATOR) == marker
}
