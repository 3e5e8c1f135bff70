use crate::target::Target;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Accumulated state for one processing pass.
///
/// Contexts are passed by value: each pass consumes the snapshot it was given and
/// returns the next one. Operation passes start from [`Context::for_operation`], so
/// changes made while handling one method never reach its siblings or the
/// entity-level context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Origin of the scan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// File currently being processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Namespace to directory mappings declared by the package manifest
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespaces: BTreeMap<String, Vec<String>>,

    /// Namespace mapped onto the directory being walked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Fully-qualified name of the entity being processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    /// Kind of element the current pass is processing
    pub target: Target,

    /// Operation name during an operation pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Plain facts and handler results
    #[serde(flatten)]
    values: BTreeMap<String, Value>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            root: None,
            path: None,
            namespaces: BTreeMap::new(),
            namespace: None,
            class: None,
            target: Target::Entity,
            method: None,
            values: BTreeMap::new(),
        }
    }
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the scan root
    #[must_use]
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Builder: set a value
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Snapshot for the entity pass of `class`
    #[must_use]
    pub fn for_entity(&self, class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            target: Target::Entity,
            method: None,
            ..self.clone()
        }
    }

    /// Snapshot for the operation pass of `method`, derived from the entity context
    #[must_use]
    pub fn for_operation(&self, method: impl Into<String>) -> Self {
        Self {
            target: Target::Operation,
            method: Some(method.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Set a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    /// All facts and handler results
    #[must_use]
    pub const fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_operation_snapshot_is_isolated() {
        let entity = Context::new()
            .with_root("/app")
            .for_entity("App\\User")
            .with_value("prefix", "/users");

        let mut op = entity.for_operation("index");
        op.insert("route", json!(["GET", "/"]));

        assert_eq!(op.target, Target::Operation);
        assert_eq!(op.method.as_deref(), Some("index"));
        assert_eq!(op.get("prefix"), Some(&json!("/users")));
        assert!(!entity.contains("route"));
        assert_eq!(entity.target, Target::Entity);
        assert_eq!(entity.method, None);
    }

    #[test]
    fn test_serializes_values_flat() {
        let ctx = Context::new()
            .for_entity("App\\User")
            .with_value("prefix", "/users");
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(
            value,
            json!({"class": "App\\User", "target": "entity", "prefix": "/users"})
        );
    }
}
