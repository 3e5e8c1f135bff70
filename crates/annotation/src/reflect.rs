use crate::error::{AnnotationError, Result};
use crate::metadata::MetadataEntry;
use crate::target::Target;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Element whose metadata is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRef<'a> {
    Entity(&'a str),
    Operation { class: &'a str, method: &'a str },
}

impl TargetRef<'_> {
    #[must_use]
    pub const fn kind(&self) -> Target {
        match self {
            Self::Entity(_) => Target::Entity,
            Self::Operation { .. } => Target::Operation,
        }
    }

    #[must_use]
    pub const fn class(&self) -> &str {
        match self {
            Self::Entity(class) | Self::Operation { class, .. } => *class,
        }
    }
}

/// Source of declared metadata for entities
pub trait Reflector {
    /// Whether `class` names a loadable entity.
    ///
    /// `origin` is the file the name was derived from, when known.
    fn load(&self, class: &str, origin: Option<&Path>) -> bool;

    /// Metadata declared on `target`, in declaration order
    fn declared_metadata(&self, target: TargetRef<'_>) -> Result<Vec<MetadataEntry>>;

    /// Public operations of `class`, in declaration order
    fn public_operations(&self, class: &str) -> Result<Vec<String>>;
}

/// Declared shape of one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDecl {
    #[serde(default)]
    pub attributes: Vec<MetadataEntry>,

    #[serde(default)]
    pub operations: Vec<OperationDecl>,
}

/// Declared shape of one public operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDecl {
    pub name: String,

    #[serde(default)]
    pub attributes: Vec<MetadataEntry>,
}

impl EntityDecl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add an entity-level annotation
    #[must_use]
    pub fn attribute(mut self, entry: MetadataEntry) -> Self {
        self.attributes.push(entry);
        self
    }

    /// Builder: add a public operation with its annotations
    #[must_use]
    pub fn operation(mut self, name: impl Into<String>, attributes: Vec<MetadataEntry>) -> Self {
        self.operations.push(OperationDecl {
            name: name.into(),
            attributes,
        });
        self
    }

    fn find_operation(&self, method: &str) -> Option<&OperationDecl> {
        self.operations.iter().find(|op| op.name == method)
    }
}

/// Reflector over declarations held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryReflector {
    entities: HashMap<String, EntityDecl>,
}

impl InMemoryReflector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the declaration of `class`
    pub fn insert(&mut self, class: impl Into<String>, decl: EntityDecl) -> &mut Self {
        self.entities.insert(class.into(), decl);
        self
    }

    #[must_use]
    pub fn get(&self, class: &str) -> Option<&EntityDecl> {
        self.entities.get(class)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn entity(&self, class: &str) -> Result<&EntityDecl> {
        self.entities
            .get(class)
            .ok_or_else(|| AnnotationError::reflection(format!("unknown entity {class}")))
    }
}

impl Reflector for InMemoryReflector {
    fn load(&self, class: &str, _origin: Option<&Path>) -> bool {
        self.entities.contains_key(class)
    }

    fn declared_metadata(&self, target: TargetRef<'_>) -> Result<Vec<MetadataEntry>> {
        match target {
            TargetRef::Entity(class) => Ok(self.entity(class)?.attributes.clone()),
            TargetRef::Operation { class, method } => self
                .entity(class)?
                .find_operation(method)
                .map(|op| op.attributes.clone())
                .ok_or_else(|| {
                    AnnotationError::reflection(format!("unknown operation {class}::{method}"))
                }),
        }
    }

    fn public_operations(&self, class: &str) -> Result<Vec<String>> {
        Ok(self
            .entity(class)?
            .operations
            .iter()
            .map(|op| op.name.clone())
            .collect())
    }
}
