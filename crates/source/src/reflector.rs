use crate::analyzer::{ParsedEntity, ParsedSource, SourceAnalyzer};
use crate::attribute::RawAttribute;
use crate::error::Result;
use attrwire_annotation::{
    simple_name, AnnotationError, MetadataEntry, Reflector, TargetRef, NAMESPACE_SEPARATOR,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Reflector reading entity declarations from Rust source files.
///
/// Files are parsed on first use and cached for the lifetime of the reflector.
pub struct SourceReflector {
    analyzer: Mutex<SourceAnalyzer>,
    files: Mutex<HashMap<PathBuf, Arc<ParsedSource>>>,
    /// Loaded entity name → file it was declared in
    classes: Mutex<HashMap<String, PathBuf>>,
}

impl SourceReflector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            analyzer: Mutex::new(SourceAnalyzer::new()?),
            files: Mutex::new(HashMap::new()),
            classes: Mutex::new(HashMap::new()),
        })
    }

    /// Parse `content` as if read from `path`, replacing any cached version
    pub fn insert_source(&self, path: impl Into<PathBuf>, content: &str) -> Result<()> {
        let parsed = lock(&self.analyzer).analyze(content)?;
        lock(&self.files).insert(path.into(), Arc::new(parsed));
        Ok(())
    }

    /// Number of parsed files held in the cache
    #[must_use]
    pub fn cached_files(&self) -> usize {
        lock(&self.files).len()
    }

    fn parsed(&self, path: &Path) -> Result<Arc<ParsedSource>> {
        if let Some(parsed) = lock(&self.files).get(path) {
            return Ok(Arc::clone(parsed));
        }

        let content = std::fs::read_to_string(path)?;
        let parsed = Arc::new(lock(&self.analyzer).analyze(&content)?);
        log::debug!(
            "Parsed {}: {} entities",
            path.display(),
            parsed.entities.len()
        );
        lock(&self.files).insert(path.to_path_buf(), Arc::clone(&parsed));
        Ok(parsed)
    }

    fn with_entity<T>(
        &self,
        class: &str,
        f: impl FnOnce(&ParsedSource, &ParsedEntity) -> T,
    ) -> attrwire_annotation::Result<T> {
        let path = lock(&self.classes)
            .get(class)
            .cloned()
            .ok_or_else(|| AnnotationError::reflection(format!("entity {class} is not loaded")))?;
        let parsed = self
            .parsed(&path)
            .map_err(|e| AnnotationError::reflection(format!("{}: {e}", path.display())))?;
        let entity = parsed.entity(simple_name(class)).ok_or_else(|| {
            AnnotationError::reflection(format!("{class} is not declared in {}", path.display()))
        })?;
        Ok(f(&parsed, entity))
    }
}

impl Reflector for SourceReflector {
    fn load(&self, class: &str, origin: Option<&Path>) -> bool {
        let Some(path) = origin else {
            return lock(&self.classes).contains_key(class);
        };

        let parsed = match self.parsed(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                return false;
            }
        };
        if parsed.entity(simple_name(class)).is_none() {
            return false;
        }

        lock(&self.classes).insert(class.to_string(), path.to_path_buf());
        true
    }

    fn declared_metadata(&self, target: TargetRef<'_>) -> attrwire_annotation::Result<Vec<MetadataEntry>> {
        let class = target.class();
        let namespace = namespace_of(class);
        match target {
            TargetRef::Entity(_) => self.with_entity(class, |parsed, entity| {
                qualify_all(&entity.attributes, parsed, namespace)
            }),
            TargetRef::Operation { method, .. } => self
                .with_entity(class, |parsed, entity| {
                    entity
                        .operations
                        .iter()
                        .find(|op| op.name == method)
                        .map(|op| qualify_all(&op.attributes, parsed, namespace))
                })?
                .ok_or_else(|| {
                    AnnotationError::reflection(format!("unknown operation {class}::{method}"))
                }),
        }
    }

    fn public_operations(&self, class: &str) -> attrwire_annotation::Result<Vec<String>> {
        self.with_entity(class, |_, entity| {
            entity.operations.iter().map(|op| op.name.clone()).collect()
        })
    }
}

fn qualify_all(attributes: &[RawAttribute], parsed: &ParsedSource, namespace: &str) -> Vec<MetadataEntry> {
    attributes
        .iter()
        .map(|attribute| {
            MetadataEntry::new(qualify(&attribute.path, &parsed.imports, namespace))
                .with_arguments(attribute.arguments.clone())
        })
        .collect()
}

/// Turn an attribute path into a namespaced annotation name.
///
/// A leading segment bound by `use` expands to its import path. Remaining
/// single-segment names live in the entity's own namespace.
fn qualify(path: &[String], imports: &HashMap<String, Vec<String>>, namespace: &str) -> String {
    let separator = NAMESPACE_SEPARATOR.to_string();
    let Some((head, rest)) = path.split_first() else {
        return String::new();
    };

    if let Some(imported) = imports.get(head) {
        return imported
            .iter()
            .chain(rest)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(&separator);
    }

    if rest.is_empty() && !namespace.is_empty() {
        return format!("{namespace}{separator}{head}");
    }
    path.join(&separator)
}

fn namespace_of(class: &str) -> &str {
    class
        .rsplit_once(NAMESPACE_SEPARATOR)
        .map_or("", |(namespace, _)| namespace)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
