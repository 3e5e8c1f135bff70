use crate::error::{Result, ScanError};
use crate::manifest::Manifest;
use crate::options::ScanOptions;
use attrwire_annotation::{Annotator, Context, EntityReport, NAMESPACE_SEPARATOR};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of scanning one tree
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    /// Processed entities in walk order
    pub entities: Vec<EntityReport>,

    /// Source files visited
    pub files: usize,

    /// Source files whose derived name was not a loadable entity
    pub skipped: Vec<PathBuf>,
}

/// Walks a directory tree, maps source files onto entity names and hands every
/// loadable entity to the annotator
pub struct Scanner<'a> {
    annotator: &'a Annotator<'a>,
    options: ScanOptions,
}

impl<'a> Scanner<'a> {
    pub fn new(annotator: &'a Annotator<'a>, options: ScanOptions) -> Result<Self> {
        options.validate().map_err(ScanError::InvalidOptions)?;
        Ok(Self { annotator, options })
    }

    /// Scan `path`, which may be a directory or a single source file
    pub fn scan(&self, path: impl AsRef<Path>, context: &Context) -> Result<ScanReport> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScanError::InvalidPath(path.display().to_string()));
        }

        let mut context = context.clone();
        let base = context.root.get_or_insert_with(|| path.to_path_buf()).clone();

        let mut report = ScanReport::default();
        self.visit(path, &base, &context, &mut report)?;

        log::info!(
            "Scanned {} source files: {} entities, {} skipped",
            report.files,
            report.entities.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn visit(&self, path: &Path, base: &Path, context: &Context, report: &mut ScanReport) -> Result<()> {
        if path.is_dir() {
            self.visit_dir(path, base, context, report)
        } else {
            self.visit_file(path, base, context, report)
        }
    }

    fn visit_dir(&self, dir: &Path, base: &Path, context: &Context, report: &mut ScanReport) -> Result<()> {
        let manifest_path = dir.join(&self.options.manifest_file);
        // a malformed manifest counts as absent
        if let Some(manifest) = Manifest::read(&manifest_path) {
            if manifest.namespaces.is_empty() {
                log::debug!("{} declares no namespaces", manifest_path.display());
                return Ok(());
            }

            let mut context = context.clone();
            context.namespaces = manifest.namespaces.clone();
            for (namespace, dirs) in &manifest.namespaces {
                context.namespace = Some(namespace.clone());
                for relative in dirs {
                    let child = dir.join(relative.trim_end_matches(['/', '\\']));
                    if !child.exists() {
                        log::warn!("{namespace} maps to missing directory {}", child.display());
                        continue;
                    }
                    log::debug!("Scanning {namespace} in {}", child.display());
                    if child.is_dir() {
                        // the mapped directory may be the manifest's own
                        self.visit_children(&child, &child, &context, report)?;
                    } else {
                        self.visit_file(&child, &child, &context, report)?;
                    }
                }
            }
            return Ok(());
        }

        self.visit_children(dir, base, context, report)
    }

    /// Visit the entries of `dir` in name order, without manifest detection for `dir`
    fn visit_children(&self, dir: &Path, base: &Path, context: &Context, report: &mut ScanReport) -> Result<()> {
        let children = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in children {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            if entry.path().is_dir() && self.options.is_excluded(&name) {
                log::debug!("Skipping excluded directory {}", entry.path().display());
                continue;
            }
            self.visit(entry.path(), base, context, report)?;
        }
        Ok(())
    }

    fn visit_file(&self, file: &Path, base: &Path, context: &Context, report: &mut ScanReport) -> Result<()> {
        let has_extension = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.options.source_extension);
        if !has_extension {
            return Ok(());
        }
        report.files += 1;

        let Some(class) = entity_name(file, base, context.namespace.as_deref()) else {
            report.skipped.push(file.to_path_buf());
            return Ok(());
        };

        if !self.annotator.reflector().load(&class, Some(file)) {
            log::debug!("{} ({class}) is not a loadable entity", file.display());
            report.skipped.push(file.to_path_buf());
            return Ok(());
        }

        let mut context = context.clone();
        context.path = Some(file.to_path_buf());
        let entity = self.annotator.parse(&class, &context)?;
        report.entities.push(entity);
        Ok(())
    }
}

/// Entity name for `file`, relative to `base` and prefixed with `namespace`.
///
/// `src/controller/user.rs` under base `src` and namespace `App` becomes
/// `App\Controller\User`.
#[must_use]
pub fn entity_name(file: &Path, base: &Path, namespace: Option<&str>) -> Option<String> {
    let relative = file.strip_prefix(base).unwrap_or(file).with_extension("");
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            std::path::Component::Normal(part) => Some(capitalize(&part.to_string_lossy())),
            _ => None,
        })
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        return None;
    }

    if let Some(namespace) = namespace.filter(|ns| !ns.is_empty()) {
        segments.insert(0, namespace.to_string());
    }
    Some(segments.join(&NAMESPACE_SEPARATOR.to_string()))
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
