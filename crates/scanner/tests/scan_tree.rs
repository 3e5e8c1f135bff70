use attrwire_annotation::{
    AnnotationError, AnnotationHandler, Annotator, AnnotatorConfig, Arguments, Context, Instance,
    Registry, Result, Target,
};
use attrwire_scanner::{ScanError, ScanOptions, Scanner};
use attrwire_source::SourceReflector;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct Store {
    key: &'static str,
    value: Value,
    targets: &'static [Target],
}

impl AnnotationHandler for Store {
    fn handle(&self, _context: &Context, _instance: Option<&Instance>) -> Result<Option<Value>> {
        Ok(Some(self.value.clone()))
    }

    fn context_key(&self) -> Option<&str> {
        Some(self.key)
    }

    fn targets(&self) -> &[Target] {
        self.targets
    }
}

struct Explode;

impl AnnotationHandler for Explode {
    fn handle(&self, context: &Context, _instance: Option<&Instance>) -> Result<Option<Value>> {
        Err(AnnotationError::handler(
            "Attrwire\\Annotations\\Explode",
            format!("refused {:?}", context.class),
        ))
    }

    fn targets(&self) -> &[Target] {
        &[Target::Entity]
    }
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_handler("Attrwire\\Annotations\\Prefix", |args: &Arguments| {
        Ok(Box::new(Store {
            key: "prefix",
            value: args.get(0).cloned().unwrap_or(Value::Null),
            targets: &[Target::Entity],
        }) as Box<dyn AnnotationHandler>)
    });
    registry.register_handler("Attrwire\\Annotations\\Route", |args: &Arguments| {
        Ok(Box::new(Store {
            key: "route",
            value: args.to_value(),
            targets: &[Target::Operation],
        }) as Box<dyn AnnotationHandler>)
    });
    registry.register_handler("Attrwire\\Annotations\\Explode", |_: &Arguments| {
        Ok(Box::new(Explode) as Box<dyn AnnotationHandler>)
    });
    registry.set_fallback_entity(|class| Ok(Arc::new(class.to_string()) as Instance));
    registry
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const USER: &str = r#"
#[Prefix("/users")]
pub struct User;

impl User {
    #[Route("GET", "/")]
    pub fn index(&self) {}
}
"#;

#[test]
fn manifest_namespaces_drive_the_walk() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "composer.json",
        r#"{"autoload": {"psr-4": {"App\\": "src/"}}}"#,
    );
    write(root, "src/controller/user.rs", USER);
    write(root, "tools/Ignored.rs", "pub struct Ignored;");

    let registry = registry();
    let reflector = SourceReflector::new().unwrap();
    let config = AnnotatorConfig::default();
    let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
    let scanner = Scanner::new(&annotator, ScanOptions::default()).unwrap();

    let report = scanner.scan(root, &Context::new()).unwrap();
    assert_eq!(report.entities.len(), 1);

    let user = &report.entities[0];
    assert_eq!(user.class, "App\\Controller\\User");
    assert_eq!(user.context.get("prefix"), Some(&json!("/users")));
    assert_eq!(user.context.namespace.as_deref(), Some("App"));
    assert_eq!(user.context.root.as_deref(), Some(root));
    assert_eq!(
        user.context.namespaces.get("App"),
        Some(&vec!["src/".to_string()])
    );

    let index = user.operation("index").unwrap();
    assert_eq!(index.context.get("route"), Some(&json!(["GET", "/"])));
    assert!(index
        .context
        .path
        .as_deref()
        .is_some_and(|p| p.ends_with("src/controller/user.rs")));
}

#[test]
fn plain_tree_skips_vendor_and_hidden_entries() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "jobs/cleanup.rs", "#[Queue(\"low\")]\npub struct Cleanup;");
    write(root, "jobs/archive.rs", "pub struct Archive;");
    write(root, "vendor/lib.rs", "pub struct Lib;");
    write(root, ".cache/stale.rs", "pub struct Stale;");
    write(root, "README.md", "# readme");

    let registry = registry();
    let reflector = SourceReflector::new().unwrap();
    let config = AnnotatorConfig::default();
    let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
    let scanner = Scanner::new(&annotator, ScanOptions::default()).unwrap();

    let report = scanner.scan(root, &Context::new()).unwrap();
    let classes: Vec<&str> = report.entities.iter().map(|e| e.class.as_str()).collect();
    assert_eq!(classes, vec!["Jobs\\Archive", "Jobs\\Cleanup"]);
    assert_eq!(report.files, 2);

    let cleanup = &report.entities[1];
    assert_eq!(cleanup.context.get("queue"), Some(&json!(["low"])));
}

#[test]
fn manifest_without_namespaces_scans_nothing() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "composer.json", r#"{"name": "acme/tools"}"#);
    write(root, "src/User.rs", USER);

    let registry = registry();
    let reflector = SourceReflector::new().unwrap();
    let config = AnnotatorConfig::default();
    let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
    let scanner = Scanner::new(&annotator, ScanOptions::default()).unwrap();

    let report = scanner.scan(root, &Context::new()).unwrap();
    assert!(report.entities.is_empty());
    assert_eq!(report.files, 0);
}

#[test]
fn malformed_manifest_falls_back_to_directory_walk() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "composer.json", "{ broken");
    write(root, "User.rs", USER);

    let registry = registry();
    let reflector = SourceReflector::new().unwrap();
    let config = AnnotatorConfig::default();
    let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
    let scanner = Scanner::new(&annotator, ScanOptions::default()).unwrap();

    let report = scanner.scan(root, &Context::new()).unwrap();
    assert_eq!(report.entities.len(), 1);
    assert_eq!(report.entities[0].class, "User");
}

#[test]
fn files_without_matching_entity_are_skipped() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "helpers.rs", "pub fn helper() {}");

    let registry = registry();
    let reflector = SourceReflector::new().unwrap();
    let config = AnnotatorConfig::default();
    let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
    let scanner = Scanner::new(&annotator, ScanOptions::default()).unwrap();

    let report = scanner.scan(root, &Context::new()).unwrap();
    assert!(report.entities.is_empty());
    assert_eq!(report.skipped, vec![root.join("helpers.rs")]);
}

#[test]
fn failing_handler_aborts_the_scan() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "Broken.rs", "#[Explode]\npub struct Broken;");
    write(root, "Fine.rs", "pub struct Fine;");

    let registry = registry();
    let reflector = SourceReflector::new().unwrap();
    let config = AnnotatorConfig::default();
    let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
    let scanner = Scanner::new(&annotator, ScanOptions::default()).unwrap();

    let err = scanner.scan(root, &Context::new()).unwrap_err();
    assert!(matches!(err, ScanError::AnnotationError(_)));
    assert!(err.to_string().contains("Broken"));
}

#[test]
fn missing_path_is_rejected() {
    let dir = TempDir::new().unwrap();
    let registry = registry();
    let reflector = SourceReflector::new().unwrap();
    let config = AnnotatorConfig::default();
    let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
    let scanner = Scanner::new(&annotator, ScanOptions::default()).unwrap();

    let err = scanner
        .scan(dir.path().join("nope"), &Context::new())
        .unwrap_err();
    assert!(matches!(err, ScanError::InvalidPath(_)));
}

#[test]
fn namespace_mapped_onto_manifest_directory() {
    for mapping in ["", "./"] {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "composer.json",
            &format!(r#"{{"autoload": {{"psr-4": {{"App\\": "{mapping}"}}}}}}"#),
        );
        write(root, "User.rs", "pub struct User;");
        write(root, "vendor/Lib.rs", "pub struct Lib;");

        let registry = registry();
        let reflector = SourceReflector::new().unwrap();
        let config = AnnotatorConfig::default();
        let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
        let scanner = Scanner::new(&annotator, ScanOptions::default()).unwrap();

        let report = scanner.scan(root, &Context::new()).unwrap();
        let classes: Vec<&str> = report.entities.iter().map(|e| e.class.as_str()).collect();
        assert_eq!(classes, vec!["App\\User"], "mapping {mapping:?}");
    }
}
