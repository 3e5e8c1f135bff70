use crate::config::AnnotatorConfig;
use crate::container::{Container, TypeCatalog};
use crate::context::Context;
use crate::dispatch::{run_eligible, PassOutcome};
use crate::error::{AnnotationError, Result};
use crate::handler::Instance;
use crate::metadata::MetadataEntry;
use crate::queue::{AnnotationQueue, QueuedHandler};
use crate::reflect::{Reflector, TargetRef};
use crate::resolver::{Normalizer, Resolution};
use serde::Serialize;
use std::fmt;

/// Where processing of one entity currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityPhase {
    Discovered,
    EntityPass,
    /// Index of the operation in declaration order
    OperationPass(usize),
    Done,
}

impl fmt::Display for EntityPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovered => f.write_str("discovered"),
            Self::EntityPass => f.write_str("entity pass"),
            Self::OperationPass(idx) => write!(f, "operation pass {idx}"),
            Self::Done => f.write_str("done"),
        }
    }
}

/// Outcome of one operation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationReport {
    pub name: String,
    pub context: Context,
    pub invoked: Vec<String>,
}

/// Everything produced while processing one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityReport {
    pub class: String,

    /// Context after the entity pass
    pub context: Context,

    /// Handlers run during the entity pass
    pub invoked: Vec<String>,

    /// Operation passes in declaration order
    pub operations: Vec<OperationReport>,

    /// Handlers still queued when processing finished
    pub unhandled: Vec<String>,
}

impl EntityReport {
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&OperationReport> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Context of the last pass that ran
    #[must_use]
    pub fn final_context(&self) -> &Context {
        self.operations
            .last()
            .map_or(&self.context, |op| &op.context)
    }
}

/// Resolves and dispatches the annotations of entities
pub struct Annotator<'a> {
    reflector: &'a dyn Reflector,
    catalog: &'a dyn TypeCatalog,
    container: &'a dyn Container,
    normalizer: Normalizer,
}

impl<'a> Annotator<'a> {
    /// Create an annotator with the default resolver chain for `config`
    pub fn new(
        config: &AnnotatorConfig,
        reflector: &'a dyn Reflector,
        catalog: &'a dyn TypeCatalog,
        container: &'a dyn Container,
    ) -> Result<Self> {
        config.validate().map_err(AnnotationError::invalid_config)?;
        Ok(Self {
            reflector,
            catalog,
            container,
            normalizer: Normalizer::new(config),
        })
    }

    /// Replace the name resolution strategy
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    #[must_use]
    pub fn reflector(&self) -> &'a dyn Reflector {
        self.reflector
    }

    /// Process `class`: its own annotations first, then each public operation.
    ///
    /// Handlers not eligible for a pass stay queued for the next one. The queue,
    /// the entity instance and all contexts are dropped once the entity is done.
    pub fn parse(&self, class: &str, context: &Context) -> Result<EntityReport> {
        log::debug!("{class}: {}", EntityPhase::Discovered);
        let mut instance: Option<Instance> = None;

        let phase = EntityPhase::EntityPass;
        let entity = self
            .entity_pass(class, context, &mut instance)
            .map_err(|e| e.in_phase(class, phase))?;

        let methods = self
            .reflector
            .public_operations(class)
            .map_err(|e| e.in_phase(class, phase))?;

        let mut queue = entity.remaining;
        let mut operations = Vec::with_capacity(methods.len());
        for (idx, method) in methods.into_iter().enumerate() {
            let phase = EntityPhase::OperationPass(idx);
            log::debug!("{class}: {phase} ({method})");
            let outcome = self
                .operation_pass(class, &method, &entity.context, queue, &mut instance)
                .map_err(|e| e.in_phase(class, phase))?;
            queue = outcome.remaining;
            operations.push(OperationReport {
                name: method,
                context: outcome.context,
                invoked: outcome.invoked,
            });
        }

        let unhandled: Vec<String> = queue.classes().into_iter().map(String::from).collect();
        if !unhandled.is_empty() {
            log::debug!("{class}: handlers never matched a target: {unhandled:?}");
        }
        log::debug!("{class}: {}", EntityPhase::Done);

        Ok(EntityReport {
            class: class.to_string(),
            context: entity.context,
            invoked: entity.invoked,
            operations,
            unhandled,
        })
    }

    fn entity_pass(
        &self,
        class: &str,
        context: &Context,
        instance: &mut Option<Instance>,
    ) -> Result<PassOutcome> {
        let entries = self.reflector.declared_metadata(TargetRef::Entity(class))?;
        self.attrs(
            class,
            &entries,
            context.for_entity(class),
            AnnotationQueue::new(),
            instance,
        )
    }

    fn operation_pass(
        &self,
        class: &str,
        method: &str,
        entity_context: &Context,
        queue: AnnotationQueue,
        instance: &mut Option<Instance>,
    ) -> Result<PassOutcome> {
        let entries = self
            .reflector
            .declared_metadata(TargetRef::Operation { class, method })?;
        self.attrs(
            class,
            &entries,
            entity_context.for_operation(method),
            queue,
            instance,
        )
    }

    /// Normalize `entries` into `context` and `queue`, then run the eligible handlers
    fn attrs(
        &self,
        class: &str,
        entries: &[MetadataEntry],
        mut context: Context,
        mut queue: AnnotationQueue,
        instance: &mut Option<Instance>,
    ) -> Result<PassOutcome> {
        for entry in entries {
            match self.normalizer.resolve(entry, self.catalog)? {
                Resolution::Skip => {}
                Resolution::Fact { key, value } => {
                    log::debug!("{class}: fact {key} from {}", entry.name);
                    context.insert(key, value);
                }
                Resolution::Handler {
                    class: handler_class,
                } => {
                    if instance.is_none() {
                        *instance = Some(self.container.get(class)?);
                    }
                    let handler = self.container.make(&handler_class, &entry.arguments)?;
                    queue.insert_or_replace(QueuedHandler::new(handler_class, handler));
                }
            }
        }

        run_eligible(queue, context, instance.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::AnnotationHandler;
    use crate::metadata::Arguments;
    use crate::reflect::{EntityDecl, InMemoryReflector};
    use crate::registry::Registry;
    use crate::resolver::ExactName;
    use crate::target::Target;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Tag;

    impl AnnotationHandler for Tag {
        fn handle(&self, _context: &Context, instance: Option<&Instance>) -> Result<Option<Value>> {
            Ok(Some(json!(instance.is_some())))
        }

        fn context_key(&self) -> Option<&str> {
            Some("tagged")
        }

        fn targets(&self) -> &[Target] {
            &[Target::Entity, Target::Operation]
        }
    }

    #[test]
    fn test_instance_created_once_per_entity() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);

        let mut registry = Registry::new();
        registry.register_handler("Attrwire\\Annotations\\Tag", |_| Ok(Box::new(Tag)));
        registry.set_fallback_entity(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(()) as Instance)
        });

        let mut reflector = InMemoryReflector::new();
        reflector.insert(
            "App\\Job",
            EntityDecl::new()
                .attribute(MetadataEntry::new("Tag"))
                .operation("run", vec![MetadataEntry::new("Tag")])
                .operation("stop", vec![MetadataEntry::new("Tag")]),
        );

        let config = AnnotatorConfig::default();
        let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
        let report = annotator.parse("App\\Job", &Context::new()).unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(report.context.get("tagged"), Some(&json!(true)));
        assert_eq!(report.operations.len(), 2);
    }

    #[test]
    fn test_facts_do_not_create_instance() {
        let mut registry = Registry::new();
        registry.set_fallback_entity(|class| {
            Err(AnnotationError::container(class, "must not be built"))
        });

        let mut reflector = InMemoryReflector::new();
        reflector.insert(
            "App\\Plain",
            EntityDecl::new().attribute(
                MetadataEntry::new("App\\Meta\\Table").with_arguments(Arguments::positional(["users"])),
            ),
        );

        let config = AnnotatorConfig::default();
        let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
        let report = annotator.parse("App\\Plain", &Context::new()).unwrap();
        assert_eq!(report.context.get("table"), Some(&json!(["users"])));
    }

    #[test]
    fn test_errors_carry_phase() {
        // Tag resolves, but no entity constructor is registered
        let mut registry = Registry::new();
        registry.register_handler("Attrwire\\Annotations\\Tag", |_| Ok(Box::new(Tag)));

        let mut reflector = InMemoryReflector::new();
        reflector.insert(
            "App\\Job",
            EntityDecl::new().operation("run", vec![MetadataEntry::new("Tag")]),
        );

        let config = AnnotatorConfig::default();
        let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
        let err = annotator.parse("App\\Job", &Context::new()).unwrap_err();
        assert!(matches!(
            err,
            AnnotationError::Entity {
                phase: EntityPhase::OperationPass(0),
                ..
            }
        ));
        assert!(err.to_string().contains("App\\Job"));
    }

    #[test]
    fn test_custom_normalizer_without_builtin_fallback() {
        let mut registry = Registry::new();
        registry.register_handler("Attrwire\\Annotations\\Route", |_| Ok(Box::new(Tag)));
        registry.set_fallback_entity(|_| Ok(Arc::new(()) as Instance));

        let mut reflector = InMemoryReflector::new();
        reflector.insert(
            "App\\Controller\\User",
            EntityDecl::new().operation(
                "index",
                vec![MetadataEntry::new("App\\Controller\\Route")
                    .with_arguments(Arguments::positional(["GET", "/"]))],
            ),
        );

        let config = AnnotatorConfig::default();
        let default_report = Annotator::new(&config, &reflector, &registry, &registry)
            .unwrap()
            .parse("App\\Controller\\User", &Context::new())
            .unwrap();
        let index = default_report.operation("index").unwrap();
        assert_eq!(index.invoked, vec!["Attrwire\\Annotations\\Route".to_string()]);

        let exact_only = Normalizer::with_resolvers(
            config.marker.clone(),
            vec![Box::new(ExactName::new(config.marker.clone()))],
        );
        let report = Annotator::new(&config, &reflector, &registry, &registry)
            .unwrap()
            .with_normalizer(exact_only)
            .parse("App\\Controller\\User", &Context::new())
            .unwrap();

        let index = report.operation("index").unwrap();
        assert!(index.invoked.is_empty());
        assert_eq!(index.context.get("route"), Some(&json!(["GET", "/"])));
        assert!(!index.context.contains("tagged"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let registry = Registry::new();
        let reflector = InMemoryReflector::new();
        let config = AnnotatorConfig {
            marker: String::new(),
            ..Default::default()
        };
        assert!(Annotator::new(&config, &reflector, &registry, &registry).is_err());
    }
}
