//! # Attrwire Annotation
//!
//! Resolution and dispatch of declarative annotations on entities and their
//! public operations.
//!
//! ## Pipeline
//!
//! ```text
//! Entity name
//!     │
//!     ├──> Reflector
//!     │      └─> Declared metadata (entity, then each operation)
//!     │
//!     ├──> Normalizer (exact name → built-in namespace fallback)
//!     │      ├─> Fact: merged into the context
//!     │      └─> Handler: built by the container
//!     │
//!     ├──> Annotation queue (priority descending, one per handler type)
//!     │
//!     └──> Dispatch
//!            ├─> Run handlers matching the current target
//!            ├─> Store results under their context keys
//!            └─> Carry the rest into the next operation pass
//! ```
//!
//! ## Example
//!
//! ```rust
//! use attrwire_annotation::{
//!     AnnotationHandler, Annotator, AnnotatorConfig, Arguments, Context, EntityDecl,
//!     InMemoryReflector, Instance, MetadataEntry, Registry, Result, Target,
//! };
//! use serde_json::Value;
//! use std::sync::Arc;
//!
//! struct Prefix(Value);
//!
//! impl AnnotationHandler for Prefix {
//!     fn handle(&self, _: &Context, _: Option<&Instance>) -> Result<Option<Value>> {
//!         Ok(Some(self.0.clone()))
//!     }
//!     fn context_key(&self) -> Option<&str> {
//!         Some("prefix")
//!     }
//!     fn targets(&self) -> &[Target] {
//!         &[Target::Entity]
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register_handler("Attrwire\\Annotations\\Prefix", |args: &Arguments| {
//!     Ok(Box::new(Prefix(args.get(0).cloned().unwrap_or_default())) as Box<dyn AnnotationHandler>)
//! });
//! registry.set_fallback_entity(|_| Ok(Arc::new(()) as Instance));
//!
//! let mut reflector = InMemoryReflector::new();
//! reflector.insert(
//!     "App\\Controller\\User",
//!     EntityDecl::new().attribute(
//!         MetadataEntry::new("Prefix").with_arguments(Arguments::positional(["/users"])),
//!     ),
//! );
//!
//! let config = AnnotatorConfig::default();
//! let annotator = Annotator::new(&config, &reflector, &registry, &registry).unwrap();
//! let report = annotator.parse("App\\Controller\\User", &Context::new()).unwrap();
//! assert_eq!(report.context.get("prefix"), Some(&Value::from("/users")));
//! ```

mod config;
mod container;
mod context;
mod dispatch;
mod error;
mod handler;
mod metadata;
mod processor;
mod queue;
mod reflect;
mod registry;
mod resolver;
mod target;

pub use config::AnnotatorConfig;
pub use container::{Container, TypeCatalog, TypeKind};
pub use context::Context;
pub use dispatch::{run_eligible, PassOutcome};
pub use error::{AnnotationError, Result};
pub use handler::{AnnotationHandler, EntityFactory, HandlerFactory, Instance};
pub use metadata::{lower_first, simple_name, Arguments, MetadataEntry, NAMESPACE_SEPARATOR};
pub use processor::{Annotator, EntityPhase, EntityReport, OperationReport};
pub use queue::{AnnotationQueue, QueuedHandler};
pub use reflect::{EntityDecl, InMemoryReflector, OperationDecl, Reflector, TargetRef};
pub use registry::Registry;
pub use resolver::{BuiltinNamespace, ExactName, NameResolver, Normalizer, Resolution};
pub use target::Target;
