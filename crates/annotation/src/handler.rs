use crate::context::Context;
use crate::error::Result;
use crate::metadata::Arguments;
use crate::target::Target;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

/// Shared instance of a processed entity, created once per entity run
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Behavior attached to one annotation type
pub trait AnnotationHandler: Send + Sync {
    /// Run against the current context.
    ///
    /// A returned value is stored under [`AnnotationHandler::context_key`] when the
    /// handler declares one.
    fn handle(&self, context: &Context, instance: Option<&Instance>) -> Result<Option<Value>>;

    /// Context key receiving the handler result
    fn context_key(&self) -> Option<&str> {
        None
    }

    /// Targets this handler may run against
    fn targets(&self) -> &[Target];

    /// Higher priorities run first
    fn priority(&self) -> i32 {
        0
    }
}

/// Constructs a handler from the raw arguments of its declaration
pub type HandlerFactory = Arc<dyn Fn(&Arguments) -> Result<Box<dyn AnnotationHandler>> + Send + Sync>;

/// Constructs an entity instance
pub type EntityFactory = Arc<dyn Fn(&str) -> Result<Instance> + Send + Sync>;
