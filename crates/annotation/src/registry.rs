use crate::container::{Container, TypeCatalog, TypeKind};
use crate::error::{AnnotationError, Result};
use crate::handler::{AnnotationHandler, EntityFactory, HandlerFactory, Instance};
use crate::metadata::Arguments;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

enum TypeEntry {
    Handler(HandlerFactory),
    AbstractHandler,
    Plain,
}

impl TypeEntry {
    const fn kind(&self) -> TypeKind {
        match self {
            Self::Handler(_) => TypeKind::Handler,
            Self::AbstractHandler => TypeKind::AbstractHandler,
            Self::Plain => TypeKind::Plain,
        }
    }
}

/// Explicit table of handler types and entity constructors.
///
/// Serves as both the [`TypeCatalog`] consulted during name resolution and the
/// [`Container`] that builds handlers and entity instances.
#[derive(Default)]
pub struct Registry {
    types: HashMap<String, TypeEntry>,
    entities: HashMap<String, EntityFactory>,
    fallback_entity: Option<EntityFactory>,
    singletons: Mutex<HashMap<String, Instance>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instantiable handler type
    pub fn register_handler<F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&Arguments) -> Result<Box<dyn AnnotationHandler>> + Send + Sync + 'static,
    {
        let factory: HandlerFactory = Arc::new(factory);
        self.types.insert(class.into(), TypeEntry::Handler(factory));
        self
    }

    /// Register a handler type that cannot be instantiated
    pub fn register_abstract_handler(&mut self, class: impl Into<String>) -> &mut Self {
        self.types.insert(class.into(), TypeEntry::AbstractHandler);
        self
    }

    /// Register a known type that is not a handler
    pub fn register_type(&mut self, class: impl Into<String>) -> &mut Self {
        self.types.insert(class.into(), TypeEntry::Plain);
        self
    }

    /// Register a constructor for one entity
    pub fn register_entity<F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&str) -> Result<Instance> + Send + Sync + 'static,
    {
        self.entities.insert(class.into(), Arc::new(factory));
        self
    }

    /// Constructor used for entities without a dedicated registration
    pub fn set_fallback_entity<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn(&str) -> Result<Instance> + Send + Sync + 'static,
    {
        self.fallback_entity = Some(Arc::new(factory));
        self
    }

    /// Number of registered type names
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    fn lock_singletons(&self) -> MutexGuard<'_, HashMap<String, Instance>> {
        self.singletons
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl TypeCatalog for Registry {
    fn kind_of(&self, name: &str) -> Option<TypeKind> {
        self.types.get(name).map(TypeEntry::kind)
    }
}

impl Container for Registry {
    fn get(&self, class: &str) -> Result<Instance> {
        if let Some(instance) = self.lock_singletons().get(class) {
            return Ok(Arc::clone(instance));
        }

        let factory = self
            .entities
            .get(class)
            .or(self.fallback_entity.as_ref())
            .ok_or_else(|| AnnotationError::container(class, "no constructor registered"))?;
        // Lock is released while constructing; factories may resolve other entities.
        let instance = factory(class)?;
        let mut singletons = self.lock_singletons();
        Ok(Arc::clone(
            singletons.entry(class.to_string()).or_insert(instance),
        ))
    }

    fn make(&self, class: &str, arguments: &Arguments) -> Result<Box<dyn AnnotationHandler>> {
        match self.types.get(class) {
            Some(TypeEntry::Handler(factory)) => factory(arguments),
            Some(TypeEntry::AbstractHandler) => {
                Err(AnnotationError::Uninstantiable(class.to_string()))
            }
            Some(TypeEntry::Plain) => Err(AnnotationError::construction(
                class,
                "type is not an annotation handler",
            )),
            None => Err(AnnotationError::construction(class, "unknown type")),
        }
    }
}
