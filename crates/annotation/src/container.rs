use crate::error::Result;
use crate::handler::{AnnotationHandler, Instance};
use crate::metadata::Arguments;

/// What a registered type name denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Instantiable annotation handler
    Handler,
    /// Implements the handler capabilities but cannot be instantiated
    AbstractHandler,
    /// Any other known type
    Plain,
}

/// Lookup of known type names
pub trait TypeCatalog {
    /// Kind of the type registered under `name`, if any
    fn kind_of(&self, name: &str) -> Option<TypeKind>;

    fn exists(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }
}

/// Object construction used by annotation processing
pub trait Container {
    /// Shared instance of `class`, memoized by the container
    fn get(&self, class: &str) -> Result<Instance>;

    /// Fresh handler of type `class` built from declaration arguments
    fn make(&self, class: &str, arguments: &Arguments) -> Result<Box<dyn AnnotationHandler>>;
}
