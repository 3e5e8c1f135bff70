use crate::processor::EntityPhase;
use thiserror::Error;

/// Result type for annotation processing
pub type Result<T> = std::result::Result<T, AnnotationError>;

/// Errors that can occur while resolving and dispatching annotations
#[derive(Error, Debug)]
pub enum AnnotationError {
    /// The container could not provide an entity instance
    #[error("Container error for {class}: {reason}")]
    ContainerError { class: String, reason: String },

    /// A handler type resolved but could not be constructed
    #[error("Failed to construct handler {class}: {reason}")]
    HandlerConstruction { class: String, reason: String },

    /// A handler type is registered but cannot be instantiated
    #[error("Handler type {0} is not instantiable")]
    Uninstantiable(String),

    /// A handler failed while running
    #[error("Handler {class} failed: {reason}")]
    HandlerFailed { class: String, reason: String },

    /// The reflector could not describe an entity
    #[error("Reflection error: {0}")]
    ReflectionError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure while processing one entity, tagged with the phase it happened in
    #[error("{class} ({phase}): {source}")]
    Entity {
        class: String,
        phase: EntityPhase,
        #[source]
        source: Box<AnnotationError>,
    },
}

impl AnnotationError {
    /// Create a container error
    pub fn container(class: impl Into<String>, reason: impl ToString) -> Self {
        Self::ContainerError {
            class: class.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a handler construction error
    pub fn construction(class: impl Into<String>, reason: impl ToString) -> Self {
        Self::HandlerConstruction {
            class: class.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a handler failure
    pub fn handler(class: impl Into<String>, reason: impl ToString) -> Self {
        Self::HandlerFailed {
            class: class.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a reflection error
    pub fn reflection(msg: impl Into<String>) -> Self {
        Self::ReflectionError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Attach the entity and phase an error surfaced in
    pub(crate) fn in_phase(self, class: &str, phase: EntityPhase) -> Self {
        match self {
            already @ Self::Entity { .. } => already,
            other => Self::Entity {
                class: class.to_string(),
                phase,
                source: Box::new(other),
            },
        }
    }
}
