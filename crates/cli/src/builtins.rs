//! Demonstration handlers registered under the built-in namespace

use attrwire_annotation::{
    AnnotationError, AnnotationHandler, Arguments, Context, Instance, Registry, Result, Target,
    NAMESPACE_SEPARATOR,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Register `Prefix`, `Middleware` and `Route` under `namespace`
pub fn register(registry: &mut Registry, namespace: &str) {
    let name = |simple: &str| {
        let namespace = namespace.trim_end_matches(NAMESPACE_SEPARATOR);
        if namespace.is_empty() {
            simple.to_string()
        } else {
            format!("{namespace}{NAMESPACE_SEPARATOR}{simple}")
        }
    };

    registry.register_handler(name("Prefix"), |args: &Arguments| {
        Ok(Box::new(Prefix::from_arguments(args)?) as Box<dyn AnnotationHandler>)
    });
    registry.register_handler(name("Middleware"), |args: &Arguments| {
        Ok(Box::new(Middleware::from_arguments(args)) as Box<dyn AnnotationHandler>)
    });
    registry.register_handler(name("Route"), |args: &Arguments| {
        Ok(Box::new(Route::from_arguments(args)?) as Box<dyn AnnotationHandler>)
    });
    registry.set_fallback_entity(|class| Ok(Arc::new(class.to_string()) as Instance));
}

fn string_arg(args: &Arguments, key: &str, index: usize) -> Option<String> {
    args.get_or(key, index)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `#[Prefix("/users")]`: path prefix shared by every route of the entity
struct Prefix {
    path: String,
}

impl Prefix {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let path = string_arg(args, "path", 0)
            .ok_or_else(|| AnnotationError::construction("Prefix", "missing path"))?;
        Ok(Self { path })
    }
}

impl AnnotationHandler for Prefix {
    fn handle(&self, _context: &Context, _instance: Option<&Instance>) -> Result<Option<Value>> {
        Ok(Some(Value::String(self.path.trim_end_matches('/').to_string())))
    }

    fn context_key(&self) -> Option<&str> {
        Some("prefix")
    }

    fn targets(&self) -> &[Target] {
        &[Target::Entity]
    }

    fn priority(&self) -> i32 {
        10
    }
}

/// `#[Middleware("auth", "throttle")]`: appends to the middleware stack in scope
struct Middleware {
    names: Vec<Value>,
}

impl Middleware {
    fn from_arguments(args: &Arguments) -> Self {
        Self {
            names: args.positional.clone(),
        }
    }
}

impl AnnotationHandler for Middleware {
    fn handle(&self, context: &Context, _instance: Option<&Instance>) -> Result<Option<Value>> {
        let mut stack = match context.get("middleware") {
            Some(Value::Array(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        stack.extend(self.names.iter().cloned());
        Ok(Some(Value::Array(stack)))
    }

    fn context_key(&self) -> Option<&str> {
        Some("middleware")
    }

    fn targets(&self) -> &[Target] {
        &[Target::Entity, Target::Operation]
    }

    fn priority(&self) -> i32 {
        5
    }
}

/// `#[Route("GET", "/{id}", name = "show")]`: binds an operation to a path
struct Route {
    verb: String,
    path: String,
    name: Option<String>,
}

impl Route {
    fn from_arguments(args: &Arguments) -> Result<Self> {
        let verb = string_arg(args, "method", 0)
            .ok_or_else(|| AnnotationError::construction("Route", "missing method"))?;
        let path = string_arg(args, "path", 1).unwrap_or_else(|| "/".to_string());
        Ok(Self {
            verb: verb.to_uppercase(),
            path,
            name: string_arg(args, "name", 2),
        })
    }
}

impl AnnotationHandler for Route {
    fn handle(&self, context: &Context, _instance: Option<&Instance>) -> Result<Option<Value>> {
        let prefix = context
            .get("prefix")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let path = format!("{prefix}/{}", self.path.trim_start_matches('/'));
        Ok(Some(json!({
            "method": self.verb,
            "path": path,
            "name": self.name,
            "action": context.method,
        })))
    }

    fn context_key(&self) -> Option<&str> {
        Some("route")
    }

    fn targets(&self) -> &[Target] {
        &[Target::Operation]
    }
}
