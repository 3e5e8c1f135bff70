use crate::context::Context;
use crate::error::Result;
use crate::handler::Instance;
use crate::queue::{AnnotationQueue, QueuedHandler};

/// Result of running one pass over the queue
#[derive(Debug)]
pub struct PassOutcome {
    /// Context after all eligible handlers ran
    pub context: Context,

    /// Handlers whose targets did not match, in their original order
    pub remaining: AnnotationQueue,

    /// Types of the handlers that ran, in invocation order
    pub invoked: Vec<String>,
}

/// Run every queued handler eligible for `context.target`.
///
/// Handlers run in queue order. A handler result is stored under its context key
/// when it returns a value and declares a key; later handlers of the same pass see
/// the updated context. The first failing handler aborts the pass.
pub fn run_eligible(
    queue: AnnotationQueue,
    mut context: Context,
    instance: Option<&Instance>,
) -> Result<PassOutcome> {
    let mut remaining: Vec<QueuedHandler> = Vec::new();
    let mut invoked = Vec::new();

    for entry in queue {
        let handler = entry.handler();
        if !context.target.is_in(handler.targets()) {
            remaining.push(entry);
            continue;
        }

        log::debug!(
            "Running {} (priority {}) against {}",
            entry.class(),
            entry.priority(),
            context.target
        );
        let result = handler.handle(&context, instance)?;
        if let (Some(value), Some(key)) = (result, handler.context_key()) {
            context.insert(key, value);
        }
        invoked.push(entry.class().to_string());
    }

    Ok(PassOutcome {
        context,
        remaining: remaining.into_iter().collect(),
        invoked,
    })
}
