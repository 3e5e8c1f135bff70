use crate::handler::AnnotationHandler;
use std::fmt;

/// Handler instance together with the type it was resolved from
pub struct QueuedHandler {
    class: String,
    handler: Box<dyn AnnotationHandler>,
}

impl QueuedHandler {
    pub fn new(class: impl Into<String>, handler: Box<dyn AnnotationHandler>) -> Self {
        Self {
            class: class.into(),
            handler,
        }
    }

    /// Resolved handler type name
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[must_use]
    pub fn handler(&self) -> &dyn AnnotationHandler {
        self.handler.as_ref()
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.handler.priority()
    }
}

impl fmt::Debug for QueuedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedHandler")
            .field("class", &self.class)
            .field("priority", &self.priority())
            .field("targets", &self.handler.targets())
            .finish()
    }
}

/// Handlers waiting to run for one entity, highest priority first.
///
/// Holds at most one handler per type. Insertion is stable: a handler goes in
/// front of the first entry with a strictly lower priority, so equal priorities
/// keep their arrival order.
#[derive(Debug, Default)]
pub struct AnnotationQueue {
    entries: Vec<QueuedHandler>,
}

impl AnnotationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry`, replacing a queued handler of the same type in place
    pub fn insert_or_replace(&mut self, entry: QueuedHandler) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.class == entry.class) {
            log::debug!("Replacing queued handler {}", entry.class);
            *existing = entry;
            return;
        }

        let priority = entry.priority();
        let pos = self
            .entries
            .iter()
            .position(|e| e.priority() < priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedHandler> {
        self.entries.iter()
    }

    /// Resolved type names in queue order
    #[must_use]
    pub fn classes(&self) -> Vec<&str> {
        self.entries.iter().map(QueuedHandler::class).collect()
    }

    /// Priorities in queue order
    #[must_use]
    pub fn priorities(&self) -> Vec<i32> {
        self.entries.iter().map(QueuedHandler::priority).collect()
    }
}

impl IntoIterator for AnnotationQueue {
    type Item = QueuedHandler;
    type IntoIter = std::vec::IntoIter<QueuedHandler>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<QueuedHandler> for AnnotationQueue {
    /// Collects entries as given, without reordering
    fn from_iter<I: IntoIterator<Item = QueuedHandler>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
