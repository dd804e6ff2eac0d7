//! Consumer registry mapping event types to handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use eventline_models::EventType;
use tokio::sync::RwLock;
use tracing::debug;

use crate::handler::EventHandler;

/// Dynamic mapping from event type to handler.
///
/// At most one handler per type; the last registration wins. Cloning
/// yields another handle onto the same mapping, so handlers can be
/// registered or replaced from any call site while the dispatch loop runs.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use eventline_models::EventType;
/// use eventline_runtime::{handler_fn, ConsumerRegistry};
///
/// let registry = ConsumerRegistry::new();
/// registry
///     .register(EventType::Login, Arc::new(handler_fn(|_, payload| async move {
///         println!("login: {}", payload);
///         Ok(())
///     })))
///     .await;
///
/// assert!(registry.contains(EventType::Login).await);
/// ```
#[derive(Clone, Default)]
pub struct ConsumerRegistry {
    handlers: Arc<RwLock<HashMap<EventType, Arc<dyn EventHandler>>>>,
}

impl ConsumerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a type, replacing any existing one.
    ///
    /// # Returns
    ///
    /// The handler that was replaced, if any.
    pub async fn register(
        &self,
        event_type: EventType,
        handler: Arc<dyn EventHandler>,
    ) -> Option<Arc<dyn EventHandler>> {
        debug!(
            event_type = %event_type,
            handler = handler.name(),
            "registering consumer"
        );
        let mut handlers = self.handlers.write().await;
        handlers.insert(event_type, handler)
    }

    /// Removes the handler for a type.
    pub async fn unregister(&self, event_type: EventType) -> Option<Arc<dyn EventHandler>> {
        let mut handlers = self.handlers.write().await;
        let removed = handlers.remove(&event_type);
        if removed.is_some() {
            debug!(event_type = %event_type, "unregistered consumer");
        }
        removed
    }

    /// Gets the handler for a type.
    pub async fn get(&self, event_type: EventType) -> Option<Arc<dyn EventHandler>> {
        let handlers = self.handlers.read().await;
        handlers.get(&event_type).cloned()
    }

    /// Returns true if a handler is registered for the type.
    pub async fn contains(&self, event_type: EventType) -> bool {
        self.handlers.read().await.contains_key(&event_type)
    }

    /// Lists the types that have a handler, in declaration order.
    pub async fn registered_types(&self) -> Vec<EventType> {
        let handlers = self.handlers.read().await;
        let mut types: Vec<EventType> = handlers.keys().copied().collect();
        types.sort();
        types
    }

    /// Returns the number of registered handlers.
    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    /// Returns true if no handlers are registered.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl fmt::Debug for ConsumerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handlers.try_read() {
            Ok(handlers) => f
                .debug_map()
                .entries(handlers.iter().map(|(t, h)| (t, h.name())))
                .finish(),
            Err(_) => f.write_str("ConsumerRegistry { <locked> }"),
        }
    }
}
