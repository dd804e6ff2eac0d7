//! Handler capability invoked for dispatched events.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use eventline_models::EventType;
use thiserror::Error;

/// Failure reported by a handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    /// Creates a handler error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Result of a single handler invocation.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Consumer for one event type.
///
/// Handlers may suspend (simulated I/O, network calls). The dispatch loop
/// awaits each invocation before taking the next event, so a handler never
/// runs concurrently with another dispatch.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use eventline_models::EventType;
/// use eventline_runtime::{EventHandler, HandlerResult};
///
/// struct AuditLog;
///
/// #[async_trait]
/// impl EventHandler for AuditLog {
///     async fn handle(&self, event_type: EventType, payload: &str) -> HandlerResult {
///         println!("{}: {}", event_type, payload);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles one event, given its final type and payload.
    async fn handle(&self, event_type: EventType, payload: &str) -> HandlerResult;

    /// Returns a short name used in logs.
    fn name(&self) -> &str {
        "handler"
    }
}

/// Adapts an async closure into an [`EventHandler`].
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> FnHandler<F> {
    /// Sets the name reported in logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("name", &self.name).finish()
    }
}

/// Creates a handler from a closure returning a future.
///
/// The closure receives an owned copy of the payload.
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(EventType, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    FnHandler {
        name: "fn_handler".to_string(),
        f,
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(EventType, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(&self, event_type: EventType, payload: &str) -> HandlerResult {
        (self.f)(event_type, payload.to_string()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
