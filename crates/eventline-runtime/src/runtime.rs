//! Main runtime context tying ingress, registry and dispatch together.

use std::sync::Arc;

use eventline_events::{
    Middleware, MiddlewareChain, Notification, NotificationBus, Pipeline, Submission,
};
use eventline_models::{Event, EventType};
use eventline_queue::EventQueue;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::dispatcher::{DispatchStats, Dispatcher};
use crate::error::{Result, RuntimeError};
use crate::handler::EventHandler;
use crate::registry::ConsumerRegistry;

/// Builder for a [`Runtime`] with middleware attached.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    pre_filter: MiddlewareChain,
    post_filter: MiddlewareChain,
}

impl RuntimeBuilder {
    /// Appends pre-filter middleware.
    pub fn pre_filter(mut self, middleware: impl Middleware + 'static) -> Self {
        self.pre_filter.push(middleware);
        self
    }

    /// Appends post-filter middleware.
    pub fn post_filter(mut self, middleware: impl Middleware + 'static) -> Self {
        self.post_filter.push(middleware);
        self
    }

    /// Builds the runtime.
    ///
    /// # Errors
    ///
    /// `RuntimeError::Pipeline` if the configured drop sets name unknown
    /// values.
    pub fn build(self) -> Result<Runtime> {
        let filter = self.config.drop_filter()?;
        let queue = Arc::new(EventQueue::new(self.config.tie_break));
        let notifications = NotificationBus::new(self.config.notification_capacity);
        let registry = ConsumerRegistry::new();

        let pipeline = Pipeline::new(Arc::clone(&queue), notifications.clone())
            .with_filter(filter)
            .with_pre_filter_chain(self.pre_filter)
            .with_post_filter_chain(self.post_filter);

        let dispatcher = Dispatcher::new(
            Arc::clone(&queue),
            registry.clone(),
            notifications.clone(),
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Runtime {
            config: self.config,
            queue,
            pipeline: Arc::new(pipeline),
            registry,
            notifications,
            dispatcher: Arc::new(dispatcher),
            dispatcher_handle: None,
            shutdown_tx,
            shutdown_rx,
            started: false,
        })
    }
}

/// Explicit context owning the queue, the ingress pipeline, the consumer
/// registry and the dispatch task.
///
/// # Example
///
/// ```ignore
/// use eventline_models::{Event, EventType, Priority, Source};
/// use eventline_runtime::{handler_fn, Runtime, RuntimeConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = RuntimeConfig::new().with_drop_priority("zero");
///     let mut runtime = Runtime::new(config)?;
///
///     runtime
///         .register(EventType::Login, handler_fn(|_, payload| async move {
///             println!("login: {}", payload);
///             Ok(())
///         }))
///         .await;
///
///     runtime.start()?;
///     runtime.submit(Event::new(EventType::Login, Priority::High, Source::Web, "alice"))?;
///     runtime.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct Runtime {
    config: RuntimeConfig,
    queue: Arc<EventQueue>,
    pipeline: Arc<Pipeline>,
    registry: ConsumerRegistry,
    notifications: NotificationBus,
    dispatcher: Arc<Dispatcher>,
    /// Handle to the dispatch task.
    dispatcher_handle: Option<JoinHandle<()>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver (for cloning to the dispatch task).
    shutdown_rx: watch::Receiver<bool>,
    started: bool,
}

impl Runtime {
    /// Creates a runtime with no middleware.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Starts building a runtime with middleware.
    pub fn builder(config: RuntimeConfig) -> RuntimeBuilder {
        RuntimeBuilder {
            config,
            pre_filter: MiddlewareChain::new(),
            post_filter: MiddlewareChain::new(),
        }
    }

    /// Registers a handler for a type, replacing any existing one.
    pub async fn register(
        &self,
        event_type: EventType,
        handler: impl EventHandler + 'static,
    ) -> Option<Arc<dyn EventHandler>> {
        self.registry.register(event_type, Arc::new(handler)).await
    }

    /// Removes the handler for a type.
    pub async fn unregister(&self, event_type: EventType) -> Option<Arc<dyn EventHandler>> {
        self.registry.unregister(event_type).await
    }

    /// Submits an event through middleware and filter into the queue.
    pub fn submit(&self, event: Event) -> Result<Submission> {
        Ok(self.pipeline.submit(event)?)
    }

    /// Subscribes to pipeline notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Starts the dispatch loop.
    ///
    /// A runtime cannot be restarted once shut down: its queue stays closed.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(RuntimeError::AlreadyStarted);
        }
        if self.queue.is_closed() {
            return Err(RuntimeError::Shutdown(
                "runtime was shut down and cannot be restarted".to_string(),
            ));
        }

        info!(tie_break = %self.config.tie_break, "starting runtime");

        let dispatcher = Arc::clone(&self.dispatcher);
        let shutdown_rx = self.shutdown_rx.clone();

        let handle = tokio::spawn(async move {
            dispatcher.run(shutdown_rx).await;
        });

        self.dispatcher_handle = Some(handle);
        self.started = true;

        debug!("runtime started");

        Ok(())
    }

    /// Stops the runtime gracefully.
    ///
    /// Closes the queue so no further events are accepted. With
    /// `drain_on_shutdown`, events already queued are dispatched before
    /// the loop exits; otherwise the loop stops after the in-flight
    /// handler completes.
    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.started {
            return Err(RuntimeError::NotStarted);
        }

        info!(pending = self.queue.len(), "shutting down runtime");

        self.queue.close();

        if !self.config.drain_on_shutdown {
            self.shutdown_tx.send(true).map_err(|e| {
                RuntimeError::Shutdown(format!("failed to send shutdown signal: {}", e))
            })?;
        }

        if let Some(handle) = self.dispatcher_handle.take() {
            debug!("waiting for dispatch loop to stop");
            handle.await.map_err(|e| {
                RuntimeError::Shutdown(format!("dispatch task panicked: {}", e))
            })?;
        }

        self.started = false;

        let stats = self.dispatcher.stats();
        info!(
            handled = stats.handled,
            unroutable = stats.unroutable,
            failed = stats.failed,
            "runtime stopped"
        );

        Ok(())
    }

    /// Returns the ingress pipeline, for producers running in other tasks.
    pub fn pipeline(&self) -> Arc<Pipeline> {
        Arc::clone(&self.pipeline)
    }

    /// Returns the event queue.
    pub fn queue(&self) -> Arc<EventQueue> {
        Arc::clone(&self.queue)
    }

    /// Returns the consumer registry.
    pub fn registry(&self) -> ConsumerRegistry {
        self.registry.clone()
    }

    /// Returns the dispatcher, e.g. to step it manually.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Returns dispatch outcome counters.
    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Check if the runtime has been started.
    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        // Stop the dispatch task if still running
        if self.started {
            self.queue.close();
            let _ = self.shutdown_tx.send(true);
        }
    }
}
