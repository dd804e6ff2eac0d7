//! Pipeline - the single ingress point for events.
//!
//! `submit` runs, in order:
//! 1. pre-filter middleware (may re-tag the event)
//! 2. the drop filter, on the pre-filter result
//! 3. post-filter middleware, only for admitted events
//! 4. queue insertion

use std::sync::Arc;

use eventline_models::Event;
use eventline_queue::EventQueue;

use crate::error::Result;
use crate::filter::DropFilter;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::notification::{Notification, NotificationBus};

/// Outcome of submitting an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The event was queued.
    Accepted,
    /// The filter rejected the event; it was not queued.
    Dropped,
}

impl Submission {
    /// Returns true if the event was queued.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted)
    }
}

/// Ingress pipeline owning the middleware, the filter and a queue handle.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use eventline_events::{DropFilter, NotificationBus, Pipeline, PromoteType};
/// use eventline_models::{Event, EventType, Priority, Source};
/// use eventline_queue::EventQueue;
///
/// let queue = Arc::new(EventQueue::default());
/// let pipeline = Pipeline::new(Arc::clone(&queue), NotificationBus::default())
///     .with_pre_filter(PromoteType::new(EventType::New, Priority::High, Source::Api))
///     .with_filter(DropFilter::new().drop_source(Source::Unknown));
///
/// // Promoted to Api before the filter runs, so it is admitted
/// let event = Event::new(EventType::New, Priority::Low, Source::Unknown, "fresh");
/// assert!(pipeline.submit(event).unwrap().is_accepted());
/// ```
#[derive(Debug)]
pub struct Pipeline {
    pre_filter: MiddlewareChain,
    filter: DropFilter,
    post_filter: MiddlewareChain,
    queue: Arc<EventQueue>,
    notifications: NotificationBus,
}

impl Pipeline {
    /// Creates a pipeline with no middleware and an empty filter.
    pub fn new(queue: Arc<EventQueue>, notifications: NotificationBus) -> Self {
        Self {
            pre_filter: MiddlewareChain::new(),
            filter: DropFilter::new(),
            post_filter: MiddlewareChain::new(),
            queue,
            notifications,
        }
    }

    /// Appends pre-filter middleware.
    pub fn with_pre_filter(mut self, middleware: impl Middleware + 'static) -> Self {
        self.pre_filter.push(middleware);
        self
    }

    /// Appends post-filter middleware.
    pub fn with_post_filter(mut self, middleware: impl Middleware + 'static) -> Self {
        self.post_filter.push(middleware);
        self
    }

    /// Replaces the pre-filter chain.
    pub fn with_pre_filter_chain(mut self, chain: MiddlewareChain) -> Self {
        self.pre_filter = chain;
        self
    }

    /// Replaces the post-filter chain.
    pub fn with_post_filter_chain(mut self, chain: MiddlewareChain) -> Self {
        self.post_filter = chain;
        self
    }

    /// Sets the drop filter.
    pub fn with_filter(mut self, filter: DropFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Submits an event.
    ///
    /// # Returns
    ///
    /// Whether the event was queued or dropped. A dropped event never
    /// reaches post-filter middleware or the queue.
    ///
    /// # Errors
    ///
    /// `PipelineError::Queue` if the queue has been closed.
    pub fn submit(&self, event: Event) -> Result<Submission> {
        self.notifications.emit(Notification::Produced {
            event: event.clone(),
        });

        let event = self.pre_filter.apply(event);

        if self.filter.should_drop(&event) {
            self.notifications.emit(Notification::Dropped { event });
            return Ok(Submission::Dropped);
        }

        let event = self.post_filter.apply(event);
        self.queue.insert(event)?;

        Ok(Submission::Accepted)
    }

    /// Returns the drop filter.
    pub fn filter(&self) -> &DropFilter {
        &self.filter
    }

    /// Returns the pre-filter chain.
    pub fn pre_filter(&self) -> &MiddlewareChain {
        &self.pre_filter
    }

    /// Returns the post-filter chain.
    pub fn post_filter(&self) -> &MiddlewareChain {
        &self.post_filter
    }

    /// Returns the queue events are inserted into.
    pub fn queue(&self) -> Arc<EventQueue> {
        Arc::clone(&self.queue)
    }

    /// Returns the notification bus.
    pub fn notifications(&self) -> &NotificationBus {
        &self.notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::middleware::{PromoteType, StampTimestamp};
    use eventline_models::{EventType, Priority, Source};
    use eventline_queue::QueueError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_pipeline() -> (Pipeline, Arc<EventQueue>) {
        let queue = Arc::new(EventQueue::default());
        let pipeline = Pipeline::new(Arc::clone(&queue), NotificationBus::default());
        (pipeline, queue)
    }

    #[test]
    fn test_submit_accepts_and_queues() {
        let (pipeline, queue) = make_pipeline();

        let result = pipeline
            .submit(Event::new(EventType::Login, Priority::Low, Source::Web, "hi"))
            .unwrap();

        assert_eq!(result, Submission::Accepted);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_dropped_event_not_queued() {
        let (pipeline, queue) = make_pipeline();
        let pipeline = pipeline.with_filter(DropFilter::new().drop_priority(Priority::Zero));

        let result = pipeline
            .submit(Event::new(EventType::Purchase, Priority::Zero, Source::Web, "x"))
            .unwrap();

        assert_eq!(result, Submission::Dropped);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dropped_event_skips_post_filter() {
        let post_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&post_calls);

        let (pipeline, _queue) = make_pipeline();
        let pipeline = pipeline
            .with_filter(DropFilter::new().drop_type(EventType::Unknown))
            .with_post_filter(move |e: Event| {
                counter.fetch_add(1, Ordering::SeqCst);
                e
            });

        pipeline
            .submit(Event::new(EventType::Unknown, Priority::High, Source::Web, "x"))
            .unwrap();
        assert_eq!(post_calls.load(Ordering::SeqCst), 0);

        pipeline
            .submit(Event::new(EventType::Login, Priority::High, Source::Web, "x"))
            .unwrap();
        assert_eq!(post_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pre_filter_visible_to_filter() {
        let (pipeline, queue) = make_pipeline();
        let pipeline = pipeline
            .with_pre_filter(PromoteType::new(EventType::New, Priority::High, Source::Api))
            .with_filter(
                DropFilter::new()
                    .drop_priority(Priority::Zero)
                    .drop_source(Source::Unknown),
            );

        // Would be dropped on both counts without promotion
        let result = pipeline
            .submit(Event::new(EventType::New, Priority::Zero, Source::Unknown, "x"))
            .unwrap();

        assert_eq!(result, Submission::Accepted);
        let queued = queue.peek().unwrap();
        assert_eq!(queued.priority, Priority::High);
        assert_eq!(queued.event_source, Source::Api);
    }

    #[test]
    fn test_pre_filter_can_cause_drop() {
        let (pipeline, queue) = make_pipeline();
        let pipeline = pipeline
            .with_pre_filter(|mut e: Event| {
                e.event_source = Source::Unknown;
                e
            })
            .with_filter(DropFilter::new().drop_source(Source::Unknown));

        let result = pipeline
            .submit(Event::new(EventType::Login, Priority::High, Source::Web, "x"))
            .unwrap();

        assert_eq!(result, Submission::Dropped);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_post_filter_not_seen_by_filter() {
        let (pipeline, queue) = make_pipeline();
        // Post-filter sets a dropped priority; filter already ran, so the event stays
        let pipeline = pipeline
            .with_filter(DropFilter::new().drop_priority(Priority::Zero))
            .with_post_filter(|mut e: Event| {
                e.priority = Priority::Zero;
                e
            });

        let result = pipeline
            .submit(Event::new(EventType::Login, Priority::High, Source::Web, "x"))
            .unwrap();

        assert_eq!(result, Submission::Accepted);
        assert_eq!(queue.peek().unwrap().priority, Priority::Zero);
    }

    #[test]
    fn test_post_filter_stamps_before_insert() {
        let (pipeline, queue) = make_pipeline();
        let pipeline = pipeline.with_post_filter(StampTimestamp::new());

        pipeline
            .submit(Event::new(EventType::Purchase, Priority::High, Source::Web, "x"))
            .unwrap();

        let queued = queue.peek().unwrap();
        assert!(queued.is_stamped());
        assert!(queued
            .event_data
            .starts_with("middleware applied after filtering to event data for Purchase"));
    }

    #[test]
    fn test_submit_after_close_fails() {
        let (pipeline, queue) = make_pipeline();
        queue.close();

        let result = pipeline.submit(Event::new(EventType::Login, Priority::High, Source::Web, "x"));
        assert_eq!(result, Err(PipelineError::Queue(QueueError::Closed)));
    }

    #[tokio::test]
    async fn test_notifications_for_produced_and_dropped() {
        let (pipeline, _queue) = make_pipeline();
        let pipeline = pipeline.with_filter(DropFilter::new().drop_type(EventType::Unknown));
        let mut rx = pipeline.notifications().subscribe();

        pipeline
            .submit(Event::new(EventType::Unknown, Priority::High, Source::Web, "x"))
            .unwrap();

        assert_eq!(rx.recv().await.unwrap().kind(), "produced");
        assert_eq!(rx.recv().await.unwrap().kind(), "dropped");
    }
}
