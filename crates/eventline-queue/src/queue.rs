//! EventQueue - async priority queue feeding the dispatch loop.
//!
//! Key patterns:
//! - `Mutex<T>` for exclusive access to heap state, never held across `.await`
//! - `BinaryHeap` with custom `Ord` for priority ordering
//! - `Notify` to wake a suspended consumer when an event arrives or the
//!   queue closes

use std::collections::BinaryHeap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use eventline_models::Event;
use tokio::sync::Notify;
use tracing::{debug, trace};

use crate::error::{QueueError, Result};
use crate::ordering::{QueuedEvent, TieBreak};

/// Internal state of the event queue.
struct QueueState {
    /// Priority queue of pending events.
    heap: BinaryHeap<QueuedEvent>,
    /// Sequence number for the next insert.
    next_seq: u64,
    /// Set once by `close`; never cleared.
    closed: bool,
}

impl QueueState {
    fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            closed: false,
        }
    }
}

/// Unbounded priority event queue.
///
/// # Priority Ordering
///
/// Uses `BinaryHeap` with custom `Ord` implementation:
/// - Lower priority rank dequeues first
/// - Within same priority, the `TieBreak` policy decides
///
/// # Suspension
///
/// [`EventQueue::remove_next`] suspends the calling task (not the thread)
/// while the queue is empty and resumes on the next insert.
///
/// # Closing
///
/// After [`EventQueue::close`], inserts fail with [`QueueError::Closed`].
/// Events already queued are still handed out; `remove_next` fails only
/// once the queue is both closed and empty.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use eventline_models::{Event, EventType};
/// use eventline_queue::{EventQueue, TieBreak};
///
/// # async fn demo() {
/// let queue = Arc::new(EventQueue::new(TieBreak::Fifo));
///
/// let consumer = {
///     let queue = Arc::clone(&queue);
///     tokio::spawn(async move {
///         while let Ok(event) = queue.remove_next().await {
///             println!("Processing: {}", event.summary());
///         }
///     })
/// };
///
/// queue.insert(Event::builder(EventType::Login).build()).unwrap();
/// queue.close();
/// consumer.await.unwrap();
/// # }
/// ```
pub struct EventQueue {
    /// Tie-break policy for equal priorities.
    tie_break: TieBreak,
    /// Internal queue state, protected by mutex.
    state: Mutex<QueueState>,
    /// Signalled on insert and on close.
    available: Notify,
}

impl EventQueue {
    /// Creates an empty queue with the given tie-break policy.
    pub fn new(tie_break: TieBreak) -> Self {
        Self {
            tie_break,
            state: Mutex::new(QueueState::new()),
            available: Notify::new(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, QueueState>> {
        self.state
            .lock()
            .map_err(|e| QueueError::LockPoisoned(e.to_string()))
    }

    /// Returns the tie-break policy.
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Adds an event to the queue.
    ///
    /// The event must be fully formed; it is not modified while queued.
    pub fn insert(&self, event: Event) -> Result<()> {
        {
            let mut state = self.lock()?;
            if state.closed {
                return Err(QueueError::Closed);
            }

            let seq = state.next_seq;
            state.next_seq += 1;

            trace!(
                seq,
                event_type = %event.event_type,
                priority = %event.priority,
                "event queued"
            );
            state.heap.push(QueuedEvent::new(seq, self.tie_break, event));
        }

        self.available.notify_one();
        Ok(())
    }

    /// Removes and returns the most urgent event, waiting if necessary.
    ///
    /// # Returns
    ///
    /// `Err(QueueError::Closed)` once the queue is closed and drained.
    pub async fn remove_next(&self) -> Result<Event> {
        loop {
            // Register interest before checking state so a concurrent
            // insert or close between the check and the await is not lost.
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock()?;
                if let Some(queued) = state.heap.pop() {
                    return Ok(queued.event);
                }
                if state.closed {
                    return Err(QueueError::Closed);
                }
            }

            notified.await;
        }
    }

    /// Removes and returns the most urgent event without waiting.
    pub fn try_remove_next(&self) -> Option<Event> {
        let mut state = self.lock().ok()?;
        state.heap.pop().map(|queued| queued.event)
    }

    /// Returns a clone of the most urgent event without removing it.
    pub fn peek(&self) -> Option<Event> {
        let state = self.lock().ok()?;
        state.heap.peek().map(|queued| queued.event.clone())
    }

    /// Returns clones of all queued events in dequeue order.
    pub fn snapshot(&self) -> Vec<Event> {
        let state = match self.lock() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };

        state
            .heap
            .clone()
            .into_sorted_vec()
            .into_iter()
            .rev()
            .map(|queued| queued.event)
            .collect()
    }

    /// Closes the queue to further inserts and wakes any waiting consumer.
    ///
    /// Idempotent.
    pub fn close(&self) {
        if let Ok(mut state) = self.state.lock() {
            if !state.closed {
                debug!(pending = state.heap.len(), "closing event queue");
                state.closed = true;
            }
        }
        self.available.notify_waiters();
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().map(|s| s.closed).unwrap_or(true)
    }

    /// Returns the number of queued events.
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.heap.len()).unwrap_or(0)
    }

    /// Returns true if no events are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("tie_break", &self.tie_break)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(TieBreak::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventline_models::{EventType, Priority, Source};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn make_event(event_type: EventType, priority: Priority, data: &str) -> Event {
        Event::new(event_type, priority, Source::Web, data)
    }

    #[tokio::test]
    async fn test_insert_and_remove() {
        let queue = EventQueue::default();

        queue
            .insert(make_event(EventType::Login, Priority::Medium, "Task"))
            .unwrap();

        let removed = queue.remove_next().await.unwrap();
        assert_eq!(removed.event_data, "Task");
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_priority_ordering() {
        let queue = EventQueue::default();

        // Insert in reverse priority order
        for (priority, data) in [
            (Priority::Zero, "Zero"),
            (Priority::Low, "Low"),
            (Priority::High, "High"),
            (Priority::Medium, "Medium"),
        ] {
            queue.insert(make_event(EventType::Login, priority, data)).unwrap();
        }

        assert_eq!(queue.remove_next().await.unwrap().event_data, "High");
        assert_eq!(queue.remove_next().await.unwrap().event_data, "Medium");
        assert_eq!(queue.remove_next().await.unwrap().event_data, "Low");
        assert_eq!(queue.remove_next().await.unwrap().event_data, "Zero");
    }

    #[tokio::test]
    async fn test_fifo_within_priority() {
        let queue = EventQueue::new(TieBreak::Fifo);

        queue.insert(make_event(EventType::Purchase, Priority::Low, "First")).unwrap();
        queue.insert(make_event(EventType::Login, Priority::Low, "Second")).unwrap();
        queue.insert(make_event(EventType::Logout, Priority::Low, "Third")).unwrap();

        assert_eq!(queue.remove_next().await.unwrap().event_data, "First");
        assert_eq!(queue.remove_next().await.unwrap().event_data, "Second");
        assert_eq!(queue.remove_next().await.unwrap().event_data, "Third");
    }

    #[tokio::test]
    async fn test_fields_within_priority() {
        let queue = EventQueue::new(TieBreak::Fields);

        queue.insert(make_event(EventType::Purchase, Priority::Low, "p")).unwrap();
        queue.insert(make_event(EventType::Login, Priority::Low, "b")).unwrap();
        queue.insert(make_event(EventType::Login, Priority::Low, "a")).unwrap();
        queue.insert(make_event(EventType::Unknown, Priority::High, "u")).unwrap();

        let order: Vec<String> = queue.snapshot().into_iter().map(|e| e.event_data).collect();
        assert_eq!(order, vec!["u", "a", "b", "p"]);

        assert_eq!(queue.remove_next().await.unwrap().event_data, "u");
        assert_eq!(queue.remove_next().await.unwrap().event_data, "a");
    }

    #[tokio::test]
    async fn test_remove_waits_for_insert() {
        let queue = Arc::new(EventQueue::default());

        let consumer = {
            let q = Arc::clone(&queue);
            tokio::spawn(async move { q.remove_next().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        queue
            .insert(make_event(EventType::New, Priority::High, "late"))
            .unwrap();

        let event = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer should wake")
            .unwrap()
            .unwrap();
        assert_eq!(event.event_data, "late");
    }

    #[tokio::test]
    async fn test_try_remove_empty() {
        let queue = EventQueue::default();
        assert!(queue.try_remove_next().is_none());

        queue.insert(make_event(EventType::Login, Priority::Low, "x")).unwrap();
        assert_eq!(queue.try_remove_next().unwrap().event_data, "x");
    }

    #[test]
    fn test_peek() {
        let queue = EventQueue::default();

        queue.insert(make_event(EventType::Login, Priority::Low, "Low")).unwrap();
        queue.insert(make_event(EventType::Login, Priority::High, "High")).unwrap();

        assert_eq!(queue.peek().unwrap().event_data, "High");
        // Peek does not remove
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_close_rejects_insert() {
        let queue = EventQueue::default();
        queue.close();

        let result = queue.insert(make_event(EventType::Login, Priority::Low, "x"));
        assert_eq!(result, Err(QueueError::Closed));
        assert!(queue.is_closed());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_close_drains_before_failing() {
        let queue = EventQueue::default();

        queue.insert(make_event(EventType::Login, Priority::Low, "a")).unwrap();
        queue.insert(make_event(EventType::Login, Priority::Low, "b")).unwrap();
        queue.close();

        assert_eq!(queue.remove_next().await.unwrap().event_data, "a");
        assert_eq!(queue.remove_next().await.unwrap().event_data, "b");
        assert_eq!(queue.remove_next().await, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn test_close_wakes_waiter() {
        let queue = Arc::new(EventQueue::default());

        let consumer = {
            let q = Arc::clone(&queue);
            tokio::spawn(async move { q.remove_next().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        let result = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("waiter should wake on close")
            .unwrap();
        assert_eq!(result, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn test_concurrent_producers() {
        let queue = Arc::new(EventQueue::default());
        let mut handles = vec![];

        for i in 0..4 {
            let q = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                for j in 0..10 {
                    let data = format!("T{}-{}", i, j);
                    q.insert(make_event(EventType::Login, Priority::Medium, &data))
                        .unwrap();
                    tokio::task::yield_now().await;
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(queue.len(), 40);

        let mut drained = 0;
        while queue.try_remove_next().is_some() {
            drained += 1;
        }
        assert_eq!(drained, 40);
    }
}
