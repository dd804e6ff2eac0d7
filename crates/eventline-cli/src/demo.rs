//! Demo consumers and a random event producer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eventline_events::{Pipeline, PipelineError, PromoteType, StampTimestamp};
use eventline_models::{Event, EventType, Priority, Source};
use eventline_queue::QueueError;
use eventline_runtime::{EventHandler, HandlerResult, Result, Runtime, RuntimeConfig};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

/// Consumer that simulates work by sleeping before reporting the event.
#[derive(Debug, Clone)]
pub struct SimulatedWork {
    label: String,
    delay: Duration,
}

impl SimulatedWork {
    /// Creates a consumer named `label` that sleeps for `delay` per event.
    pub fn new(label: impl Into<String>, delay: Duration) -> Self {
        Self {
            label: label.into(),
            delay,
        }
    }
}

#[async_trait]
impl EventHandler for SimulatedWork {
    async fn handle(&self, event_type: EventType, payload: &str) -> HandlerResult {
        tokio::time::sleep(self.delay).await;
        println!("Handling {} event: {}", event_type, payload);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Builds the demo runtime: `New` events are promoted to high priority
/// from the API before filtering, and every accepted event is stamped.
pub fn build_runtime(config: RuntimeConfig) -> Result<Runtime> {
    Runtime::builder(config)
        .pre_filter(PromoteType::new(EventType::New, Priority::High, Source::Api))
        .post_filter(StampTimestamp::new())
        .build()
}

/// Registers the demo consumers. `Unknown` deliberately has none.
pub async fn register_handlers(runtime: &Runtime, work: Duration) {
    for event_type in [EventType::Login, EventType::Logout, EventType::Purchase] {
        let label = format!("{}_consumer", event_type.as_str().to_lowercase());
        runtime
            .register(event_type, SimulatedWork::new(label, work))
            .await;
    }
    runtime
        .register(EventType::New, SimulatedWork::new("new_consumer", work * 2))
        .await;
}

/// Picks a uniformly random type, priority and source.
pub fn random_event<R: Rng + ?Sized>(rng: &mut R) -> Event {
    let event_type = *EventType::ALL.choose(rng).unwrap_or(&EventType::Unknown);
    let priority = *Priority::ALL.choose(rng).unwrap_or(&Priority::Medium);
    let source = *Source::ALL.choose(rng).unwrap_or(&Source::Unknown);

    let data = format!(
        "Event Data for {} priority: {} source: {}",
        event_type, priority, source
    );
    Event::new(event_type, priority, source, data)
}

/// Submits random events with a random pause between them.
#[derive(Debug)]
pub struct Producer {
    pipeline: Arc<Pipeline>,
    min_delay: Duration,
    max_delay: Duration,
    limit: Option<u64>,
}

impl Producer {
    /// Creates an unlimited producer pausing between `min_delay` and `max_delay`.
    pub fn new(pipeline: Arc<Pipeline>, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            pipeline,
            min_delay,
            max_delay,
            limit: None,
        }
    }

    /// Stops after `limit` events.
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Produces until the limit is reached or the queue closes.
    ///
    /// # Returns
    ///
    /// The number of events produced, accepted or dropped.
    pub async fn run(&self) -> Result<u64> {
        let mut produced = 0;

        while self.limit.map_or(true, |limit| produced < limit) {
            let (event, delay) = self.next();

            match self.pipeline.submit(event) {
                Ok(_) => produced += 1,
                Err(PipelineError::Queue(QueueError::Closed)) => {
                    debug!("queue closed, producer stopping");
                    break;
                }
                Err(e) => return Err(e.into()),
            }

            tokio::time::sleep(delay).await;
        }

        info!(produced, "producer finished");
        Ok(produced)
    }

    // The thread-local rng is not Send, so it must not live across an await.
    fn next(&self) -> (Event, Duration) {
        let mut rng = rand::thread_rng();
        let event = random_event(&mut rng);
        let delay = rng.gen_range(self.min_delay..=self.max_delay);
        (event, delay)
    }
}
