//! Event sink: one-way publication of delivery outcomes.

use std::error::Error as StdError;
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::BoxFuture;
use crate::domain::DeliveryOutcome;
use crate::transport::encode_outcome_json;

/// Topic outcome events are published to by default.
pub const DEFAULT_TOPIC: &str = "sms_events";

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The outcome could not be serialized.
    #[error("failed to encode outcome: {0}")]
    Encode(#[source] Box<dyn StdError + Send + Sync>),

    /// Nobody is consuming the topic any more.
    #[error("event topic {topic} is closed")]
    Closed { topic: String },

    /// The sink is unavailable for another reason.
    #[error("event sink unavailable: {0}")]
    Unavailable(#[source] Box<dyn StdError + Send + Sync>),
}

/// One-way outcome publication. No acknowledgment beyond the call returning.
pub trait EventSink: Send + Sync {
    fn publish(&self, outcome: DeliveryOutcome) -> BoxFuture<'_, Result<(), SinkError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An encoded outcome as it travels on the event channel.
pub struct PublishedEvent {
    pub topic: String,
    /// Partition key: the recipient phone number.
    pub key: String,
    /// JSON body with `phoneNumber`, `message`, `status` and `eventId`.
    pub payload: String,
}

#[derive(Debug, Clone)]
/// Sink that encodes outcomes as JSON onto an in-process unbounded channel.
///
/// Publishing never blocks; it fails only once every receiver is gone.
pub struct ChannelSink {
    topic: String,
    tx: mpsc::UnboundedSender<PublishedEvent>,
}

impl ChannelSink {
    /// Create a sink for `topic` together with the receiving end of its channel.
    pub fn new(topic: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<PublishedEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            topic: topic.into(),
            tx,
        };
        (sink, rx)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn send(&self, outcome: &DeliveryOutcome) -> Result<(), SinkError> {
        let payload =
            encode_outcome_json(outcome).map_err(|err| SinkError::Encode(Box::new(err)))?;
        let event = PublishedEvent {
            topic: self.topic.clone(),
            key: outcome.phone_number().as_str().to_owned(),
            payload,
        };
        self.tx.send(event).map_err(|_| SinkError::Closed {
            topic: self.topic.clone(),
        })?;
        tracing::debug!(
            topic = %self.topic,
            phone = %outcome.phone_number(),
            status = %outcome.status(),
            "Produced SMS event"
        );
        Ok(())
    }
}

impl EventSink for ChannelSink {
    fn publish(&self, outcome: DeliveryOutcome) -> BoxFuture<'_, Result<(), SinkError>> {
        Box::pin(async move { self.send(&outcome) })
    }
}

#[derive(Debug, Default)]
/// Sink that keeps every published outcome in memory, in publish order.
pub struct RecordingSink {
    outcomes: Mutex<Vec<DeliveryOutcome>>,
}

impl RecordingSink {
    /// Snapshot of everything published so far.
    pub fn outcomes(&self) -> Vec<DeliveryOutcome> {
        match self.outcomes.lock() {
            Ok(outcomes) => outcomes.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, outcome: DeliveryOutcome) -> BoxFuture<'_, Result<(), SinkError>> {
        Box::pin(async move {
            let mut outcomes = self
                .outcomes
                .lock()
                .map_err(|err| SinkError::Unavailable(err.to_string().into()))?;
            outcomes.push(outcome);
            Ok(())
        })
    }
}
