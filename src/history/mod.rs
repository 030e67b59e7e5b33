//! Downstream consumer: per-recipient message history built from outcome events.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc;

use crate::domain::{DeliveryOutcome, PhoneNumber};
use crate::events::PublishedEvent;
use crate::transport::decode_outcome_json;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("undecodable event on topic {topic}: {source}")]
    Decode {
        topic: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One stored message and the status it was recorded with.
pub struct StoredMessage {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Default)]
/// Message history keyed by phone number, appended to in arrival order.
pub struct MessageHistory {
    by_phone: RwLock<HashMap<String, Vec<StoredMessage>>>,
}

impl MessageHistory {
    /// Append `outcome` to its recipient's history, creating the entry on first use.
    pub fn record(&self, outcome: &DeliveryOutcome) {
        let mut by_phone = self.by_phone.write().unwrap_or_else(PoisonError::into_inner);
        by_phone
            .entry(outcome.phone_number().as_str().to_owned())
            .or_default()
            .push(StoredMessage {
                message: outcome.message().as_str().to_owned(),
                status: outcome.status().as_str().to_owned(),
            });
    }

    /// Messages stored for `phone`; empty when nothing was recorded.
    pub fn messages(&self, phone: &PhoneNumber) -> Vec<StoredMessage> {
        let by_phone = self.by_phone.read().unwrap_or_else(PoisonError::into_inner);
        by_phone.get(phone.as_str()).cloned().unwrap_or_default()
    }

    /// Decode one published event and record it.
    pub fn ingest(&self, event: &PublishedEvent) -> Result<(), HistoryError> {
        let outcome =
            decode_outcome_json(&event.payload).map_err(|err| HistoryError::Decode {
                topic: event.topic.clone(),
                source: Box::new(err),
            })?;
        tracing::info!(
            phone = %outcome.phone_number(),
            status = %outcome.status(),
            "Received SMS event"
        );
        self.record(&outcome);
        Ok(())
    }

    /// Drain `rx` until every sender is dropped. Undecodable events are logged and skipped.
    ///
    /// Returns the number of events stored.
    pub async fn consume(&self, mut rx: mpsc::UnboundedReceiver<PublishedEvent>) -> usize {
        let mut stored = 0usize;
        while let Some(event) = rx.recv().await {
            match self.ingest(&event) {
                Ok(()) => stored = stored.saturating_add(1),
                Err(err) => tracing::warn!(error = %err, key = %event.key, "skipping event"),
            }
        }
        tracing::info!(stored, "event consumer stopped");
        stored
    }
}
