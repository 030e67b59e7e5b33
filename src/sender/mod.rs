//! Send orchestrator: the single decision point for whether a message is dispatched.

use std::sync::Arc;

use crate::blocklist::{BlocklistError, BlocklistStore};
use crate::domain::{DeliveryOutcome, DeliveryStatus, SendOutcome, SendRequest};
use crate::events::{EventSink, SinkError};
use crate::gateway::{DeliveryGateway, GatewayError};

/// Status recorded when the block-list could not be consulted.
pub const BLOCKLIST_UNAVAILABLE_STATUS: &str = "Failed: Block-list unavailable";

#[derive(Debug, thiserror::Error)]
/// Collaborator failures surfaced by [`SmsSender::send`].
///
/// A block-list hit is not an error; it is [`SendOutcome::Blacklisted`].
pub enum SendError {
    /// The block-list could not answer; nothing was dispatched.
    #[error("block-list lookup failed: {0}")]
    Blocklist(#[source] BlocklistError),

    /// The gateway refused or failed the dispatch.
    #[error("gateway dispatch failed: {0}")]
    Gateway(#[source] GatewayError),

    /// The decision was carried out but its outcome event was not published.
    #[error("outcome not published ({decided}): {source}")]
    Sink {
        decided: SendOutcome,
        #[source]
        source: SinkError,
    },
}

#[derive(Clone)]
/// Orchestrates block-list lookup, gateway dispatch and outcome publication.
///
/// Holds only shared handles to its collaborators, so one instance can serve
/// any number of concurrent callers. Per call:
/// - the block-list is always consulted first,
/// - the gateway is called at most once, and never for a blacklisted number,
/// - exactly one outcome is handed to the event sink, as the last step.
///
/// Identical requests are not deduplicated.
pub struct SmsSender {
    blocklist: Arc<dyn BlocklistStore>,
    gateway: Arc<dyn DeliveryGateway>,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for SmsSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsSender").finish_non_exhaustive()
    }
}

impl SmsSender {
    pub fn new(
        blocklist: Arc<dyn BlocklistStore>,
        gateway: Arc<dyn DeliveryGateway>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            blocklist,
            gateway,
            events,
        }
    }

    /// Run the send pipeline for one request.
    ///
    /// Errors:
    /// - [`SendError::Blocklist`] when membership is unknown (fails closed),
    /// - [`SendError::Gateway`] when the dispatch fails,
    /// - [`SendError::Sink`] when the decision stands but the outcome was not published.
    ///
    /// The first two still publish an outcome whose status starts with `Failed:`.
    pub async fn send(&self, request: SendRequest) -> Result<SendOutcome, SendError> {
        let phone = request.phone_number();

        let blacklisted = match self.blocklist.is_blacklisted(phone).await {
            Ok(blacklisted) => blacklisted,
            Err(err) => {
                tracing::warn!(phone = %phone, error = %err, "block-list lookup failed");
                let status = DeliveryStatus::Other(BLOCKLIST_UNAVAILABLE_STATUS.to_owned());
                self.publish_failure(DeliveryOutcome::for_request(&request, status))
                    .await;
                return Err(SendError::Blocklist(err));
            }
        };

        if blacklisted {
            tracing::info!(phone = %phone, "recipient is blacklisted, not dispatching");
            let outcome = DeliveryOutcome::for_request(&request, DeliveryStatus::Blacklisted);
            return self.publish(outcome, SendOutcome::Blacklisted).await;
        }

        if let Err(err) = self.gateway.dispatch(phone, request.message()).await {
            tracing::warn!(phone = %phone, error = %err, "gateway dispatch failed");
            let status = DeliveryStatus::Other(format!("Failed: {err}"));
            self.publish_failure(DeliveryOutcome::for_request(&request, status))
                .await;
            return Err(SendError::Gateway(err));
        }
        tracing::info!(phone = %phone, "message dispatched");

        let outcome = DeliveryOutcome::for_request(&request, DeliveryStatus::Sent);
        let decided = SendOutcome::Sent {
            phone_number: phone.clone(),
        };
        self.publish(outcome, decided).await
    }

    async fn publish(
        &self,
        outcome: DeliveryOutcome,
        decided: SendOutcome,
    ) -> Result<SendOutcome, SendError> {
        match self.events.publish(outcome).await {
            Ok(()) => Ok(decided),
            Err(source) => {
                tracing::warn!(error = %source, "outcome event not published");
                Err(SendError::Sink { decided, source })
            }
        }
    }

    // The collaborator error is what the caller sees; a publish failure here is only logged.
    async fn publish_failure(&self, outcome: DeliveryOutcome) {
        if let Err(err) = self.events.publish(outcome).await {
            tracing::warn!(error = %err, "failure outcome event not published");
        }
    }
}
