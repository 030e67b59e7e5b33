//! Delivery gateway: the outbound send toward the carrier network.

mod http;

use std::error::Error as StdError;

use crate::BoxFuture;
use crate::domain::{MessageText, PhoneNumber};

pub use http::{HttpGateway, HttpGatewayBuilder};

#[derive(Debug, thiserror::Error)]
/// Errors returned by a [`DeliveryGateway`].
pub enum GatewayError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the gateway.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The gateway answered with an `ERROR` status.
    #[error("gateway rejected message: {status_code} {}", .status_text.as_deref().unwrap_or("-"))]
    Rejected {
        status_code: i32,
        status_text: Option<String>,
    },

    /// Response body could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// The gateway endpoint is not a valid URL.
    #[error("invalid gateway endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// No `api_id` credential was supplied.
    #[error("gateway api_id must not be empty")]
    MissingApiId,
}

/// Outbound send. Only success or failure is observed by callers.
pub trait DeliveryGateway: Send + Sync {
    fn dispatch<'a>(
        &'a self,
        phone: &'a PhoneNumber,
        message: &'a MessageText,
    ) -> BoxFuture<'a, Result<(), GatewayError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Gateway that only logs the send and always succeeds.
pub struct LoggingGateway;

impl DeliveryGateway for LoggingGateway {
    fn dispatch<'a>(
        &'a self,
        phone: &'a PhoneNumber,
        message: &'a MessageText,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            tracing::info!(phone = %phone, message = message.as_str(), "Sending SMS to {phone}");
            Ok(())
        })
    }
}
