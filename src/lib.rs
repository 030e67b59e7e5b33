//! Send-decision pipeline for outbound SMS.
//!
//! A request is checked against a block-list, forwarded to a delivery gateway
//! when allowed, and every attempt is recorded as exactly one outcome event.
//! The layout follows a small set of layers: a domain layer of strong types,
//! a transport layer for wire formats, collaborator seams (`blocklist`,
//! `gateway`, `events`) and the [`SmsSender`] orchestrating them.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use smsgate::{InMemoryBlocklist, LoggingGateway, RecordingSink, SendRequest, SmsSender};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sender = SmsSender::new(
//!         Arc::new(InMemoryBlocklist::default()),
//!         Arc::new(LoggingGateway),
//!         Arc::new(RecordingSink::default()),
//!     );
//!     let request = SendRequest::parse("+1234567890", "Hello World")?;
//!     let outcome = sender.send(request).await?;
//!     assert_eq!(outcome.to_string(), "SMS sent to +1234567890");
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

use std::future::Future;
use std::pin::Pin;

pub mod api;
pub mod blocklist;
pub mod config;
pub mod domain;
pub mod events;
pub mod gateway;
pub mod history;
pub mod logging;
pub mod sender;
mod transport;

/// Boxed, sendable future returned by the collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use api::{ApiError, SendResponse, SendSmsBody, handle_send_json};
pub use blocklist::{BlocklistError, BlocklistStore, InMemoryBlocklist};
pub use config::{Config, ConfigError};
pub use domain::{
    BLACKLISTED_STATUS, DeliveryOutcome, DeliveryStatus, EventId, MessageText, PhoneNumber,
    SENT_STATUS, SendOutcome, SendRequest, ValidationError,
};
pub use events::{ChannelSink, EventSink, PublishedEvent, RecordingSink, SinkError};
pub use gateway::{DeliveryGateway, GatewayError, HttpGateway, HttpGatewayBuilder, LoggingGateway};
pub use history::{HistoryError, MessageHistory, StoredMessage};
pub use sender::{BLOCKLIST_UNAVAILABLE_STATUS, SendError, SmsSender};
