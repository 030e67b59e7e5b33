use std::fmt;

use crate::domain::request::SendRequest;
use crate::domain::value::{EventId, MessageText, PhoneNumber};

/// Status text recorded for a successful dispatch.
pub const SENT_STATUS: &str = "Sent";
/// Status text (and caller-visible result) for a suppressed send.
pub const BLACKLISTED_STATUS: &str = "Failed: Phone number is blacklisted";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Delivery status carried by an outcome event.
///
/// Statuses other than the two produced by the send pipeline are preserved as-is.
pub enum DeliveryStatus {
    Sent,
    Blacklisted,
    Other(String),
}

impl DeliveryStatus {
    /// Map wire status text onto a known variant, keeping unknown text verbatim.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text == SENT_STATUS {
            Self::Sent
        } else if text == BLACKLISTED_STATUS {
            Self::Blacklisted
        } else {
            Self::Other(text)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Sent => SENT_STATUS,
            Self::Blacklisted => BLACKLISTED_STATUS,
            Self::Other(text) => text,
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable record of one send attempt, handed to the event sink.
pub struct DeliveryOutcome {
    phone_number: PhoneNumber,
    message: MessageText,
    status: DeliveryStatus,
    event_id: Option<EventId>,
}

impl DeliveryOutcome {
    pub fn new(phone_number: PhoneNumber, message: MessageText, status: DeliveryStatus) -> Self {
        Self {
            phone_number,
            message,
            status,
            event_id: None,
        }
    }

    /// Build the record for `request`, copying its fields and correlation id.
    pub fn for_request(request: &SendRequest, status: DeliveryStatus) -> Self {
        Self {
            phone_number: request.phone_number().clone(),
            message: request.message().clone(),
            status,
            event_id: request.event_id().cloned(),
        }
    }

    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    pub fn phone_number(&self) -> &PhoneNumber {
        &self.phone_number
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }

    pub fn status(&self) -> &DeliveryStatus {
        &self.status
    }

    pub fn event_id(&self) -> Option<&EventId> {
        self.event_id.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Business result of a send call.
///
/// `Display` renders the strings existing callers compare against:
/// `"SMS sent to <phone>"` and `"Failed: Phone number is blacklisted"`.
pub enum SendOutcome {
    Sent { phone_number: PhoneNumber },
    Blacklisted,
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent { phone_number } => write!(f, "SMS sent to {phone_number}"),
            Self::Blacklisted => f.write_str(BLACKLISTED_STATUS),
        }
    }
}
