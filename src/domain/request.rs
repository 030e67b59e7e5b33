use crate::domain::validation::ValidationError;
use crate::domain::value::{EventId, MessageText, PhoneNumber};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A validated request to deliver one message to one recipient.
///
/// Both fields are checked at construction, so the send pipeline never sees
/// malformed input.
pub struct SendRequest {
    phone_number: PhoneNumber,
    message: MessageText,
    event_id: Option<EventId>,
}

impl SendRequest {
    pub fn new(phone_number: PhoneNumber, message: MessageText) -> Self {
        Self {
            phone_number,
            message,
            event_id: None,
        }
    }

    /// Validate raw strings and build a request.
    pub fn parse(
        phone_number: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(
            PhoneNumber::new(phone_number)?,
            MessageText::new(message)?,
        ))
    }

    /// Attach a correlation id that is copied into the outcome event.
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

    pub fn event_id(&self) -> Option<&EventId> {
        self.event_id.as_ref()
    }
}
