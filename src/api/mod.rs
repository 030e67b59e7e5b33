//! Request boundary: JSON body in, response envelope out.
//!
//! Transport-agnostic; an HTTP layer maps [`ApiError::is_client_error`] to a
//! 4xx and everything in [`SendResponse`] to a 200. Both the sent and the
//! blacklisted outcomes are successes here, distinguished only by `result`.

use serde::{Deserialize, Serialize};

use crate::domain::{EventId, MessageText, PhoneNumber, SendRequest, ValidationError};
use crate::sender::{SendError, SmsSender};

/// Status tag carried by every successful response envelope.
pub const SUCCESS_TAG: &str = "success";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Raw request body, before validation.
pub struct SendSmsBody {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
}

impl SendSmsBody {
    /// Validate the body into a [`SendRequest`]. Missing fields count as empty.
    pub fn validate(self) -> Result<SendRequest, ValidationError> {
        let phone = PhoneNumber::new(self.phone_number.unwrap_or_default())?;
        let message = MessageText::new(self.message.unwrap_or_default())?;
        let mut request = SendRequest::new(phone, message);
        if let Some(event_id) = self.event_id {
            request = request.with_event_id(EventId::new(event_id)?);
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Response envelope: `{"result": ..., "status": "success"}`.
pub struct SendResponse {
    pub result: String,
    pub status: String,
}

impl SendResponse {
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            status: SUCCESS_TAG.to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The body is not valid JSON.
    #[error("malformed request body: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A field failed validation; the pipeline was not run.
    #[error("invalid request: {0}")]
    Invalid(#[from] ValidationError),

    /// The pipeline ran but a collaborator failed.
    #[error(transparent)]
    Send(#[from] SendError),
}

impl ApiError {
    /// Whether the caller sent a bad request (as opposed to a server-side failure).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::Invalid(_))
    }
}

/// Parse, validate and run a send request from a JSON body.
pub async fn handle_send_json(sender: &SmsSender, body: &str) -> Result<SendResponse, ApiError> {
    let body: SendSmsBody = serde_json::from_str(body)?;
    let request = body.validate()?;
    let outcome = sender.send(request).await?;
    Ok(SendResponse::success(outcome.to_string()))
}
