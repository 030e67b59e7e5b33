use serde::{Deserialize, Serialize};

use crate::domain::{
    DeliveryOutcome, DeliveryStatus, EventId, MessageText, PhoneNumber, ValidationError,
};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid outcome JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("outcome payload failed validation: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeJsonOut<'a> {
    phone_number: &'a str,
    message: &'a str,
    status: &'a str,
    event_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeJsonIn {
    phone_number: String,
    message: String,
    status: String,
    #[serde(default)]
    event_id: Option<String>,
}

pub fn encode_outcome_json(outcome: &DeliveryOutcome) -> Result<String, TransportError> {
    let wire = OutcomeJsonOut {
        phone_number: outcome.phone_number().as_str(),
        message: outcome.message().as_str(),
        status: outcome.status().as_str(),
        event_id: outcome.event_id().map(EventId::as_str),
    };
    Ok(serde_json::to_string(&wire)?)
}

pub fn decode_outcome_json(json: &str) -> Result<DeliveryOutcome, TransportError> {
    let parsed: OutcomeJsonIn = serde_json::from_str(json)?;
    let mut outcome = DeliveryOutcome::new(
        PhoneNumber::new(parsed.phone_number)?,
        MessageText::new(parsed.message)?,
        DeliveryStatus::from_text(parsed.status),
    );
    if let Some(event_id) = parsed.event_id {
        outcome = outcome.with_event_id(EventId::new(event_id)?);
    }
    Ok(outcome)
}
