use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{MessageText, PhoneNumber};

/// Form field for the recipient.
pub const TO_FIELD: &str = "to";
/// Form field for the message body.
pub const MSG_FIELD: &str = "msg";
/// Form field for the optional sender name.
pub const FROM_FIELD: &str = "from";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GatewayStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TransportBalance {
    String(String),
    Number(serde_json::Number),
}

impl TransportBalance {
    fn into_string(self) -> String {
        match self {
            Self::String(value) => value,
            Self::Number(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct DispatchJsonResponse {
    status: GatewayStatus,
    status_code: i32,
    #[serde(default)]
    status_text: Option<String>,
    #[serde(default)]
    balance: Option<TransportBalance>,
    #[serde(default)]
    sms: BTreeMap<String, RecipientJsonResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct RecipientJsonResult {
    status: GatewayStatus,
    status_code: i32,
    #[serde(default)]
    status_text: Option<String>,
    #[serde(default)]
    sms_id: Option<String>,
}

/// Decoded gateway reply for a single-recipient dispatch.
///
/// When the gateway reports a per-recipient entry, its status takes precedence
/// over the top-level one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    pub status: GatewayStatus,
    pub status_code: i32,
    pub status_text: Option<String>,
    pub sms_id: Option<String>,
    pub balance: Option<String>,
}

pub fn encode_dispatch_form(
    phone: &PhoneNumber,
    message: &MessageText,
    sender_id: Option<&str>,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("json".to_owned(), "1".to_owned()),
        (TO_FIELD.to_owned(), phone.as_str().to_owned()),
        (MSG_FIELD.to_owned(), message.as_str().to_owned()),
    ];
    if let Some(from) = sender_id {
        params.push((FROM_FIELD.to_owned(), from.to_owned()));
    }
    params
}

pub fn decode_dispatch_json_response(
    phone: &PhoneNumber,
    json: &str,
) -> Result<DispatchResponse, TransportError> {
    let parsed: DispatchJsonResponse = serde_json::from_str(json)?;
    let balance = parsed.balance.map(TransportBalance::into_string);

    // Gateways may echo the key with or without the leading `+`.
    let raw = phone.as_str();
    let alternate = match raw.strip_prefix('+') {
        Some(without_plus) => without_plus.to_owned(),
        None => format!("+{raw}"),
    };
    let mut sms = parsed.sms;
    let recipient = sms.remove(raw).or_else(|| sms.remove(&alternate));

    Ok(match recipient {
        Some(result) if parsed.status == GatewayStatus::Ok => DispatchResponse {
            status: result.status,
            status_code: result.status_code,
            status_text: result.status_text,
            sms_id: result.sms_id,
            balance,
        },
        _ => DispatchResponse {
            status: parsed.status,
            status_code: parsed.status_code,
            status_text: parsed.status_text,
            sms_id: None,
            balance,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> PhoneNumber {
        PhoneNumber::new("+79251234567").unwrap()
    }

    #[test]
    fn encode_form_params() {
        let params = encode_dispatch_form(&phone(), &MessageText::new("hello").unwrap(), None);
        assert_eq!(
            params,
            vec![
                ("json".to_owned(), "1".to_owned()),
                ("to".to_owned(), "+79251234567".to_owned()),
                ("msg".to_owned(), "hello".to_owned()),
            ]
        );
    }

    #[test]
    fn encode_form_includes_sender_when_set() {
        let params = encode_dispatch_form(
            &phone(),
            &MessageText::new("hello").unwrap(),
            Some("MyBrand"),
        );
        assert_eq!(
            params.last(),
            Some(&("from".to_owned(), "MyBrand".to_owned()))
        );
    }

    #[test]
    fn decode_uses_recipient_entry_matched_without_plus() {
        let json = r#"
        {
          "status": "OK",
          "status_code": 100,
          "balance": 12.34,
          "sms": {
            "79251234567": {
              "status": "OK",
              "status_code": 100,
              "sms_id": "000000-000001"
            }
          }
        }
        "#;

        let resp = decode_dispatch_json_response(&phone(), json).unwrap();
        assert_eq!(resp.status, GatewayStatus::Ok);
        assert_eq!(resp.status_code, 100);
        assert_eq!(resp.sms_id.as_deref(), Some("000000-000001"));
        assert_eq!(resp.balance.as_deref(), Some("12.34"));
    }

    #[test]
    fn decode_surfaces_recipient_level_error() {
        let json = r#"
        {
          "status": "OK",
          "status_code": 100,
          "sms": {
            "+79251234567": {
              "status": "ERROR",
              "status_code": 209,
              "status_text": "recipient is in the stop list"
            }
          }
        }
        "#;

        let resp = decode_dispatch_json_response(&phone(), json).unwrap();
        assert_eq!(resp.status, GatewayStatus::Error);
        assert_eq!(resp.status_code, 209);
        assert_eq!(
            resp.status_text.as_deref(),
            Some("recipient is in the stop list")
        );
    }

    #[test]
    fn decode_top_level_error_without_sms_map() {
        let json = r#"{ "status": "ERROR", "status_code": 200, "status_text": "Invalid api_id" }"#;
        let resp = decode_dispatch_json_response(&phone(), json).unwrap();
        assert_eq!(resp.status, GatewayStatus::Error);
        assert_eq!(resp.status_code, 200);
        assert!(resp.sms_id.is_none());
    }

    #[test]
    fn decode_rejects_invalid_json() {
        assert!(matches!(
            decode_dispatch_json_response(&phone(), "{ not json }"),
            Err(TransportError::Json(_))
        ));
    }
}
