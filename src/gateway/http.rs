//! HTTP form gateway: posts `api_id`/`to`/`msg` and expects a JSON reply.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use crate::BoxFuture;
use crate::domain::{MessageText, PhoneNumber};
use crate::gateway::{DeliveryGateway, GatewayError};
use crate::transport::{GatewayStatus, decode_dispatch_json_response, encode_dispatch_form};

const API_ID_FIELD: &str = "api_id";

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self.client.post(url).form(&params).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// Builder for [`HttpGateway`].
///
/// Use this when you need to set a sender name, timeout, or user-agent.
pub struct HttpGatewayBuilder {
    endpoint: String,
    api_id: String,
    sender_id: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpGatewayBuilder {
    pub fn new(endpoint: impl Into<String>, api_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_id: api_id.into(),
            sender_id: None,
            timeout: None,
            user_agent: None,
        }
    }

    /// Sender name passed as `from`. Blank values are ignored.
    pub fn sender_id(mut self, sender_id: impl Into<String>) -> Self {
        let sender_id = sender_id.into();
        let trimmed = sender_id.trim();
        self.sender_id = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Validate settings and build an [`HttpGateway`].
    pub fn build(self) -> Result<HttpGateway, GatewayError> {
        url::Url::parse(&self.endpoint).map_err(|source| GatewayError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        })?;
        let api_id = self.api_id.trim().to_owned();
        if api_id.is_empty() {
            return Err(GatewayError::MissingApiId);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| GatewayError::Transport(Box::new(err)))?;

        Ok(HttpGateway {
            endpoint: self.endpoint,
            api_id,
            sender_id: self.sender_id,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Delivery gateway speaking an SMS.RU-style form API.
///
/// Each dispatch posts `api_id`, `to`, `msg` (and `from` when configured) with
/// `json=1` and treats anything but an `OK` reply as a failure.
pub struct HttpGateway {
    endpoint: String,
    api_id: String,
    sender_id: Option<String>,
    http: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("endpoint", &self.endpoint)
            .field("sender_id", &self.sender_id)
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    /// Start building a gateway for `endpoint` authenticated with `api_id`.
    pub fn builder(endpoint: impl Into<String>, api_id: impl Into<String>) -> HttpGatewayBuilder {
        HttpGatewayBuilder::new(endpoint, api_id)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, phone: &PhoneNumber, message: &MessageText) -> Result<(), GatewayError> {
        let mut params = vec![(API_ID_FIELD.to_owned(), self.api_id.clone())];
        params.extend(encode_dispatch_form(
            phone,
            message,
            self.sender_id.as_deref(),
        ));

        let response = self
            .http
            .post_form(&self.endpoint, params)
            .await
            .map_err(GatewayError::Transport)?;

        if !(200..=299).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(GatewayError::HttpStatus {
                status: response.status,
                body,
            });
        }

        let parsed = decode_dispatch_json_response(phone, &response.body)
            .map_err(|err| GatewayError::Parse(Box::new(err)))?;

        if parsed.status != GatewayStatus::Ok {
            return Err(GatewayError::Rejected {
                status_code: parsed.status_code,
                status_text: parsed.status_text,
            });
        }

        tracing::debug!(
            phone = %phone,
            sms_id = parsed.sms_id.as_deref().unwrap_or("-"),
            balance = parsed.balance.as_deref().unwrap_or("-"),
            "gateway accepted message"
        );
        Ok(())
    }
}

impl DeliveryGateway for HttpGateway {
    fn dispatch<'a>(
        &'a self,
        phone: &'a PhoneNumber,
        message: &'a MessageText,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(self.post(phone, message))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug)]
    struct FakeTransportState {
        last_url: Option<String>,
        last_params: Vec<(String, String)>,
        response_status: u16,
        response_body: String,
    }

    impl FakeTransport {
        fn new(response_status: u16, response_body: impl Into<String>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    last_url: None,
                    last_params: Vec::new(),
                    response_status,
                    response_body: response_body.into(),
                })),
            }
        }

        fn last_request(&self) -> (Option<String>, Vec<(String, String)>) {
            let state = self.state.lock().unwrap();
            (state.last_url.clone(), state.last_params.clone())
        }
    }

    impl HttpTransport for FakeTransport {
        fn post_form<'a>(
            &'a self,
            url: &'a str,
            params: Vec<(String, String)>,
        ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move {
                let (status, body) = {
                    let mut state = self.state.lock().unwrap();
                    state.last_url = Some(url.to_owned());
                    state.last_params = params;
                    (state.response_status, state.response_body.clone())
                };
                Ok(HttpResponse { status, body })
            })
        }
    }

    fn assert_param(params: &[(String, String)], key: &str, value: &str) {
        assert!(
            params.iter().any(|(k, v)| k == key && v == value),
            "missing param {key}={value}; got: {params:?}"
        );
    }

    fn make_gateway(transport: FakeTransport, sender_id: Option<&str>) -> HttpGateway {
        HttpGateway {
            endpoint: "https://example.invalid/sms/send".to_owned(),
            api_id: "test_key".to_owned(),
            sender_id: sender_id.map(str::to_owned),
            http: Arc::new(transport),
        }
    }

    fn phone() -> PhoneNumber {
        PhoneNumber::new("+79251234567").unwrap()
    }

    fn message() -> MessageText {
        MessageText::new("hello").unwrap()
    }

    #[tokio::test]
    async fn dispatch_posts_form_and_accepts_ok_response() {
        let json = r#"
        {
          "status": "OK",
          "status_code": 100,
          "balance": "10.00",
          "sms": {
            "79251234567": {
              "status": "OK",
              "status_code": 100,
              "sms_id": "abc123"
            }
          }
        }
        "#;

        let transport = FakeTransport::new(200, json);
        let gateway = make_gateway(transport.clone(), Some("MyBrand"));

        gateway.dispatch(&phone(), &message()).await.unwrap();

        let (url, params) = transport.last_request();
        assert_eq!(url.as_deref(), Some("https://example.invalid/sms/send"));
        assert_param(&params, "api_id", "test_key");
        assert_param(&params, "json", "1");
        assert_param(&params, "to", "+79251234567");
        assert_param(&params, "msg", "hello");
        assert_param(&params, "from", "MyBrand");
    }

    #[tokio::test]
    async fn dispatch_maps_top_level_error_to_rejected() {
        let json = r#"
        {
          "status": "ERROR",
          "status_code": 200,
          "status_text": "Invalid api_id"
        }
        "#;

        let gateway = make_gateway(FakeTransport::new(200, json), None);

        let err = gateway.dispatch(&phone(), &message()).await.unwrap_err();
        match err {
            GatewayError::Rejected {
                status_code,
                status_text,
            } => {
                assert_eq!(status_code, 200);
                assert_eq!(status_text.as_deref(), Some("Invalid api_id"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn dispatch_maps_recipient_error_to_rejected() {
        let json = r#"
        {
          "status": "OK",
          "status_code": 100,
          "sms": {
            "+79251234567": { "status": "ERROR", "status_code": 207 }
          }
        }
        "#;

        let gateway = make_gateway(FakeTransport::new(200, json), None);

        let err = gateway.dispatch(&phone(), &message()).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Rejected {
                status_code: 207,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn dispatch_maps_non_success_http_status() {
        let gateway = make_gateway(FakeTransport::new(500, "oops"), None);

        let err = gateway.dispatch(&phone(), &message()).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::HttpStatus {
                status: 500,
                body: Some(_)
            }
        ));
    }

    #[tokio::test]
    async fn dispatch_maps_empty_http_body_to_none() {
        let gateway = make_gateway(FakeTransport::new(503, "   "), None);

        let err = gateway.dispatch(&phone(), &message()).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::HttpStatus {
                status: 503,
                body: None
            }
        ));
    }

    #[tokio::test]
    async fn dispatch_maps_invalid_json_to_parse_error() {
        let gateway = make_gateway(FakeTransport::new(200, "{ not json }"), None);

        let err = gateway.dispatch(&phone(), &message()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Parse(_)));
    }

    #[test]
    fn builder_validates_endpoint_and_api_id() {
        let err = HttpGateway::builder("not a url", "key").build().unwrap_err();
        assert!(matches!(err, GatewayError::InvalidEndpoint { .. }));

        let err = HttpGateway::builder("https://example.invalid/sms/send", "  ")
            .build()
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingApiId));
    }

    #[test]
    fn builder_applies_settings() {
        let gateway = HttpGateway::builder("https://example.invalid/sms/send", " key ")
            .sender_id(" MyBrand ")
            .timeout(Duration::from_secs(5))
            .user_agent("smsgate-test")
            .build()
            .unwrap();
        assert_eq!(gateway.endpoint(), "https://example.invalid/sms/send");
        assert_eq!(gateway.api_id, "key");
        assert_eq!(gateway.sender_id.as_deref(), Some("MyBrand"));

        let gateway = HttpGateway::builder("https://example.invalid/sms/send", "key")
            .sender_id("   ")
            .build()
            .unwrap();
        assert!(gateway.sender_id.is_none());
    }
}
