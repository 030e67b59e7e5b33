//! Configuration loading.
//!
//! Loads `smsgate.toml` (or `$SMSGATE_CONFIG_PATH`). Environment variables
//! override file values; file values override defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::blocklist::{DEFAULT_KEY_PREFIX, InMemoryBlocklist};
use crate::events::{ChannelSink, DEFAULT_TOPIC, PublishedEvent};
use crate::gateway::{DeliveryGateway, GatewayError, HttpGateway, LoggingGateway};

const DEFAULT_CONFIG_PATH: &str = "smsgate.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid gateway settings: {0}")]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_level: LogLevel,
    pub gateway: GatewayConfig,
    pub events: EventsConfig,
    pub blocklist: BlocklistConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct LogLevel(pub String);

impl Default for LogLevel {
    fn default() -> Self {
        Self("info".to_owned())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// `[gateway]`: the HTTP gateway is used only when both `endpoint` and `api_id` are set.
pub struct GatewayConfig {
    pub endpoint: Option<String>,
    pub api_id: Option<String>,
    pub sender_id: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EventsConfig {
    pub topic: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BlocklistConfig {
    pub key_prefix: String,
}

impl Default for BlocklistConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_owned(),
        }
    }
}

impl Config {
    /// Load with precedence: env vars > TOML file > defaults.
    ///
    /// A missing config file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();
        let path = env("SMSGATE_CONFIG_PATH").unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_overrides(env);
        Ok(config)
    }

    /// Load from a TOML file only, no env overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_owned(),
                source,
            }),
        }
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Apply `SMSGATE_*` overrides. Takes a resolver so tests avoid touching the process env.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("SMSGATE_LOG_LEVEL") {
            self.log_level = LogLevel(v);
        }

        if let Some(v) = env("SMSGATE_GATEWAY_ENDPOINT") {
            self.gateway.endpoint = Some(v);
        }
        if let Some(v) = env("SMSGATE_GATEWAY_API_ID") {
            self.gateway.api_id = Some(v);
        }
        if let Some(v) = env("SMSGATE_GATEWAY_SENDER_ID") {
            self.gateway.sender_id = Some(v);
        }
        if let Some(v) = env("SMSGATE_GATEWAY_TIMEOUT_SECS") {
            match v.parse() {
                Ok(secs) => self.gateway.timeout_secs = Some(secs),
                Err(_) => tracing::warn!(
                    var = "SMSGATE_GATEWAY_TIMEOUT_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }

        if let Some(v) = env("SMSGATE_EVENTS_TOPIC") {
            self.events.topic = v;
        }
        if let Some(v) = env("SMSGATE_BLOCKLIST_KEY_PREFIX") {
            self.blocklist.key_prefix = v;
        }
    }

    pub fn blocklist(&self) -> InMemoryBlocklist {
        InMemoryBlocklist::with_prefix(self.blocklist.key_prefix.clone())
    }

    pub fn event_sink(
        &self,
    ) -> (ChannelSink, tokio::sync::mpsc::UnboundedReceiver<PublishedEvent>) {
        ChannelSink::new(self.events.topic.clone())
    }
}

impl GatewayConfig {
    /// Build the configured gateway: HTTP when fully configured, logging otherwise.
    pub fn build(&self) -> Result<Arc<dyn DeliveryGateway>, ConfigError> {
        let (Some(endpoint), Some(api_id)) = (&self.endpoint, &self.api_id) else {
            tracing::info!("no gateway endpoint configured, using logging gateway");
            return Ok(Arc::new(LoggingGateway));
        };

        let mut builder = HttpGateway::builder(endpoint.clone(), api_id.clone());
        if let Some(sender_id) = &self.sender_id {
            builder = builder.sender_id(sender_id.clone());
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let gateway = builder.build()?;
        tracing::info!(endpoint = gateway.endpoint(), "using HTTP gateway");
        Ok(Arc::new(gateway))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn resolver(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_cache_and_topic_names() {
        let config = Config::default();
        assert_eq!(config.log_level.0, "info");
        assert_eq!(config.events.topic, "sms_events");
        assert_eq!(config.blocklist.key_prefix, "blacklist:");
        assert!(config.gateway.endpoint.is_none());
    }

    #[test]
    fn toml_sections_are_optional_and_partial() {
        let config = Config::from_toml(
            r#"
            log_level = "debug"

            [gateway]
            endpoint = "https://sms.example/send"
            api_id = "key"
            timeout_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level.0, "debug");
        assert_eq!(
            config.gateway.endpoint.as_deref(),
            Some("https://sms.example/send")
        );
        assert_eq!(config.gateway.timeout_secs, Some(10));
        assert_eq!(config.events, EventsConfig::default());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        assert!(matches!(
            Config::from_toml("log_level = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::from_toml("[events]\ntopic = \"from_file\"").unwrap();
        config.apply_overrides(resolver(&[
            ("SMSGATE_EVENTS_TOPIC", "from_env"),
            ("SMSGATE_GATEWAY_API_ID", "env-key"),
            ("SMSGATE_BLOCKLIST_KEY_PREFIX", "bl/"),
            ("SMSGATE_LOG_LEVEL", "warn"),
        ]));
        assert_eq!(config.events.topic, "from_env");
        assert_eq!(config.gateway.api_id.as_deref(), Some("env-key"));
        assert_eq!(config.blocklist.key_prefix, "bl/");
        assert_eq!(config.log_level.0, "warn");
    }

    #[test]
    fn invalid_numeric_override_is_ignored() {
        let mut config = Config::default();
        config.gateway.timeout_secs = Some(3);
        config.apply_overrides(resolver(&[("SMSGATE_GATEWAY_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.gateway.timeout_secs, Some(3));
    }

    #[test]
    fn from_file_reads_toml_and_tolerates_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[blocklist]\nkey_prefix = \"blocked:\"").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.blocklist.key_prefix, "blocked:");

        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn gateway_build_falls_back_to_logging_and_validates_http() {
        assert!(GatewayConfig::default().build().is_ok());

        let partial = GatewayConfig {
            endpoint: Some("https://sms.example/send".to_owned()),
            ..Default::default()
        };
        assert!(partial.build().is_ok());

        let bad = GatewayConfig {
            endpoint: Some("not a url".to_owned()),
            api_id: Some("key".to_owned()),
            ..Default::default()
        };
        assert!(matches!(
            bad.build(),
            Err(ConfigError::Gateway(GatewayError::InvalidEndpoint { .. }))
        ));

        let full = GatewayConfig {
            endpoint: Some("https://sms.example/send".to_owned()),
            api_id: Some("key".to_owned()),
            sender_id: Some("Brand".to_owned()),
            timeout_secs: Some(5),
            user_agent: Some("smsgate".to_owned()),
        };
        assert!(full.build().is_ok());
    }

    #[test]
    fn collaborators_use_configured_names() {
        let mut config = Config::default();
        config.events.topic = "outcomes".to_owned();
        config.blocklist.key_prefix = "deny:".to_owned();

        let (sink, _rx) = config.event_sink();
        assert_eq!(sink.topic(), "outcomes");

        let phone = crate::domain::PhoneNumber::new("+1234567890").unwrap();
        assert_eq!(config.blocklist().key_for(&phone), "deny:+1234567890");
    }
}
