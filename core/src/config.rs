//! Client configuration.
//!
//! `ClientConfig` is plain serde data so deployments can keep it next to the
//! rest of their settings (JSON, TOML, env-derived maps). `ClientBuilder` is
//! the in-code equivalent and also accepts the logger, which is not data.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::client::Client;
use crate::error::EndpointError;
use crate::http::Transport;
use crate::logger::{Logger, NoopLogger};
use crate::response::{DEFAULT_OK_STATUSES, DEFAULT_TO_NONE_STATUSES};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Serializable client settings. Everything but `endpoint` has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub endpoint: String,
    #[serde(default = "default_ok_statuses")]
    pub ok_statuses: BTreeSet<u16>,
    #[serde(default = "default_to_none_statuses")]
    pub to_none_statuses: BTreeSet<u16>,
    #[serde(default = "default_true")]
    pub empty_to_none: bool,
    #[serde(default = "default_true")]
    pub close_slash: bool,
    /// Stored as `timeout_secs`, fractional seconds allowed.
    #[serde(
        rename = "timeout_secs",
        default = "default_timeout",
        serialize_with = "serialize_secs",
        deserialize_with = "deserialize_secs"
    )]
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ok_statuses: default_ok_statuses(),
            to_none_statuses: default_to_none_statuses(),
            empty_to_none: true,
            close_slash: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn default_ok_statuses() -> BTreeSet<u16> {
    DEFAULT_OK_STATUSES.into_iter().collect()
}

fn default_to_none_statuses() -> BTreeSet<u16> {
    DEFAULT_TO_NONE_STATUSES.into_iter().collect()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn serialize_secs<S: Serializer>(timeout: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(timeout.as_secs_f64())
}

fn deserialize_secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}

/// Fluent construction of a `Client`.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    config: ClientConfig,
    logger: Arc<dyn Logger>,
}

impl ClientBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(endpoint))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            logger: Arc::new(NoopLogger),
        }
    }

    pub fn ok_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.config.ok_statuses = statuses.into_iter().collect();
        self
    }

    pub fn to_none_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.config.to_none_statuses = statuses.into_iter().collect();
        self
    }

    pub fn empty_to_none(mut self, enabled: bool) -> Self {
        self.config.empty_to_none = enabled;
        self
    }

    pub fn close_slash(mut self, enabled: bool) -> Self {
        self.config.close_slash = enabled;
        self
    }

    /// Default per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn build<T: Transport>(self, transport: T) -> Result<Client<T>, EndpointError> {
        Client::with_logger(self.config, transport, self.logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"endpoint":"http://localhost:5000/api"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("http://localhost:5000/api"));
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.ok_statuses.contains(&200));
        assert!(config.ok_statuses.contains(&202));
        assert!(config.to_none_statuses.contains(&404));
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "endpoint": "http://svc",
                "ok_statuses": [200, 201],
                "to_none_statuses": [],
                "empty_to_none": false,
                "close_slash": false,
                "timeout_secs": 5
            }"#,
        )
        .unwrap();
        assert_eq!(config.ok_statuses, [200, 201].into_iter().collect());
        assert!(config.to_none_statuses.is_empty());
        assert!(!config.empty_to_none);
        assert!(!config.close_slash);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn fractional_timeout_is_kept() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"endpoint":"http://svc","timeout_secs":0.25}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(250));

        let encoded = serde_json::to_value(&config).unwrap();
        assert_eq!(encoded["timeout_secs"], serde_json::json!(0.25));
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let result: Result<ClientConfig, _> =
            serde_json::from_str(r#"{"endpoint":"http://svc","timeout_secs":-1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn builder_keeps_sub_second_timeout() {
        let builder = ClientBuilder::new("http://svc").timeout(Duration::from_millis(500));
        assert_eq!(builder.config.timeout(), Duration::from_millis(500));
    }

    #[test]
    fn endpoint_is_required() {
        let result: Result<ClientConfig, _> = serde_json::from_str(r#"{"close_slash":true}"#);
        assert!(result.is_err());
    }
}
