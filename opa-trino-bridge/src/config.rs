//! Configuration loading: a flat `opa.*` property map in, a typed
//! [`BridgeConfig`] out.

use std::collections::HashMap;
use std::time::Duration;

use opa_trino_bridge_sdk::BridgeError;
use url::Url;

const KEY_POLICY_URI: &str = "opa.policy.uri";
const KEY_BATCHED_URI: &str = "opa.policy.batched-uri";
const KEY_LOG_REQUESTS: &str = "opa.log-requests";
const KEY_LOG_RESPONSES: &str = "opa.log-responses";
const KEY_ALLOW_PERMISSION_MANAGEMENT: &str = "opa.allow-permission-management-operations";

const HTTP_CLIENT_PREFIX: &str = "opa.http-client.";
const KEY_HTTP_CONNECT_TIMEOUT: &str = "opa.http-client.connect-timeout";
const KEY_HTTP_REQUEST_TIMEOUT: &str = "opa.http-client.request-timeout";
const KEY_HTTP_CLIENT_CERTIFICATE: &str = "opa.http-client.client-certificate";

const KNOWN_KEYS: &[&str] = &[
    KEY_POLICY_URI,
    KEY_BATCHED_URI,
    KEY_LOG_REQUESTS,
    KEY_LOG_RESPONSES,
    KEY_ALLOW_PERMISSION_MANAGEMENT,
    KEY_HTTP_CONNECT_TIMEOUT,
    KEY_HTTP_REQUEST_TIMEOUT,
    KEY_HTTP_CLIENT_CERTIFICATE,
];

/// `opa.http-client.*` passthrough options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// `opa.http-client.connect-timeout`, parsed as a `humantime` duration.
    pub connect_timeout: Option<Duration>,
    /// `opa.http-client.request-timeout`, parsed as a `humantime` duration.
    pub request_timeout: Option<Duration>,
    /// `opa.http-client.client-certificate`, a filesystem path.
    pub client_certificate_path: Option<String>,
}

/// The bridge's full configuration, parsed once at factory construction
/// time.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// `opa.policy.uri`.
    pub policy_uri: Url,
    /// `opa.policy.batched-uri`, when set.
    pub batched_policy_uri: Option<Url>,
    /// `opa.log-requests`.
    pub log_requests: bool,
    /// `opa.log-responses`.
    pub log_responses: bool,
    /// `opa.allow-permission-management-operations`.
    pub allow_permission_management_operations: bool,
    /// `opa.http-client.*`.
    pub http_client: HttpClientConfig,
}

impl BridgeConfig {
    /// Parse a `BridgeConfig` from a flat property map.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if `opa.policy.uri` is missing, any
    /// known key fails to parse, or an unrecognized key is present outside
    /// the `opa.http-client.` passthrough prefix.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self, BridgeError> {
        for key in properties.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) && !key.starts_with(HTTP_CLIENT_PREFIX) {
                return Err(BridgeError::Config {
                    detail: format!("unknown configuration key {key}"),
                });
            }
        }

        let policy_uri = required_url(properties, KEY_POLICY_URI)?;
        let batched_policy_uri = optional_url(properties, KEY_BATCHED_URI)?;
        let log_requests = optional_bool(properties, KEY_LOG_REQUESTS)?.unwrap_or(false);
        let log_responses = optional_bool(properties, KEY_LOG_RESPONSES)?.unwrap_or(false);
        let allow_permission_management_operations =
            optional_bool(properties, KEY_ALLOW_PERMISSION_MANAGEMENT)?.unwrap_or(false);

        let http_client = HttpClientConfig {
            connect_timeout: optional_duration(properties, KEY_HTTP_CONNECT_TIMEOUT)?,
            request_timeout: optional_duration(properties, KEY_HTTP_REQUEST_TIMEOUT)?,
            client_certificate_path: properties.get(KEY_HTTP_CLIENT_CERTIFICATE).cloned(),
        };

        Ok(Self {
            policy_uri,
            batched_policy_uri,
            log_requests,
            log_responses,
            allow_permission_management_operations,
            http_client,
        })
    }
}

fn required_url(properties: &HashMap<String, String>, key: &str) -> Result<Url, BridgeError> {
    let raw = properties.get(key).ok_or_else(|| BridgeError::Config {
        detail: format!("missing required configuration key {key}"),
    })?;
    raw.parse().map_err(|source| BridgeError::Config {
        detail: format!("invalid URI for {key}: {source}"),
    })
}

fn optional_url(properties: &HashMap<String, String>, key: &str) -> Result<Option<Url>, BridgeError> {
    properties
        .get(key)
        .map(|raw| {
            raw.parse().map_err(|source| BridgeError::Config {
                detail: format!("invalid URI for {key}: {source}"),
            })
        })
        .transpose()
}

fn optional_bool(properties: &HashMap<String, String>, key: &str) -> Result<Option<bool>, BridgeError> {
    properties
        .get(key)
        .map(|raw| {
            raw.parse().map_err(|_source| BridgeError::Config {
                detail: format!("invalid boolean for {key}: {raw}"),
            })
        })
        .transpose()
}

fn optional_duration(properties: &HashMap<String, String>, key: &str) -> Result<Option<Duration>, BridgeError> {
    properties
        .get(key)
        .map(|raw| {
            humantime::parse_duration(raw).map_err(|source| BridgeError::Config {
                detail: format!("invalid duration for {key}: {source}"),
            })
        })
        .transpose()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn missing_policy_uri_is_config_error() {
        let err = BridgeConfig::from_properties(&HashMap::new()).unwrap_err();
        assert!(matches!(err, BridgeError::Config { .. }));
    }

    #[test]
    fn defaults_apply_when_optional_keys_absent() {
        let config =
            BridgeConfig::from_properties(&props(&[("opa.policy.uri", "https://pdp/v1/data/trino/allow")]))
                .unwrap();
        assert!(config.batched_policy_uri.is_none());
        assert!(!config.log_requests);
        assert!(!config.log_responses);
        assert!(!config.allow_permission_management_operations);
    }

    #[test]
    fn unknown_key_outside_http_client_prefix_is_rejected() {
        let err = BridgeConfig::from_properties(&props(&[
            ("opa.policy.uri", "https://pdp/v1/data/trino/allow"),
            ("opa.unknown-key", "value"),
        ]))
        .unwrap_err();
        assert!(matches!(err, BridgeError::Config { .. }));
    }

    #[test]
    fn http_client_timeouts_parse_as_humantime_durations() {
        let config = BridgeConfig::from_properties(&props(&[
            ("opa.policy.uri", "https://pdp/v1/data/trino/allow"),
            ("opa.http-client.connect-timeout", "5s"),
            ("opa.http-client.request-timeout", "30s"),
        ]))
        .unwrap();
        assert_eq!(config.http_client.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.http_client.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn batched_uri_enables_when_present() {
        let config = BridgeConfig::from_properties(&props(&[
            ("opa.policy.uri", "https://pdp/v1/data/trino/allow"),
            ("opa.policy.batched-uri", "https://pdp/v1/data/trino/batch"),
        ]))
        .unwrap();
        assert!(config.batched_policy_uri.is_some());
    }
}
