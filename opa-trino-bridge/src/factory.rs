//! The plugin entry point (C6): builds the HTTP client, picks C3 or C4,
//! wraps with the permission-management gate.

use std::collections::HashMap;
use std::sync::Arc;

use opa_trino_bridge_sdk::{AccessControl, BridgeError, DecisionClient};

use crate::authorizer::{BatchAuthorizer, PermissionManagementGate, SingleDecisionAuthorizer};
use crate::config::BridgeConfig;

/// Marker type exposing the single entry point a host plugin loader calls
/// to construct a bridge instance from its configuration properties.
#[derive(Debug, Default, Clone, Copy)]
pub struct BridgeFactory;

impl BridgeFactory {
    /// Build the bridge's [`AccessControl`] implementation from a flat
    /// `opa.*` property map.
    ///
    /// Picks [`SingleDecisionAuthorizer`] when no batch URI is configured,
    /// [`BatchAuthorizer`] otherwise, and always wraps the result with
    /// [`PermissionManagementGate`].
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if `properties` is missing the
    /// required policy URI or carries an invalid value.
    pub fn create(properties: &HashMap<String, String>) -> Result<Arc<dyn AccessControl>, BridgeError> {
        let config = BridgeConfig::from_properties(properties)?;
        let http = build_http_client(&config)?;
        let client = DecisionClient::new(http);

        let single = SingleDecisionAuthorizer::new(client.clone(), config.policy_uri.clone());

        let access_control: Arc<dyn AccessControl> = match config.batched_policy_uri {
            Some(batch_uri) => Arc::new(PermissionManagementGate::new(
                BatchAuthorizer::new(single, client, batch_uri),
                config.allow_permission_management_operations,
            )),
            None => Arc::new(PermissionManagementGate::new(single, config.allow_permission_management_operations)),
        };

        Ok(access_control)
    }
}

fn build_http_client(config: &BridgeConfig) -> Result<reqwest::Client, BridgeError> {
    let mut builder = reqwest::Client::builder();

    if let Some(connect_timeout) = config.http_client.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    if let Some(request_timeout) = config.http_client.request_timeout {
        builder = builder.timeout(request_timeout);
    }
    if let Some(path) = &config.http_client.client_certificate_path {
        let bytes = std::fs::read(path).map_err(|source| BridgeError::Config {
            detail: format!("failed to read client certificate at {path}: {source}"),
        })?;
        let identity = reqwest::Identity::from_pem(&bytes).map_err(|source| BridgeError::Config {
            detail: format!("invalid client certificate at {path}: {source}"),
        })?;
        builder = builder.identity(identity);
    }

    builder.build().map_err(|source| BridgeError::Config {
        detail: format!("failed to build HTTP client: {source}"),
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn missing_policy_uri_is_fatal() {
        let err = BridgeFactory::create(&HashMap::new()).unwrap_err();
        assert!(matches!(err, BridgeError::Config { .. }));
    }

    #[test]
    fn single_decision_uri_alone_builds_successfully() {
        let result = BridgeFactory::create(&props(&[("opa.policy.uri", "https://pdp/v1/data/trino/allow")]));
        assert!(result.is_ok());
    }

    #[test]
    fn batch_uri_present_builds_successfully() {
        let result = BridgeFactory::create(&props(&[
            ("opa.policy.uri", "https://pdp/v1/data/trino/allow"),
            ("opa.policy.batched-uri", "https://pdp/v1/data/trino/batch"),
        ]));
        assert!(result.is_ok());
    }

    #[test]
    fn invalid_client_certificate_path_is_fatal() {
        let result = BridgeFactory::create(&props(&[
            ("opa.policy.uri", "https://pdp/v1/data/trino/allow"),
            ("opa.http-client.client-certificate", "/nonexistent/cert.pem"),
        ]));
        assert!(matches!(result, Err(BridgeError::Config { .. })));
    }
}
