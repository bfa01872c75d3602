//! The HTTP transport shared by the single-decision and batch authorizers.

use http::StatusCode;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::action::InputDocument;
use crate::decision::{BatchDecision, SingleDecision};
use crate::error::BridgeError;
use crate::operation::Operation;

/// Posts input documents to a policy decision point and parses its verdict.
///
/// Holds only a [`reqwest::Client`], which is itself a handle around a
/// pooled connection manager; cloning a [`DecisionClient`] is cheap and the
/// clone shares the same connection pool.
#[derive(Debug, Clone)]
pub struct DecisionClient {
    http: Client,
}

impl DecisionClient {
    /// Wrap an already-configured [`reqwest::Client`].
    #[must_use]
    pub const fn new(http: Client) -> Self {
        Self { http }
    }

    /// Evaluate a single-decision input document against `policy_uri`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::SerializeFailed`] if `document` cannot be
    /// serialized, [`BridgeError::QueryFailed`] on transport failure,
    /// [`BridgeError::PolicyNotFound`] on HTTP 404,
    /// [`BridgeError::PdpServerError`] on any other non-2xx status, and
    /// [`BridgeError::DeserializeFailed`] if the response body is not a
    /// valid decision.
    pub async fn decide_single(
        &self,
        policy_uri: &Url,
        document: &InputDocument,
    ) -> Result<SingleDecision, BridgeError> {
        let operation = document.action().operation;
        tracing::debug!(%operation, uri = %policy_uri, "posting single-decision input document");
        self.post(policy_uri, operation, document).await
    }

    /// Evaluate a batch filter input document against `batch_policy_uri`.
    ///
    /// Same error behavior as [`DecisionClient::decide_single`].
    ///
    /// # Errors
    ///
    /// See [`DecisionClient::decide_single`].
    pub async fn decide_batch(
        &self,
        batch_policy_uri: &Url,
        document: &InputDocument,
    ) -> Result<BatchDecision, BridgeError> {
        let operation = document.action().operation;
        tracing::debug!(%operation, uri = %batch_policy_uri, "posting batch-decision input document");
        self.post(batch_policy_uri, operation, document).await
    }

    async fn post<T>(
        &self,
        uri: &Url,
        operation: Operation,
        document: &InputDocument,
    ) -> Result<T, BridgeError>
    where
        T: DeserializeOwned,
    {
        let body =
            serde_json::to_vec(document).map_err(|source| BridgeError::SerializeFailed { operation, source })?;

        let response = self
            .http
            .post(uri.clone())
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|source| BridgeError::QueryFailed { operation, source })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::warn!(%operation, uri = %uri, "policy not found at configured uri");
            return Err(BridgeError::PolicyNotFound { operation });
        }
        if !status.is_success() {
            tracing::warn!(%operation, uri = %uri, %status, "policy decision point returned an error status");
            return Err(BridgeError::PdpServerError {
                operation,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| BridgeError::QueryFailed { operation, source })?;

        serde_json::from_slice(&bytes).map_err(|source| BridgeError::DeserializeFailed { operation, source })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use httpmock::MockServer;

    use super::*;
    use crate::action::Action;
    use crate::identity::{FullIdentity, QueryContext};
    use crate::resource::CatalogResource;
    use crate::Resource;

    fn sample_document() -> InputDocument {
        let context = QueryContext::new(FullIdentity::new("alice", vec![]));
        let action = Action::new(
            Operation::AccessCatalog,
            Some(Resource::Catalog(CatalogResource {
                name: "cat".to_owned(),
            })),
        );
        InputDocument::new(context, action)
    }

    #[tokio::test]
    async fn decide_single_parses_true_result() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/v1/data/trino/allow");
            then.status(200).json_body(serde_json::json!({"result": true}));
        });
        let client = DecisionClient::new(Client::new());
        let uri: Url = server.url("/v1/data/trino/allow").parse().unwrap();

        let decision = client.decide_single(&uri, &sample_document()).await.unwrap();

        mock.assert();
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn decide_single_maps_404_to_policy_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(404);
        });
        let client = DecisionClient::new(Client::new());
        let uri: Url = server.url("/v1/data/trino/allow").parse().unwrap();

        let err = client.decide_single(&uri, &sample_document()).await.unwrap_err();

        assert!(matches!(err, BridgeError::PolicyNotFound { .. }));
    }

    #[tokio::test]
    async fn decide_single_maps_server_error_to_pdp_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(503);
        });
        let client = DecisionClient::new(Client::new());
        let uri: Url = server.url("/v1/data/trino/allow").parse().unwrap();

        let err = client.decide_single(&uri, &sample_document()).await.unwrap_err();

        assert!(matches!(err, BridgeError::PdpServerError { status: 503, .. }));
    }

    #[tokio::test]
    async fn decide_batch_parses_allowed_indices() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/v1/data/trino/batch");
            then.status(200).json_body(serde_json::json!({"result": [0, 1]}));
        });
        let client = DecisionClient::new(Client::new());
        let uri: Url = server.url("/v1/data/trino/batch").parse().unwrap();
        let document = InputDocument::new(
            QueryContext::new(FullIdentity::new("alice", vec![])),
            Action::filter(
                Operation::FilterCatalogs,
                vec![
                    Resource::Catalog(CatalogResource { name: "a".to_owned() }),
                    Resource::Catalog(CatalogResource { name: "b".to_owned() }),
                ],
            ),
        );

        let decision = client.decide_batch(&uri, &document).await.unwrap();

        assert_eq!(decision.allowed_indices(), &[0, 1]);
    }

    #[tokio::test]
    async fn malformed_response_body_maps_to_deserialize_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(200).body("not json");
        });
        let client = DecisionClient::new(Client::new());
        let uri: Url = server.url("/v1/data/trino/allow").parse().unwrap();

        let err = client.decide_single(&uri, &sample_document()).await.unwrap_err();

        assert!(matches!(err, BridgeError::DeserializeFailed { .. }));
    }
}
