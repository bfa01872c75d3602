//! End-to-end tests exercising the factory, the gate and the two
//! authorizer strategies together against a mock policy decision point.

use std::collections::HashMap;

use httpmock::MockServer;
use opa_trino_bridge::{AccessControl, BridgeError, FullIdentity, QueryContext};

fn context() -> QueryContext {
    QueryContext::new(FullIdentity::new("alice", vec!["engineers".to_owned()]))
}

fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

#[tokio::test]
async fn factory_built_single_decision_bridge_round_trips_an_allow() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::POST);
        then.status(200).json_body(serde_json::json!({"result": true}));
    });

    let bridge = opa_trino_bridge::BridgeFactory::create(&props(&[(
        "opa.policy.uri",
        &server.url("/v1/data/trino/allow"),
    )]))
    .unwrap();

    assert!(bridge.check_can_execute_query(&context()).await.is_ok());
}

#[tokio::test]
async fn factory_built_batch_bridge_filters_via_batch_endpoint() {
    let server = MockServer::start();
    let single_mock = server.mock(|when, then| {
        when.method(httpmock::Method::POST).path("/v1/data/trino/allow");
        then.status(200).json_body(serde_json::json!({"result": true}));
    });
    let batch_mock = server.mock(|when, then| {
        when.method(httpmock::Method::POST).path("/v1/data/trino/batch");
        then.status(200).json_body(serde_json::json!({"result": [0]}));
    });

    let bridge = opa_trino_bridge::BridgeFactory::create(&props(&[
        ("opa.policy.uri", &server.url("/v1/data/trino/allow")),
        ("opa.policy.batched-uri", &server.url("/v1/data/trino/batch")),
    ]))
    .unwrap();

    let allowed = bridge
        .filter_catalogs(&context(), vec!["production".to_owned(), "scratch".to_owned()])
        .await
        .unwrap();

    assert_eq!(allowed.len(), 1);
    batch_mock.assert_hits(1);
    single_mock.assert_hits(0);
}

#[tokio::test]
async fn permission_management_gate_blocks_role_creation_without_contacting_pdp() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::POST);
        then.status(200).json_body(serde_json::json!({"result": true}));
    });

    let bridge = opa_trino_bridge::BridgeFactory::create(&props(&[(
        "opa.policy.uri",
        &server.url("/v1/data/trino/allow"),
    )]))
    .unwrap();

    let err = bridge.check_can_create_role(&context(), "admin", None).await.unwrap_err();

    assert!(matches!(err, BridgeError::AccessDenied { .. }));
    mock.assert_hits(0);
}

#[tokio::test]
async fn permission_management_gate_allows_role_creation_when_flag_is_set() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::POST);
        then.status(200).json_body(serde_json::json!({"result": true}));
    });

    let bridge = opa_trino_bridge::BridgeFactory::create(&props(&[
        ("opa.policy.uri", &server.url("/v1/data/trino/allow")),
        ("opa.allow-permission-management-operations", "true"),
    ]))
    .unwrap();

    assert!(bridge.check_can_create_role(&context(), "admin", None).await.is_ok());
    mock.assert_hits(0);
}

#[tokio::test]
async fn role_inspection_operations_are_always_allowed() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::POST);
        then.status(200).json_body(serde_json::json!({"result": false}));
    });

    let bridge = opa_trino_bridge::BridgeFactory::create(&props(&[(
        "opa.policy.uri",
        &server.url("/v1/data/trino/allow"),
    )]))
    .unwrap();

    assert!(bridge.check_can_show_roles(&context()).await.is_ok());
    assert!(bridge.check_can_show_current_roles(&context()).await.is_ok());
    assert!(bridge.check_can_show_role_grants(&context()).await.is_ok());
    mock.assert_hits(0);
}

#[tokio::test]
async fn policy_not_found_maps_to_specific_error_kind() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::POST);
        then.status(404);
    });

    let bridge = opa_trino_bridge::BridgeFactory::create(&props(&[(
        "opa.policy.uri",
        &server.url("/v1/data/trino/allow"),
    )]))
    .unwrap();

    let err = bridge.check_can_execute_query(&context()).await.unwrap_err();
    assert!(matches!(err, BridgeError::PolicyNotFound { .. }));
}

#[tokio::test]
async fn pdp_server_error_preserves_status_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::POST);
        then.status(500);
    });

    let bridge = opa_trino_bridge::BridgeFactory::create(&props(&[(
        "opa.policy.uri",
        &server.url("/v1/data/trino/allow"),
    )]))
    .unwrap();

    let err = bridge.check_can_execute_query(&context()).await.unwrap_err();
    assert!(matches!(err, BridgeError::PdpServerError { status: 500, .. }));
}
