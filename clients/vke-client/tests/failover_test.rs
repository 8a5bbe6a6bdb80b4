// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

// Allow expect/unwrap in tests - they provide clear panic messages on failure
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Regional failover: one retry against the fallback region

mod common;

use serde_json::json;
use url::Url;
use vke_client::{
    ApiError, AuthMode, CallContext, Client, ClientConfig, FailoverClassifier, FailoverPolicy,
    NodePoolApi,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tenant_not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "code": 404,
        "message": "Tenant not found in this region"
    }))
}

fn client_with_fallback(primary: &MockServer, fallback: &MockServer, auth: AuthMode) -> Client {
    let config = ClientConfig::from_url(&primary.uri(), auth)
        .unwrap()
        .with_failover(FailoverPolicy::new(&fallback.uri()).unwrap());
    common::client_for(config)
}

#[tokio::test]
async fn test_fallback_success_replaces_original_error() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodegroups"))
        .respond_with(tenant_not_found())
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodegroups"))
        .and(header("x-auth-token", common::TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"node_group_uuid": "np-ca", "node_group_name": "workers"}
        ])))
        .expect(1)
        .mount(&fallback)
        .await;

    let client = client_with_fallback(&primary, &fallback, common::bearer_auth());
    let pools = client
        .list_node_pools("c1", &CallContext::new())
        .await
        .expect("fallback region should answer");

    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].id, "np-ca");
}

#[tokio::test]
async fn test_fallback_failure_returns_original_error() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodepool/np1"))
        .respond_with(
            tenant_not_found().insert_header("X-VKE-QueryID", "EU.primary-query"),
        )
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodepool/np1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("fallback exploded"))
        .expect(1)
        .mount(&fallback)
        .await;

    let client = client_with_fallback(&primary, &fallback, common::bearer_auth());
    let err = client
        .get_node_pool("c1", "np1", &CallContext::new())
        .await
        .unwrap_err();

    let api = err.api_error().expect("expected the primary API error");
    assert_eq!(api.code, 404);
    assert_eq!(api.message, "Tenant not found in this region");
    assert_eq!(api.query_id.as_deref(), Some("EU.primary-query"));
}

#[tokio::test]
async fn test_failover_happens_at_most_once() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodegroups"))
        .respond_with(tenant_not_found())
        .expect(1)
        .mount(&primary)
        .await;
    // The fallback reports the same cross-region error; it must not hop again.
    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodegroups"))
        .respond_with(tenant_not_found())
        .expect(1)
        .mount(&fallback)
        .await;

    let client = client_with_fallback(&primary, &fallback, common::bearer_auth());
    let err = client
        .list_node_pools("c1", &CallContext::new())
        .await
        .unwrap_err();
    assert_eq!(err.api_error().map(|e| e.code), Some(404));
}

#[tokio::test]
async fn test_other_errors_do_not_fail_over() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodepool/np1"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "node pool not found"})),
        )
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fallback)
        .await;

    let client = client_with_fallback(&primary, &fallback, common::bearer_auth());
    let err = client
        .get_node_pool("c1", "np1", &CallContext::new())
        .await
        .unwrap_err();
    assert_eq!(
        err.api_error().map(|e| e.message.as_str()),
        Some("node pool not found")
    );
}

#[tokio::test]
async fn test_signed_fallback_measures_its_own_clock() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;

    common::mount_time(&primary, 1).await;
    common::mount_time(&fallback, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/cluster/c1/nodegroups/np1/nodes/n1"))
        .respond_with(tenant_not_found())
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/cluster/c1/nodegroups/np1/nodes/n1"))
        .and(header("x-vke-application", common::APP_KEY))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fallback)
        .await;

    let client = client_with_fallback(&primary, &fallback, common::signed_auth());
    client
        .remove_node("c1", "np1", "n1", &CallContext::new())
        .await
        .expect("fallback removal should succeed");
}

#[derive(Debug)]
struct AlwaysCrossRegion;

impl FailoverClassifier for AlwaysCrossRegion {
    fn is_cross_region(&self, _error: &ApiError, _url: &Url) -> bool {
        true
    }
}

#[tokio::test]
async fn test_custom_classifier() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/time"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(1)
        .mount(&primary)
        .await;
    common::mount_time(&fallback, 1).await;

    let config = ClientConfig::from_url(&primary.uri(), common::bearer_auth())
        .unwrap()
        .with_failover(
            FailoverPolicy::new(&fallback.uri())
                .unwrap()
                .with_classifier(AlwaysCrossRegion),
        );
    let client = common::client_for(config);

    let time = client.time(&CallContext::new()).await.unwrap();
    assert_eq!(time.timestamp(), common::SERVER_TIME);
}
