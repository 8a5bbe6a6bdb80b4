// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

// Allow expect/unwrap in tests - they provide clear panic messages on failure
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Per-call cancellation and deadlines

mod common;

use std::time::{Duration, Instant};

use serde_json::json;
use vke_client::{
    CallContext, CancellationToken, ClientConfig, FailoverPolicy, NodePoolApi,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SLOW: Duration = Duration::from_secs(10);

async fn mount_slow_pools(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodegroups"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]").set_delay(SLOW))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_call() {
    let server = MockServer::start().await;
    mount_slow_pools(&server).await;

    let client = common::bearer_client(&server);
    let token = CancellationToken::new();
    let ctx = CallContext::new().with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let started = Instant::now();
    let err = client.list_node_pools("c1", &ctx).await.unwrap_err();
    canceller.await.unwrap();

    assert!(err.is_cancelled(), "expected cancellation, got {err}");
    assert!(!err.is_timeout());
    assert!(started.elapsed() < SLOW);
}

#[tokio::test]
async fn test_already_cancelled_context_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = common::signed_client(&server);
    let token = CancellationToken::new();
    token.cancel();
    let ctx = CallContext::new().with_cancellation(token);

    let err = client.list_node_pools("c1", &ctx).await.unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_call_deadline() {
    let server = MockServer::start().await;
    mount_slow_pools(&server).await;

    let client = common::bearer_client(&server);
    let ctx = CallContext::new().with_timeout(Duration::from_millis(200));

    let err = client.list_node_pools("c1", &ctx).await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err}");
}

#[tokio::test]
async fn test_client_timeout_applies_to_calls_without_deadline() {
    let server = MockServer::start().await;
    mount_slow_pools(&server).await;

    let config = ClientConfig::from_url(&server.uri(), common::bearer_auth())
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let client = common::client_for(config);

    let err = client
        .list_node_pools("c1", &CallContext::new())
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_cancellation_while_waiting_for_clock() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/time"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(common::SERVER_TIME.to_string())
                .set_delay(SLOW),
        )
        .mount(&server)
        .await;

    let client = common::signed_client(&server);
    let ctx = CallContext::new().with_timeout(Duration::from_millis(200));

    let err = client.list_node_pools("c1", &ctx).await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_deadline_spans_failover_hop() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodegroups"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "tenant not found"})),
        )
        .mount(&primary)
        .await;
    mount_slow_pools(&fallback).await;

    let config = ClientConfig::from_url(&primary.uri(), common::bearer_auth())
        .unwrap()
        .with_failover(FailoverPolicy::new(&fallback.uri()).unwrap());
    let client = common::client_for(config);
    let ctx = CallContext::new().with_timeout(Duration::from_millis(300));

    let started = Instant::now();
    let err = client.list_node_pools("c1", &ctx).await.unwrap_err();

    // The fallback timed out, so the primary's error is what the caller sees.
    assert_eq!(err.api_error().map(|e| e.code), Some(404));
    assert!(started.elapsed() < SLOW);
}

#[tokio::test]
async fn test_clock_fetch_outlives_caller_that_gave_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/time"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(common::SERVER_TIME.to_string())
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodegroups"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::from_url(&server.uri(), common::signed_auth())
        .unwrap()
        .with_timeout(Duration::from_millis(300));
    let client = common::client_for(config);

    let impatient = CallContext::new().with_timeout(Duration::from_millis(20));
    let err = client.list_node_pools("c1", &impatient).await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err}");

    // Well past the client timeout the abandoned fetch would have carried
    tokio::time::sleep(Duration::from_millis(600)).await;

    let patient = CallContext::new().with_timeout(Duration::from_secs(5));
    let pools = client
        .list_node_pools("c1", &patient)
        .await
        .expect("measured offset should be reused");
    assert!(pools.is_empty());
}

#[tokio::test]
async fn test_timed_out_clock_fetch_is_retried_by_later_caller() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/time"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(common::SERVER_TIME.to_string())
                .set_delay(Duration::from_millis(400)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    common::mount_time(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodegroups"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::from_url(&server.uri(), common::signed_auth())
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let client = common::client_for(config);

    let impatient = CallContext::new().with_timeout(Duration::from_millis(20));
    assert!(client.list_node_pools("c1", &impatient).await.unwrap_err().is_timeout());

    // The first fetch times out on its own with nobody waiting
    tokio::time::sleep(Duration::from_millis(500)).await;

    let patient = CallContext::new().with_timeout(Duration::from_secs(5));
    client
        .list_node_pools("c1", &patient)
        .await
        .expect("a fresh fetch should succeed");
}

#[tokio::test]
async fn test_cancellation_during_failover_hop_is_reported() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodegroups"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "tenant not found"})),
        )
        .mount(&primary)
        .await;
    mount_slow_pools(&fallback).await;

    let config = ClientConfig::from_url(&primary.uri(), common::bearer_auth())
        .unwrap()
        .with_failover(FailoverPolicy::new(&fallback.uri()).unwrap());
    let client = common::client_for(config);

    let token = CancellationToken::new();
    let ctx = CallContext::new().with_cancellation(token.clone());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        token.cancel();
    });

    let started = Instant::now();
    let err = client.list_node_pools("c1", &ctx).await.unwrap_err();
    canceller.await.unwrap();

    assert!(err.is_cancelled(), "expected cancellation, got {err}");
    assert!(started.elapsed() < SLOW);
}
