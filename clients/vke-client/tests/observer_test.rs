// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

// Allow expect/unwrap in tests - they provide clear panic messages on failure
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Request observers see every exchange without changing it

mod common;

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::json;
use vke_client::{
    CallContext, Client, ClientConfig, NodePoolApi, RawResponse, RequestObserver, TracingObserver,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Recorder {
    exchanges: Mutex<Vec<String>>,
}

impl Recorder {
    fn exchanges(&self) -> Vec<String> {
        self.exchanges.lock().unwrap().clone()
    }
}

impl RequestObserver for Recorder {
    fn on_request(&self, request: &reqwest::Request) {
        self.exchanges
            .lock()
            .unwrap()
            .push(format!("> {} {}", request.method(), request.url().path()));
    }

    fn on_response(&self, response: &RawResponse) {
        self.exchanges
            .lock()
            .unwrap()
            .push(format!("< {}", response.status.as_u16()));
    }
}

async fn mount_api(server: &MockServer) {
    common::mount_time(server, 2).await;
    Mock::given(method("GET"))
        .and(path("/cluster/c1/nodegroups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"node_group_uuid": "np1", "node_group_name": "workers", "node_group_max_size": 4}
        ])))
        .expect(2)
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/cluster/c1/nodegroups/np1/nodes/n1"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "draining"})))
        .expect(2)
        .mount(server)
        .await;
}

fn observed_client(server: &MockServer, observer: Arc<dyn RequestObserver>) -> Client {
    let config = ClientConfig::from_url(&server.uri(), common::signed_auth()).unwrap();
    Client::builder(config)
        .local_clock(common::fixed_now)
        .observer(observer)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_observer_sees_each_exchange_once() {
    let server = MockServer::start().await;
    mount_api(&server).await;

    let recorder = Arc::new(Recorder::default());
    let observed = observed_client(&server, recorder.clone());
    let plain = common::signed_client(&server);
    let ctx = CallContext::new();

    let with_observer = observed.list_node_pools("c1", &ctx).await.unwrap();
    let without_observer = plain.list_node_pools("c1", &ctx).await.unwrap();
    assert_eq!(with_observer, without_observer);

    let observed_err = observed.remove_node("c1", "np1", "n1", &ctx).await.unwrap_err();
    let plain_err = plain.remove_node("c1", "np1", "n1", &ctx).await.unwrap_err();
    assert_eq!(observed_err.to_string(), plain_err.to_string());

    assert_eq!(
        recorder.exchanges(),
        vec![
            "> GET /auth/time",
            "< 200",
            "> GET /cluster/c1/nodegroups",
            "< 200",
            "> DELETE /cluster/c1/nodegroups/np1/nodes/n1",
            "< 409",
        ]
    );
}

#[tokio::test]
async fn test_tracing_observer_leaves_results_unchanged() {
    let server = MockServer::start().await;
    mount_api(&server).await;

    let observed = observed_client(&server, Arc::new(TracingObserver));
    let plain = common::signed_client(&server);
    let ctx = CallContext::new();

    assert_eq!(
        observed.list_node_pools("c1", &ctx).await.unwrap(),
        plain.list_node_pools("c1", &ctx).await.unwrap()
    );
    assert_eq!(
        observed.remove_node("c1", "np1", "n1", &ctx).await.unwrap_err().to_string(),
        plain.remove_node("c1", "np1", "n1", &ctx).await.unwrap_err().to_string()
    );
}
