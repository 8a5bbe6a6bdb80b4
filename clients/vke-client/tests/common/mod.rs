// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Shared fixtures for the integration tests

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use vke_client::{AuthMode, Client, ClientConfig, Credentials};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const APP_KEY: &str = "test-app-key";
pub const APP_SECRET: &str = "test-app-secret";
pub const TOKEN: &str = "test-keystone-token";

/// What the mock time endpoint reports
pub const SERVER_TIME: i64 = 1_700_000_000;

/// Local clock used by test clients: 100 seconds ahead of the server
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(SERVER_TIME + 100, 0).expect("valid timestamp")
}

pub fn signed_auth() -> AuthMode {
    AuthMode::signed(Credentials::new(APP_KEY, APP_SECRET))
}

pub fn bearer_auth() -> AuthMode {
    AuthMode::bearer(TOKEN)
}

/// Client for `config` using the fixed local clock
pub fn client_for(config: ClientConfig) -> Client {
    Client::builder(config)
        .local_clock(fixed_now)
        .build()
        .expect("failed to build client")
}

pub fn signed_client(server: &MockServer) -> Client {
    client_for(ClientConfig::from_url(&server.uri(), signed_auth()).expect("valid config"))
}

pub fn bearer_client(server: &MockServer) -> Client {
    client_for(ClientConfig::from_url(&server.uri(), bearer_auth()).expect("valid config"))
}

/// Serve `GET /auth/time`, expecting it to be hit `times` times
pub async fn mount_time(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/auth/time"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SERVER_TIME.to_string()))
        .expect(times)
        .mount(server)
        .await;
}
