// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! HTTP exchange: request assembly and cancellable execution

use std::fmt;
use std::sync::{Arc, Once};

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};
use url::Url;

use crate::error::{Error, TransportError};
use crate::request::{CallContext, RequestDescriptor};

/// Response header carrying the server's correlation id
pub const QUERY_ID_HEADER: &str = "x-vke-queryid";

const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";
const JSON_ACCEPT: &str = "application/json";

static CRYPTO_PROVIDER: Once = Once::new();

/// Hook notified of every exchange
///
/// Observers must not alter the exchange; the dispatcher behaves the same
/// with or without one.
pub trait RequestObserver: Send + Sync {
    fn on_request(&self, request: &reqwest::Request);
    fn on_response(&self, response: &RawResponse);
}

/// Observer that logs each exchange at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, request: &reqwest::Request) {
        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            body_bytes = request.body().and_then(|b| b.as_bytes()).map_or(0, <[u8]>::len),
            "sending request"
        );
    }

    fn on_response(&self, response: &RawResponse) {
        tracing::debug!(
            status = response.status.as_u16(),
            url = %response.url,
            body_bytes = response.body.len(),
            "received response"
        );
    }
}

/// A fully read HTTP response
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    /// Correlation id supplied by the server, if any
    pub fn query_id(&self) -> Option<String> {
        self.headers
            .get(QUERY_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// Builds and executes HTTP requests
#[derive(Clone)]
pub struct Dispatcher {
    http: reqwest::Client,
    observer: Option<Arc<dyn RequestObserver>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher with a default HTTP client
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, Error> {
        install_crypto_provider();
        let http = reqwest::Client::builder()
            .user_agent(concat!("vke-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http_client(http))
    }

    /// Create a dispatcher around an existing HTTP client
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self {
            http,
            observer: None,
        }
    }

    /// Attach an observer
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Assemble the outgoing request
    ///
    /// Header precedence, lowest first: content type and accept, then
    /// authentication headers, then the descriptor's own headers.
    pub fn build_request(
        &self,
        url: Url,
        descriptor: &RequestDescriptor,
        auth: HeaderMap,
    ) -> reqwest::Request {
        let mut request = reqwest::Request::new(descriptor.method().clone(), url);
        let headers = request.headers_mut();

        if descriptor.body().is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_ACCEPT));

        for (name, value) in auth.iter() {
            headers.insert(name.clone(), value.clone());
        }

        let caller = descriptor.headers();
        for name in caller.keys() {
            headers.remove(name);
        }
        for (name, value) in caller.iter() {
            headers.append(name.clone(), value.clone());
        }

        if let Some(body) = descriptor.body() {
            *request.body_mut() = Some(body.to_vec().into());
        }
        request
    }

    /// Send `request` and read the whole response body
    ///
    /// The send and the body read run under `ctx`; cancellation or the
    /// deadline drops the in-flight exchange.
    ///
    /// # Errors
    /// Returns a transport error on cancellation, timeout, or network
    /// failure. Non-success statuses are not errors at this layer.
    pub async fn execute(
        &self,
        request: reqwest::Request,
        ctx: &CallContext,
    ) -> Result<RawResponse, Error> {
        if let Some(observer) = &self.observer {
            observer.on_request(&request);
        }

        let url = request.url().clone();
        let http = self.http.clone();
        let exchange = async move {
            let response = http.execute(request).await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(RawResponse {
                url,
                status,
                headers,
                body,
            })
        };

        let response = ctx.run(exchange).await?.map_err(TransportError::from)?;

        if let Some(observer) = &self.observer {
            observer.on_response(&response);
        }
        Ok(response)
    }
}

fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Fails only when another provider is already installed.
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            tracing::debug!("rustls crypto provider already installed");
        }
    });
}
