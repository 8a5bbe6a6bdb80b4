// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Per-call request description and call context

use std::future::Future;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::TransportError;

/// Everything needed to issue one API call
///
/// The body is serialized once, when it is attached, so the signer and the
/// wire see the same bytes.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    headers: HeaderMap,
    needs_auth: bool,
}

impl RequestDescriptor {
    /// Create an authenticated request for `path` (relative to the endpoint)
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            needs_auth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Serialize `body` as the JSON request body
    ///
    /// # Errors
    /// Returns an error if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, TransportError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| TransportError::InvalidRequest(format!("cannot serialize body: {e}")))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Add a header; caller headers override the client's defaults
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Mark the request as not requiring authentication
    pub fn unauthenticated(mut self) -> Self {
        self.needs_auth = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn needs_auth(&self) -> bool {
        self.needs_auth
    }

    /// Absolute URL of this request against `endpoint`
    ///
    /// The path is appended to the endpoint's own path, so an endpoint with
    /// a base path such as `/v1` is preserved.
    ///
    /// # Errors
    /// Returns an error if the combined URL does not parse.
    pub fn url(&self, endpoint: &Url) -> Result<Url, TransportError> {
        let base = endpoint_base(endpoint);
        let raw = format!("{}{}", base, self.path);
        let mut url = Url::parse(&raw)
            .map_err(|e| TransportError::InvalidRequest(format!("invalid URL '{raw}': {e}")))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

/// Endpoint URL as a string without its trailing slash
pub(crate) fn endpoint_base(endpoint: &Url) -> &str {
    endpoint.as_str().trim_end_matches('/')
}

/// Cancellation and deadline for one logical call
///
/// A context is carried through every suspension point of a call,
/// including the clock fetch and a failover hop. Cloning it shares the
/// cancellation token and the absolute deadline.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Set the deadline to `timeout` from now
    ///
    /// A timeout too large to represent as an instant leaves the call
    /// without a deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self.timeout = Some(timeout);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// This context, given a deadline of `timeout` from now if it has none
    pub(crate) fn or_timeout(&self, timeout: Duration) -> Self {
        match self.deadline {
            Some(_) => self.clone(),
            None => self.clone().with_timeout(timeout),
        }
    }

    /// Drive `fut` until it completes, the token fires, or the deadline
    /// passes; in the latter two cases `fut` is dropped
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, TransportError> {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(TransportError::Cancelled),
            _ = deadline => Err(TransportError::TimedOut(self.timeout.unwrap_or_default())),
            output = fut => Ok(output),
        }
    }
}
