// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! The VKE API client
//!
//! A call goes through: endpoint URL, authentication headers (which may
//! suspend on the clock fetch), dispatch, and response decoding. An API error
//! recognized by the failover policy re-issues the whole call once through a
//! client bound to the fallback region.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use http::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;
use vke_auth::{ClockSync, TimeSource};

use crate::config::ClientConfig;
use crate::decode::{decode, discard};
use crate::dispatch::{Dispatcher, RawResponse, RequestObserver};
use crate::error::{DecodeError, Error, Result};
use crate::request::{CallContext, RequestDescriptor};

/// Path of the unauthenticated server time endpoint
pub const TIME_PATH: &str = "/auth/time";

/// Handle to one VKE endpoint
///
/// Cloning is cheap; clones share the configuration, the HTTP connection
/// pool, and the memoized clock offset.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    dispatcher: Dispatcher,
    clock: Arc<ClockSync<TimeEndpoint>>,
    local_clock: fn() -> DateTime<Utc>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .field("time_delta", &self.clock.cached())
            .finish()
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    config: ClientConfig,
    http: Option<reqwest::Client>,
    observer: Option<Arc<dyn RequestObserver>>,
    local_clock: fn() -> DateTime<Utc>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: None,
            observer: None,
            local_clock: Utc::now,
        }
    }

    /// Use an existing HTTP client instead of building one
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Observe every request and response
    pub fn observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Read local time from `now` instead of the system clock
    pub fn local_clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.local_clock = now;
        self
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn build(self) -> Result<Client> {
        let mut dispatcher = match self.http {
            Some(http) => Dispatcher::with_http_client(http),
            None => Dispatcher::new()?,
        };
        if let Some(observer) = self.observer {
            dispatcher = dispatcher.with_observer(observer);
        }
        Ok(Client::from_parts(self.config, dispatcher, self.local_clock))
    }
}

impl Client {
    /// Create a client with a default HTTP stack
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        ClientBuilder::new(config).build()
    }

    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    fn from_parts(
        config: ClientConfig,
        dispatcher: Dispatcher,
        local_clock: fn() -> DateTime<Utc>,
    ) -> Self {
        let source = TimeEndpoint {
            endpoint: config.endpoint().clone(),
            timeout: config.timeout(),
            dispatcher: dispatcher.clone(),
        };
        Self {
            config: Arc::new(config),
            dispatcher,
            clock: Arc::new(ClockSync::with_local_clock(source, local_clock)),
            local_clock,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn clock(&self) -> &ClockSync<TimeEndpoint> {
        &self.clock
    }

    /// Check that the endpoint answers, without authenticating
    ///
    /// # Errors
    /// Returns the error of the time call.
    pub async fn ping(&self, ctx: &CallContext) -> Result<()> {
        self.time(ctx).await.map(|_| ())
    }

    /// Current server time
    ///
    /// # Errors
    /// Returns a transport or API error, or a decode error if the body is
    /// not a Unix timestamp.
    pub async fn time(&self, ctx: &CallContext) -> Result<DateTime<Utc>> {
        let request = RequestDescriptor::get(TIME_PATH).unauthenticated();
        let secs = self.call::<i64>(request, ctx).await?;
        server_time(secs, self.config.endpoint())
    }

    /// Offset between the local clock and the server clock
    ///
    /// Measured on first use and memoized; concurrent first callers share
    /// one measurement. The wait is bounded by `ctx`, the measurement itself
    /// by the client timeout.
    ///
    /// # Errors
    /// Returns the measurement error, or a transport error if `ctx` is
    /// cancelled or expires first.
    pub async fn time_delta(&self, ctx: &CallContext) -> Result<TimeDelta> {
        let ctx = ctx.or_timeout(self.config.timeout());
        ctx.run(self.clock.offset()).await?
    }

    /// Forget the memoized offset; the next signed call measures again
    pub fn invalidate_time_delta(&self) {
        self.clock.invalidate();
    }

    /// Issue `request` and decode the response into `T`
    ///
    /// Returns `Ok(None)` when the success body is empty.
    ///
    /// # Errors
    /// Returns configuration, transport, API, or decode errors.
    pub async fn call<T>(&self, request: RequestDescriptor, ctx: &CallContext) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.call_with(&request, ctx, decode::<T>).await
    }

    /// Issue `request` and ignore the success body
    ///
    /// # Errors
    /// Returns configuration, transport, or API errors.
    pub async fn call_discard(&self, request: RequestDescriptor, ctx: &CallContext) -> Result<()> {
        self.call_with(&request, ctx, discard).await
    }

    pub async fn get<T>(&self, path: &str, ctx: &CallContext) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.call(RequestDescriptor::get(path), ctx).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B, ctx: &CallContext) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
        B: Serialize + ?Sized,
    {
        self.call(RequestDescriptor::post(path).json(body)?, ctx).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B, ctx: &CallContext) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
        B: Serialize + ?Sized,
    {
        self.call(RequestDescriptor::put(path).json(body)?, ctx).await
    }

    pub async fn delete<T>(&self, path: &str, ctx: &CallContext) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.call(RequestDescriptor::delete(path), ctx).await
    }

    async fn call_with<T, D>(
        &self,
        request: &RequestDescriptor,
        ctx: &CallContext,
        decode: D,
    ) -> Result<T>
    where
        T: Send,
        D: Fn(RawResponse) -> Result<T> + Copy + Send + Sync,
    {
        let ctx = ctx.or_timeout(self.config.timeout());
        let url = request.url(self.config.endpoint())?;

        let error = match self.call_once(request, &url, &ctx, decode).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let Some(policy) = self.config.failover() else {
            return Err(error);
        };
        let Some(api_error) = error.api_error() else {
            return Err(error);
        };
        if !policy.should_fail_over(api_error, &url) {
            return Err(error);
        }

        warn!(
            url = %url,
            fallback = %policy.endpoint(),
            error = %api_error,
            "tenant not found in this region, retrying against fallback endpoint"
        );
        let fallback = self.fallback_client(policy.endpoint().clone());
        let outcome = match request.url(fallback.config.endpoint()) {
            Ok(fallback_url) => fallback.call_once(request, &fallback_url, &ctx, decode).await,
            Err(e) => Err(e.into()),
        };
        match outcome {
            Ok(value) => Ok(value),
            Err(fallback_error) if fallback_error.is_cancelled() => Err(fallback_error),
            Err(fallback_error) => {
                warn!(
                    fallback = %policy.endpoint(),
                    error = %fallback_error,
                    "fallback endpoint failed, returning original error"
                );
                Err(error)
            }
        }
    }

    async fn call_once<T, D>(
        &self,
        request: &RequestDescriptor,
        url: &Url,
        ctx: &CallContext,
        decode: D,
    ) -> Result<T>
    where
        D: Fn(RawResponse) -> Result<T>,
    {
        let auth = self.auth_headers(request, url, ctx).await?;
        let http = self.dispatcher.build_request(url.clone(), request, auth);
        debug!(method = %request.method(), url = %url, "calling VKE API");
        let response = self.dispatcher.execute(http, ctx).await?;
        decode(response)
    }

    /// Client for the fallback region: same credentials and transport, a
    /// fresh clock offset, no failover of its own
    fn fallback_client(&self, endpoint: Url) -> Client {
        Client::from_parts(
            self.config.for_fallback(endpoint),
            self.dispatcher.clone(),
            self.local_clock,
        )
    }
}

/// Server clock read from `GET /auth/time`
pub(crate) struct TimeEndpoint {
    endpoint: Url,
    timeout: Duration,
    dispatcher: Dispatcher,
}

#[async_trait]
impl TimeSource for TimeEndpoint {
    type Error = Error;

    async fn server_time(&self) -> Result<DateTime<Utc>> {
        let request = RequestDescriptor::get(TIME_PATH).unauthenticated();
        let url = request.url(&self.endpoint)?;
        let ctx = CallContext::new().with_timeout(self.timeout);

        debug!(url = %url, "fetching server time");
        let http = self
            .dispatcher
            .build_request(url, &request, HeaderMap::new());
        let response = self.dispatcher.execute(http, &ctx).await?;
        server_time(decode::<i64>(response)?, &self.endpoint)
    }
}

fn server_time(secs: Option<i64>, endpoint: &Url) -> Result<DateTime<Utc>> {
    let secs = secs.ok_or_else(|| DecodeError::EmptyBody(format!("{endpoint} {TIME_PATH}")))?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| Error::from(DecodeError::InvalidTime(secs)))
}
