// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Authentication headers for outgoing requests
//!
//! Signed mode needs the server clock offset, so producing the headers may
//! suspend on the clock fetch; it does so under the call's own context.

use http::HeaderMap;
use url::Url;
use vke_auth::{AuthMode, SignedRequest};

use crate::client::Client;
use crate::error::{ConfigError, Result};
use crate::request::{CallContext, RequestDescriptor, endpoint_base};

impl Client {
    /// Headers authenticating `request`, about to be sent to `url`
    ///
    /// # Errors
    /// Returns [`ConfigError::AuthenticationRequired`] when the request needs
    /// authentication and the client has none, or the clock fetch error in
    /// signed mode.
    pub(crate) async fn auth_headers(
        &self,
        request: &RequestDescriptor,
        url: &Url,
        ctx: &CallContext,
    ) -> Result<HeaderMap> {
        if !request.needs_auth() {
            return Ok(HeaderMap::new());
        }

        let mode = self.config().auth();
        match mode {
            AuthMode::Unauthenticated => {
                Err(ConfigError::AuthenticationRequired(request.path().to_string()).into())
            }
            AuthMode::Bearer(_) => Ok(vke_auth::auth_headers(mode, None)?),
            AuthMode::Signed(_) => {
                let offset = self.time_delta(ctx).await?;
                let timestamp = self.clock().corrected_now(offset).timestamp();

                let endpoint = endpoint_base(self.config().endpoint());
                let path_and_query = signing_path(url, endpoint);
                let signed = SignedRequest {
                    method: request.method().as_str(),
                    endpoint,
                    path: &path_and_query,
                    body: request.body().unwrap_or_default(),
                    timestamp,
                };
                Ok(vke_auth::auth_headers(mode, Some(&signed))?)
            }
        }
    }
}

/// Part of `url` after the endpoint, query string included
fn signing_path(url: &Url, endpoint: &str) -> String {
    match url.as_str().strip_prefix(endpoint) {
        Some(rest) => rest.to_string(),
        None => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
    }
}
