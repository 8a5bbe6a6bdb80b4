// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! VKE API Authentication Library
//!
//! This library produces the authentication material attached to VKE
//! control-plane requests. Two schemes are supported:
//!
//! - **Signed**: an application key/secret pair. Each request carries the
//!   key, a server-corrected timestamp, and a SHA-1 signature over the
//!   request shape (see [`signature`]).
//! - **Bearer**: an OpenStack keystone token sent as `X-Auth-Token`, with no
//!   signature.
//!
//! # Authentication Flow
//!
//! 1. Build an [`AuthMode`] from configuration
//! 2. Measure the clock offset once with [`ClockSync`]
//! 3. For each request, call [`auth_headers`] with the corrected timestamp
//!
//! # Example
//!
//! ```ignore
//! use vke_auth::{AuthMode, Credentials, SignedRequest, auth_headers};
//!
//! let auth = AuthMode::signed(Credentials::new("my-app-key", "my-app-secret"));
//! let offset = clock.offset().await?;
//! let request = SignedRequest {
//!     method: "GET",
//!     endpoint: "https://api.vke.example",
//!     path: "/cluster/abc/nodegroups",
//!     body: b"",
//!     timestamp: clock.corrected_now(offset).timestamp(),
//! };
//! let headers = auth_headers(&auth, Some(&request))?;
//! ```

pub mod clock;
pub mod error;
pub mod signature;

use std::fmt;

use http::{HeaderMap, HeaderName};

pub use clock::{ClockSync, TimeSource};
pub use error::AuthError;
pub use signature::{RequestSigner, SignedHeaders, SignedRequest};

/// Header carrying an OpenStack keystone token
pub const TOKEN_HEADER: &str = "x-auth-token";

/// Application key/secret pair used for signed requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    application_key: String,
    application_secret: String,
}

impl Credentials {
    pub fn new(application_key: impl Into<String>, application_secret: impl Into<String>) -> Self {
        Self {
            application_key: application_key.into(),
            application_secret: application_secret.into(),
        }
    }

    pub fn application_key(&self) -> &str {
        &self.application_key
    }

    pub fn application_secret(&self) -> &str {
        &self.application_secret
    }

    /// Check that neither half of the pair is empty
    ///
    /// # Errors
    /// Names the first missing credential.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.application_key.is_empty() {
            return Err(AuthError::MissingCredential("application key"));
        }
        if self.application_secret.is_empty() {
            return Err(AuthError::MissingCredential("application secret"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("application_key", &self.application_key)
            .field("application_secret", &"<redacted>")
            .finish()
    }
}

/// How requests to the API are authenticated
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Sign each request with an application key/secret pair
    Signed(Credentials),
    /// Send a pre-acquired keystone token
    Bearer(String),
    /// Send no authentication material
    Unauthenticated,
}

impl AuthMode {
    pub fn signed(credentials: Credentials) -> Self {
        Self::Signed(credentials)
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Whether requests need a clock-corrected signature
    pub fn needs_signature(&self) -> bool {
        matches!(self, Self::Signed(_))
    }

    /// Check that the credentials for this mode are present
    ///
    /// # Errors
    /// Names the missing credential.
    pub fn validate(&self) -> Result<(), AuthError> {
        match self {
            Self::Signed(credentials) => credentials.validate(),
            Self::Bearer(token) if token.is_empty() => {
                Err(AuthError::MissingCredential("bearer token"))
            }
            Self::Bearer(_) | Self::Unauthenticated => Ok(()),
        }
    }
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed(credentials) => f.debug_tuple("Signed").field(credentials).finish(),
            Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Self::Unauthenticated => f.write_str("Unauthenticated"),
        }
    }
}

/// Build the authentication headers for a request
///
/// `request` is the signed shape of the request; it is required in signed
/// mode and ignored otherwise.
///
/// # Errors
/// Returns an error if signed mode is used without a request shape, or if a
/// header value cannot be encoded.
pub fn auth_headers(
    mode: &AuthMode,
    request: Option<&SignedRequest<'_>>,
) -> Result<HeaderMap, AuthError> {
    match mode {
        AuthMode::Signed(credentials) => {
            let request = request.ok_or(AuthError::MissingCredential("request timestamp"))?;
            RequestSigner::new(credentials).headers(request).to_header_map()
        }
        AuthMode::Bearer(token) => {
            let mut headers = HeaderMap::with_capacity(1);
            headers.insert(
                HeaderName::from_static(TOKEN_HEADER),
                signature::header_value(TOKEN_HEADER, token)?,
            );
            Ok(headers)
        }
        AuthMode::Unauthenticated => Ok(HeaderMap::new()),
    }
}
