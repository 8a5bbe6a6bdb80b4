// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Request signature generation for VKE API authentication
//!
//! A signed request carries three headers:
//!
//! ```text
//! X-VKE-Application: <application key>
//! X-VKE-Timestamp: <corrected unix seconds>
//! X-VKE-Signature: $1$<hex sha1>
//! ```
//!
//! The digest is computed over the `+`-joined fields, in this order:
//!
//! ```text
//! <secret>+<METHOD>+<endpoint>+<path?query>+<body>+<timestamp>
//! ```

use crate::Credentials;
use crate::error::AuthError;
use http::{HeaderMap, HeaderName, HeaderValue};
use sha1::{Digest, Sha1};

/// Header carrying the application key
pub const APPLICATION_HEADER: &str = "x-vke-application";

/// Header carrying the corrected timestamp used in the signature
pub const TIMESTAMP_HEADER: &str = "x-vke-timestamp";

/// Header carrying the signature itself
pub const SIGNATURE_HEADER: &str = "x-vke-signature";

/// Version prefix of the signature value
pub const SIGNATURE_PREFIX: &str = "$1$";

const FIELD_DELIMITER: u8 = b'+';

/// The parts of a request covered by the signature
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    /// Upper-case HTTP method
    pub method: &'a str,
    /// Endpoint base URL, without a trailing slash
    pub endpoint: &'a str,
    /// Request path including any query string
    pub path: &'a str,
    /// Serialized request body (empty when there is none)
    pub body: &'a [u8],
    /// Unix timestamp already corrected by the clock offset
    pub timestamp: i64,
}

/// Request signer bound to one set of application credentials
pub struct RequestSigner<'a> {
    credentials: &'a Credentials,
}

impl<'a> RequestSigner<'a> {
    /// Create a signer for the given credentials
    pub fn new(credentials: &'a Credentials) -> Self {
        Self { credentials }
    }

    /// Build the byte string fed to the digest
    pub fn signing_payload(&self, request: &SignedRequest<'_>) -> Vec<u8> {
        let timestamp = request.timestamp.to_string();
        let method = request.method.to_uppercase();
        let fields: [&[u8]; 6] = [
            self.credentials.application_secret().as_bytes(),
            method.as_bytes(),
            request.endpoint.as_bytes(),
            request.path.as_bytes(),
            request.body,
            timestamp.as_bytes(),
        ];

        let mut payload = Vec::with_capacity(fields.iter().map(|f| f.len() + 1).sum());
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                payload.push(FIELD_DELIMITER);
            }
            payload.extend_from_slice(field);
        }
        payload
    }

    /// Compute the signature value, `$1$` followed by the hex SHA-1 digest
    pub fn sign(&self, request: &SignedRequest<'_>) -> String {
        let digest = Sha1::digest(self.signing_payload(request));
        format!("{}{:x}", SIGNATURE_PREFIX, digest)
    }

    /// Produce the full set of authentication headers for a request
    pub fn headers(&self, request: &SignedRequest<'_>) -> SignedHeaders {
        SignedHeaders {
            application: self.credentials.application_key().to_string(),
            timestamp: request.timestamp,
            signature: self.sign(request),
        }
    }
}

/// Authentication header values for one signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub application: String,
    pub timestamp: i64,
    pub signature: String,
}

impl SignedHeaders {
    /// Convert to an HTTP header map
    ///
    /// # Errors
    /// Returns an error if the application key contains characters that are
    /// not valid in a header value.
    pub fn to_header_map(&self) -> Result<HeaderMap, AuthError> {
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(
            HeaderName::from_static(APPLICATION_HEADER),
            header_value(APPLICATION_HEADER, &self.application)?,
        );
        headers.insert(
            HeaderName::from_static(TIMESTAMP_HEADER),
            HeaderValue::from(self.timestamp),
        );
        headers.insert(
            HeaderName::from_static(SIGNATURE_HEADER),
            header_value(SIGNATURE_HEADER, &self.signature)?,
        );
        Ok(headers)
    }
}

pub(crate) fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(value).map_err(|e| AuthError::InvalidHeader {
        name,
        reason: e.to_string(),
    })
}
