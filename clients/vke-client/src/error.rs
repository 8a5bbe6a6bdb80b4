// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Error types for vke-client
//!
//! Every variant is `Clone`: a clock fetch shared by several callers hands
//! the same error to all of them.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Result alias used throughout the client
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level client error
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Invalid or incomplete configuration; detected before any request
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The exchange did not complete
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-success status
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success response body could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Authentication material could not be produced
    #[error(transparent)]
    Auth(#[from] vke_auth::AuthError),
}

impl Error {
    /// The call was cancelled through its cancellation token
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }

    /// The call ran past its deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(TransportError::TimedOut(_)))
    }

    /// The API error carried by this error, if any
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// Configuration problems, reported at client construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "unknown endpoint '{0}', consider checking the endpoint table or using a URL"
    )]
    UnknownEndpoint(String),

    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("missing {0}, please check your configuration")]
    MissingCredential(&'static str),

    #[error("request to {0} requires authentication but the client has no credentials")]
    AuthenticationRequired(String),

    #[error("failed to read configuration file {}: {reason}", path.display())]
    File { path: PathBuf, reason: String },
}

/// Failures of the exchange itself
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// The caller's cancellation token fired
    #[error("request cancelled")]
    Cancelled,

    /// The call's deadline passed
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),

    /// Network or protocol failure
    #[error("HTTP request failed: {0}")]
    Io(#[source] Arc<reqwest::Error>),

    /// The request could not be assembled
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Io(Arc::new(e))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.into())
    }
}

/// A non-success response from the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error code; the HTTP status unless the body supplied one
    pub code: u16,
    /// Human-readable message
    pub message: String,
    /// Correlation id from the `X-VKE-QueryID` response header
    pub query_id: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {}: \"{}\"", self.code, self.message)?;
        if let Some(query_id) = &self.query_id {
            write!(f, " (X-VKE-QueryID: {})", query_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// A success body that did not match the expected shape
#[derive(Error, Debug, Clone)]
pub enum DecodeError {
    #[error("failed to parse response body: {0}")]
    Json(#[source] Arc<serde_json::Error>),

    #[error("empty response body from {0}")]
    EmptyBody(String),

    #[error("invalid server time: {0}")]
    InvalidTime(i64),
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(Arc::new(e))
    }
}
