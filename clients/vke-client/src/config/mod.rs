// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Client configuration
//!
//! Endpoint resolution order:
//! 1. An endpoint value containing `/` is used as a URL
//! 2. Otherwise it is looked up in an [`EndpointTable`]
//! 3. [`ConfigFile`] layers supply the endpoint, table entries, and
//!    credentials when the caller does not

pub mod file;
pub mod paths;

pub use file::ConfigFile;
pub use paths::{default_config_paths, local_config_path, system_config_path, user_config_path};

use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;
use vke_auth::{AuthError, AuthMode};

use crate::error::ConfigError;
use crate::failover::FailoverPolicy;

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Name of the primary endpoint in the table
pub const DEFAULT_ENDPOINT_NAME: &str = "vke";

/// Environment variable holding the primary endpoint URL
pub const ENDPOINT_ENV_VAR: &str = "VKE_URL";

/// Named endpoints, e.g. `vke -> https://api.vke.example`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointTable {
    entries: BTreeMap<String, String>,
}

impl EndpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table derived from the process environment
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Table derived from an explicit set of environment variables
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = Self::new();
        for (name, value) in vars {
            if name.as_ref() == ENDPOINT_ENV_VAR {
                table.insert(DEFAULT_ENDPOINT_NAME, value);
            }
        }
        table
    }

    pub fn with(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.insert(name, url);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.entries.insert(name.into(), url.into());
    }

    /// URL registered under `name`; empty entries count as absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }

    /// Add every entry of `other`, replacing entries with the same name
    pub fn extend(&mut self, other: &EndpointTable) {
        for (name, url) in &other.entries {
            self.entries.insert(name.clone(), url.clone());
        }
    }
}

/// Immutable settings for one client instance
#[derive(Debug, Clone)]
pub struct ClientConfig {
    endpoint: Url,
    auth: AuthMode,
    timeout: Duration,
    failover: Option<FailoverPolicy>,
}

impl ClientConfig {
    /// Resolve `endpoint` (a URL or a table name) and validate `auth`
    ///
    /// # Errors
    /// Returns an error naming the endpoint if it is empty or unknown, or
    /// naming the credential that `auth` is missing.
    pub fn resolve(
        endpoint: &str,
        endpoints: &EndpointTable,
        auth: AuthMode,
    ) -> Result<Self, ConfigError> {
        let url = if endpoint.contains('/') {
            endpoint
        } else {
            endpoints
                .get(endpoint)
                .ok_or_else(|| ConfigError::UnknownEndpoint(endpoint.to_string()))?
        };
        Self::from_url(url, auth)
    }

    /// Build a configuration for an explicit endpoint URL
    ///
    /// # Errors
    /// Returns an error if the URL does not parse or `auth` is missing a
    /// credential.
    pub fn from_url(url: &str, auth: AuthMode) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: "endpoint must be an absolute http(s) URL".to_string(),
            });
        }
        auth.validate().map_err(|e| match e {
            AuthError::MissingCredential(name) => ConfigError::MissingCredential(name),
            other => ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: other.to_string(),
            },
        })?;

        Ok(Self {
            endpoint,
            auth,
            timeout: DEFAULT_TIMEOUT,
            failover: None,
        })
    }

    /// Default deadline for calls that carry none
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_failover(mut self, policy: FailoverPolicy) -> Self {
        self.failover = Some(policy);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn auth(&self) -> &AuthMode {
        &self.auth
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn failover(&self) -> Option<&FailoverPolicy> {
        self.failover.as_ref()
    }

    /// Configuration for the fallback region: same credentials and timeout,
    /// no further failover
    pub(crate) fn for_fallback(&self, endpoint: Url) -> Self {
        Self {
            endpoint,
            auth: self.auth.clone(),
            timeout: self.timeout,
            failover: None,
        }
    }
}
