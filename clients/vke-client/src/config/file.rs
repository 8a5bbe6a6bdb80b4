// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! TOML configuration files

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vke_auth::{AuthMode, Credentials};

use super::{ClientConfig, DEFAULT_ENDPOINT_NAME, EndpointTable};
use crate::error::ConfigError;
use crate::failover::FailoverPolicy;

/// Contents of one configuration file, or several merged together
///
/// ```toml
/// endpoint = "vke"
/// application_key = "my-app-key"
/// application_secret = "my-app-secret"
/// timeout_secs = 60
/// fallback_endpoint = "https://ca.api.vke.example"
///
/// [endpoints]
/// vke = "https://eu.api.vke.example"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Endpoint URL or a name from `endpoints`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_secret: Option<String>,

    /// Keystone token; takes precedence over the application key pair
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Region to retry in when a tenant lives in another shard
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_endpoint: Option<String>,

    /// Named endpoints
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, String>,
}

impl ConfigFile {
    /// Read and parse a single file
    ///
    /// # Errors
    /// Returns [`ConfigError::File`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| file_error(path, e))?;
        Self::parse(&content, path)
    }

    /// Parse file contents; `path` is used in error messages
    ///
    /// # Errors
    /// Returns [`ConfigError::File`] if `content` is not valid TOML for
    /// this structure.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| file_error(path, e))
    }

    /// Load every existing file in `paths` and merge them, later files
    /// overriding earlier ones
    ///
    /// # Errors
    /// Returns [`ConfigError::File`] for the first file that exists but
    /// cannot be read or parsed.
    pub fn load_layered<I, P>(paths: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut merged = Self::default();
        for path in paths {
            let path = path.as_ref();
            if !path.is_file() {
                continue;
            }
            tracing::debug!(path = %path.display(), "loading configuration file");
            merged = merged.merge(Self::load(path)?);
        }
        Ok(merged)
    }

    /// Merge `other` over `self`, field by field
    pub fn merge(mut self, other: Self) -> Self {
        fn take(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.endpoint, other.endpoint);
        take(&mut self.application_key, other.application_key);
        take(&mut self.application_secret, other.application_secret);
        take(&mut self.token, other.token);
        take(&mut self.fallback_endpoint, other.fallback_endpoint);
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        self.endpoints.extend(other.endpoints);
        self
    }

    /// Authentication mode described by this file
    ///
    /// A token wins over a key pair. A partial key pair still selects signed
    /// mode so validation can name the missing half.
    pub fn auth_mode(&self) -> AuthMode {
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return AuthMode::bearer(token);
        }
        match (&self.application_key, &self.application_secret) {
            (None, None) => AuthMode::Unauthenticated,
            (key, secret) => AuthMode::signed(Credentials::new(
                key.clone().unwrap_or_default(),
                secret.clone().unwrap_or_default(),
            )),
        }
    }

    /// Build a client configuration
    ///
    /// Entries in `env` override the file's `[endpoints]` table. Without an
    /// `endpoint` key the `vke` entry is used.
    ///
    /// # Errors
    /// Returns the same errors as [`ClientConfig::resolve`], or an invalid
    /// URL error for `fallback_endpoint`.
    pub fn client_config(&self, env: &EndpointTable) -> Result<ClientConfig, ConfigError> {
        let mut table = EndpointTable::new();
        for (name, url) in &self.endpoints {
            table.insert(name.clone(), url.clone());
        }
        table.extend(env);

        let endpoint = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT_NAME);
        let mut config = ClientConfig::resolve(endpoint, &table, self.auth_mode())?;

        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(fallback) = self.fallback_endpoint.as_deref().filter(|f| !f.is_empty()) {
            config = config.with_failover(FailoverPolicy::new(fallback)?);
        }
        Ok(config)
    }
}

fn file_error(path: &Path, e: impl std::fmt::Display) -> ConfigError {
    ConfigError::File {
        path: PathBuf::from(path),
        reason: e.to_string(),
    }
}
