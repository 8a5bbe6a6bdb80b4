// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Regional failover
//!
//! The control plane is sharded by region. A tenant that lives in another
//! shard gets a recognizable error from the region it addressed; such a call
//! is re-issued once against the fallback region. The client performing the
//! retry carries no failover policy of its own, so at most one hop happens.
//!
//! When the hop fails the caller sees the original region's error, except
//! when the caller cancelled during the hop; then the cancellation is
//! returned.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use url::Url;

use crate::error::{ApiError, ConfigError};

/// Message pattern of a cross-region tenant error
pub const DEFAULT_TENANT_PATTERN: &str =
    r"(?i)(tenant|project).*(not found|unknown|does not exist|not synchronized)";

/// Statuses a cross-region tenant error is reported with
pub const DEFAULT_STATUSES: [u16; 3] = [401, 403, 404];

const RESOURCE_PATH_PREFIX: &str = "/cluster/";

#[allow(clippy::expect_used)]
static DEFAULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_TENANT_PATTERN).expect("DEFAULT_TENANT_PATTERN is a valid regex")
});

/// Decides whether an API error means "wrong regional shard"
pub trait FailoverClassifier: Send + Sync + fmt::Debug {
    fn is_cross_region(&self, error: &ApiError, url: &Url) -> bool;
}

/// Matches tenant-not-synchronized errors on cluster resources
#[derive(Debug, Clone)]
pub struct TenantSyncClassifier {
    statuses: Vec<u16>,
    pattern: Regex,
}

impl Default for TenantSyncClassifier {
    fn default() -> Self {
        Self {
            statuses: DEFAULT_STATUSES.to_vec(),
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}

impl TenantSyncClassifier {
    /// Classifier with custom statuses and message pattern
    ///
    /// # Errors
    /// Returns an error if `pattern` is not a valid regex.
    pub fn new(statuses: Vec<u16>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            statuses,
            pattern: Regex::new(pattern)?,
        })
    }
}

impl FailoverClassifier for TenantSyncClassifier {
    fn is_cross_region(&self, error: &ApiError, url: &Url) -> bool {
        self.statuses.contains(&error.code)
            && url.path().contains(RESOURCE_PATH_PREFIX)
            && self.pattern.is_match(&error.message)
    }
}

/// Fallback region and the rule that triggers it
#[derive(Debug, Clone)]
pub struct FailoverPolicy {
    endpoint: Url,
    classifier: Arc<dyn FailoverClassifier>,
}

impl FailoverPolicy {
    /// Fail over to `endpoint` using [`TenantSyncClassifier`]
    ///
    /// # Errors
    /// Returns an error if `endpoint` is not a valid URL.
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(endpoint).map_err(|e| ConfigError::InvalidUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            endpoint,
            classifier: Arc::new(TenantSyncClassifier::default()),
        })
    }

    /// Replace the classifier
    pub fn with_classifier(mut self, classifier: impl FailoverClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Whether a call to `url` that failed with `error` should be re-issued
    /// against the fallback region
    pub fn should_fail_over(&self, error: &ApiError, url: &Url) -> bool {
        url.origin() != self.endpoint.origin() && self.classifier.is_cross_region(error, url)
    }
}
