// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! VKE Control-Plane Client Library
//!
//! This client provides typed access to the node pools of a VKE managed
//! Kubernetes cluster. It handles request signing with a server-synchronized
//! timestamp, error decoding, and a single regional failover retry for
//! tenants that live in another region.
//!
//! ## Usage
//!
//! ### Signed Client
//!
//! ```ignore
//! use vke_client::{AuthMode, CallContext, Client, ClientConfig, Credentials,
//!     EndpointTable, NodePoolApi};
//!
//! let config = ClientConfig::resolve(
//!     "vke",
//!     &EndpointTable::from_env(),
//!     AuthMode::signed(Credentials::new("my-app-key", "my-app-secret")),
//! )?;
//! let client = Client::new(config)?;
//!
//! let pools = client.list_node_pools("my-cluster", &CallContext::new()).await?;
//! ```
//!
//! ### Bearer Token and Failover
//!
//! ```ignore
//! use vke_client::{AuthMode, Client, ClientConfig, FailoverPolicy};
//!
//! let config = ClientConfig::from_url("https://eu.api.vke.example", AuthMode::bearer(token))?
//!     .with_failover(FailoverPolicy::new("https://ca.api.vke.example")?);
//! let client = Client::new(config)?;
//! ```
//!
//! ### Cancellation and Deadlines
//!
//! Every call takes a [`CallContext`]. A context without a deadline gets the
//! client's configured timeout (180 seconds by default).
//!
//! ```ignore
//! let ctx = CallContext::new()
//!     .with_cancellation(shutdown.child_token())
//!     .with_timeout(Duration::from_secs(10));
//! client.remove_node("my-cluster", "pool-1", "node-3", &ctx).await?;
//! ```

mod auth;
pub mod client;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod failover;
pub mod nodepool;
pub mod request;

pub use client::{Client, ClientBuilder, TIME_PATH};
pub use config::{
    ClientConfig, ConfigFile, DEFAULT_ENDPOINT_NAME, DEFAULT_TIMEOUT, ENDPOINT_ENV_VAR,
    EndpointTable,
};
pub use dispatch::{Dispatcher, QUERY_ID_HEADER, RawResponse, RequestObserver, TracingObserver};
pub use error::{ApiError, ConfigError, DecodeError, Error, Result, TransportError};
pub use failover::{FailoverClassifier, FailoverPolicy, TenantSyncClassifier};
pub use nodepool::{CreateNodePoolOpts, Node, NodePool, NodePoolApi, UpdateNodePoolOpts};
pub use request::{CallContext, RequestDescriptor};

// Re-export vke-auth types for convenience
pub use vke_auth::{AuthError, AuthMode, Credentials};

// Re-exported so callers can build cancellation tokens without a direct
// tokio-util dependency
pub use tokio_util::sync::CancellationToken;
