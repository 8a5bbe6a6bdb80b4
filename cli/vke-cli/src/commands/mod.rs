// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! CLI command implementations

pub mod node;
pub mod pool;

pub use node::NodeCommand;
pub use pool::PoolCommand;

use anyhow::{Context, Result};
use serde_json::json;
use vke_client::{CallContext, Client};

use crate::output::print_json;

pub async fn ping(client: &Client, ctx: &CallContext) -> Result<()> {
    client
        .ping(ctx)
        .await
        .with_context(|| format!("{} is not answering", client.config().endpoint()))?;
    print_json(&json!({
        "endpoint": client.config().endpoint().as_str(),
        "status": "ok",
    }))
}

pub async fn time(client: &Client, ctx: &CallContext) -> Result<()> {
    let time = client.time(ctx).await.context("failed to read server time")?;
    print_json(&json!({
        "time": time.to_rfc3339(),
        "unix": time.timestamp(),
    }))
}
