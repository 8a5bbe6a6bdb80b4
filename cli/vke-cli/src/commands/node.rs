// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Node commands

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::json;
use vke_client::{CallContext, Client, NodePoolApi};

use crate::output::print_json;

#[derive(Subcommand, Clone)]
pub enum NodeCommand {
    /// Add one node to a node pool
    Add {
        /// Cluster ID
        cluster: String,
        /// Node pool ID
        pool: String,
    },

    /// Remove a node from a node pool
    #[command(alias = "rm")]
    Remove {
        /// Cluster ID
        cluster: String,
        /// Node pool ID
        pool: String,
        /// Node name
        node: String,
    },
}

impl NodeCommand {
    pub async fn run(self, client: &Client, ctx: &CallContext) -> Result<()> {
        match self {
            Self::Add { cluster, pool } => {
                let node = client
                    .add_node(&cluster, &pool, ctx)
                    .await
                    .with_context(|| format!("failed to add a node to node pool {pool}"))?;
                print_json(&node)
            }
            Self::Remove {
                cluster,
                pool,
                node,
            } => {
                client
                    .remove_node(&cluster, &pool, &node, ctx)
                    .await
                    .with_context(|| format!("failed to remove node {node}"))?;
                print_json(&json!({ "removed": node }))
            }
        }
    }
}
