// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Node pool commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use vke_client::{CallContext, Client, CreateNodePoolOpts, NodePoolApi, UpdateNodePoolOpts};

use crate::output::print_json;

#[derive(Subcommand, Clone)]
pub enum PoolCommand {
    /// List the node pools of a cluster
    #[command(alias = "ls")]
    List {
        /// Cluster ID
        cluster: String,
    },

    /// Show one node pool
    Get {
        /// Cluster ID
        cluster: String,
        /// Node pool ID
        pool: String,
    },

    /// List the nodes of a node pool
    Nodes {
        /// Cluster ID
        cluster: String,
        /// Node pool ID
        pool: String,
    },

    /// Resize or reconfigure a node pool
    Update(UpdateArgs),

    /// Create a node pool
    Create(CreateArgs),

    /// Delete a node pool
    #[command(alias = "rm")]
    Delete {
        /// Project ID
        project: String,
        /// Cluster ID
        cluster: String,
        /// Node pool ID
        pool: String,
    },
}

#[derive(Args, Clone)]
pub struct UpdateArgs {
    /// Cluster ID
    pub cluster: String,
    /// Node pool ID
    pub pool: String,
    /// Minimum number of nodes
    #[arg(long)]
    pub min: Option<u32>,
    /// Maximum number of nodes
    #[arg(long)]
    pub max: Option<u32>,
    /// Enable or disable autoscaling
    #[arg(long)]
    pub autoscale: Option<bool>,
    /// Node to remove (repeatable)
    #[arg(long = "remove-node", value_name = "NODE")]
    pub remove_nodes: Vec<String>,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// Project ID
    pub project: String,
    /// Cluster ID
    pub cluster: String,
    /// Flavor of the pool's nodes
    #[arg(long)]
    pub flavor: String,
    /// Node pool name
    #[arg(long)]
    pub name: Option<String>,
    /// Minimum number of nodes
    #[arg(long)]
    pub min: Option<u32>,
    /// Maximum number of nodes
    #[arg(long)]
    pub max: Option<u32>,
    /// Enable autoscaling
    #[arg(long)]
    pub autoscale: bool,
    /// Bill the nodes monthly
    #[arg(long)]
    pub monthly_billed: bool,
    /// Spread the nodes over distinct hosts
    #[arg(long)]
    pub anti_affinity: bool,
}

impl PoolCommand {
    pub async fn run(self, client: &Client, ctx: &CallContext) -> Result<()> {
        match self {
            Self::List { cluster } => {
                let pools = client
                    .list_node_pools(&cluster, ctx)
                    .await
                    .with_context(|| format!("failed to list node pools of cluster {cluster}"))?;
                print_json(&pools)
            }
            Self::Get { cluster, pool } => {
                let pool = client
                    .get_node_pool(&cluster, &pool, ctx)
                    .await
                    .with_context(|| format!("failed to get node pool {pool}"))?;
                print_json(&pool)
            }
            Self::Nodes { cluster, pool } => {
                let nodes = client
                    .list_node_pool_nodes(&cluster, &pool, ctx)
                    .await
                    .with_context(|| format!("failed to list nodes of node pool {pool}"))?;
                print_json(&nodes)
            }
            Self::Update(args) => update(args, client, ctx).await,
            Self::Create(args) => create(args, client, ctx).await,
            Self::Delete {
                project,
                cluster,
                pool,
            } => {
                let deleted = client
                    .delete_node_pool(&project, &cluster, &pool, ctx)
                    .await
                    .with_context(|| format!("failed to delete node pool {pool}"))?;
                print_json(&deleted)
            }
        }
    }
}

async fn update(args: UpdateArgs, client: &Client, ctx: &CallContext) -> Result<()> {
    let opts = UpdateNodePoolOpts {
        min_nodes: args.min,
        max_nodes: args.max,
        autoscale: args.autoscale,
        nodes_to_remove: args.remove_nodes,
    };
    if opts == UpdateNodePoolOpts::default() {
        anyhow::bail!("nothing to update: pass --min, --max, --autoscale or --remove-node");
    }

    let pool = client
        .update_node_pool(&args.cluster, &args.pool, &opts, ctx)
        .await
        .with_context(|| format!("failed to update node pool {}", args.pool))?;
    print_json(&pool)
}

async fn create(args: CreateArgs, client: &Client, ctx: &CallContext) -> Result<()> {
    let opts = CreateNodePoolOpts {
        name: args.name,
        flavor_name: args.flavor,
        autoscale: args.autoscale,
        monthly_billed: args.monthly_billed,
        anti_affinity: args.anti_affinity,
        min_nodes: args.min,
        max_nodes: args.max,
    };
    let pool = client
        .create_node_pool(&args.project, &args.cluster, &opts, ctx)
        .await
        .with_context(|| format!("failed to create node pool in cluster {}", args.cluster))?;
    print_json(&pool)
}
