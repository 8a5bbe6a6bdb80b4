// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Node pool operations
//!
//! Every operation is one authenticated round trip; nothing is cached.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::Client;
use crate::error::{DecodeError, Result};
use crate::request::{CallContext, RequestDescriptor};

/// A named, independently sized group of worker machines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePool {
    #[serde(rename = "node_group_uuid")]
    pub id: String,
    #[serde(rename = "node_group_name")]
    pub name: String,
    #[serde(rename = "node_flavor_uuid")]
    pub flavor: String,
    #[serde(rename = "node_groups_status")]
    pub status: String,
    #[serde(rename = "node_group_min_size")]
    pub min_nodes: u32,
    #[serde(rename = "node_group_max_size")]
    pub max_nodes: u32,
    pub current_nodes: i64,
}

/// A worker machine in a node pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(rename = "instance_uuid")]
    pub id: String,
    #[serde(rename = "cluster_uuid")]
    pub cluster_id: String,
    pub instance_name: String,
    #[serde(rename = "node_group_uuid")]
    pub node_pool_id: String,
    pub current_nodes: i64,
    #[serde(rename = "node_group_min_size")]
    pub min_nodes: i64,
    #[serde(rename = "node_group_max_size")]
    pub max_nodes: i64,
    #[serde(rename = "node_flavor_uuid")]
    pub flavor: String,
    #[serde(rename = "node_groups_status")]
    pub status: String,
}

/// Parameters of a new node pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodePoolOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub flavor_name: String,
    pub autoscale: bool,
    pub monthly_billed: bool,
    pub anti_affinity: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_nodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<u32>,
}

/// Changes to a node pool; unset fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNodePoolOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_nodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscale: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes_to_remove: Vec<String>,
}

/// Node pool operations of the VKE API
#[async_trait]
pub trait NodePoolApi: Send + Sync {
    /// List the node pools of a cluster; an empty body is an empty list
    async fn list_node_pools(&self, cluster_id: &str, ctx: &CallContext) -> Result<Vec<NodePool>>;

    async fn get_node_pool(
        &self,
        cluster_id: &str,
        pool_id: &str,
        ctx: &CallContext,
    ) -> Result<NodePool>;

    async fn list_node_pool_nodes(
        &self,
        cluster_id: &str,
        pool_id: &str,
        ctx: &CallContext,
    ) -> Result<Vec<Node>>;

    async fn create_node_pool(
        &self,
        project_id: &str,
        cluster_id: &str,
        opts: &CreateNodePoolOpts,
        ctx: &CallContext,
    ) -> Result<NodePool>;

    /// Resize or reconfigure a node pool
    async fn update_node_pool(
        &self,
        cluster_id: &str,
        pool_id: &str,
        opts: &UpdateNodePoolOpts,
        ctx: &CallContext,
    ) -> Result<Option<NodePool>>;

    async fn delete_node_pool(
        &self,
        project_id: &str,
        cluster_id: &str,
        pool_id: &str,
        ctx: &CallContext,
    ) -> Result<Option<NodePool>>;

    /// Remove one node from a pool
    async fn remove_node(
        &self,
        cluster_id: &str,
        pool_id: &str,
        node_name: &str,
        ctx: &CallContext,
    ) -> Result<()>;

    /// Add one node to a pool
    async fn add_node(&self, cluster_id: &str, pool_id: &str, ctx: &CallContext) -> Result<Node>;
}

fn enc(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn required<T>(value: Option<T>, path: &str) -> Result<T> {
    value.ok_or_else(|| DecodeError::EmptyBody(path.to_string()).into())
}

#[async_trait]
impl NodePoolApi for Client {
    async fn list_node_pools(&self, cluster_id: &str, ctx: &CallContext) -> Result<Vec<NodePool>> {
        debug!(cluster_id, "listing node pools");
        let path = format!("/cluster/{}/nodegroups", enc(cluster_id));
        Ok(self.get(&path, ctx).await?.unwrap_or_default())
    }

    async fn get_node_pool(
        &self,
        cluster_id: &str,
        pool_id: &str,
        ctx: &CallContext,
    ) -> Result<NodePool> {
        debug!(cluster_id, pool_id, "getting node pool");
        let path = format!("/cluster/{}/nodepool/{}", enc(cluster_id), enc(pool_id));
        required(self.get(&path, ctx).await?, &path)
    }

    async fn list_node_pool_nodes(
        &self,
        cluster_id: &str,
        pool_id: &str,
        ctx: &CallContext,
    ) -> Result<Vec<Node>> {
        debug!(cluster_id, pool_id, "listing node pool nodes");
        let path = format!(
            "/cluster/{}/nodegroups/{}/nodes",
            enc(cluster_id),
            enc(pool_id)
        );
        Ok(self.get(&path, ctx).await?.unwrap_or_default())
    }

    async fn create_node_pool(
        &self,
        project_id: &str,
        cluster_id: &str,
        opts: &CreateNodePoolOpts,
        ctx: &CallContext,
    ) -> Result<NodePool> {
        debug!(project_id, cluster_id, flavor = %opts.flavor_name, "creating node pool");
        let path = format!(
            "/cloud/project/{}/kube/{}/nodepool",
            enc(project_id),
            enc(cluster_id)
        );
        required(self.post(&path, opts, ctx).await?, &path)
    }

    async fn update_node_pool(
        &self,
        cluster_id: &str,
        pool_id: &str,
        opts: &UpdateNodePoolOpts,
        ctx: &CallContext,
    ) -> Result<Option<NodePool>> {
        debug!(
            cluster_id,
            pool_id,
            min_nodes = ?opts.min_nodes,
            max_nodes = ?opts.max_nodes,
            "updating node pool"
        );
        let path = format!("/cluster/{}/nodegroups/{}", enc(cluster_id), enc(pool_id));
        self.put(&path, opts, ctx).await
    }

    async fn delete_node_pool(
        &self,
        project_id: &str,
        cluster_id: &str,
        pool_id: &str,
        ctx: &CallContext,
    ) -> Result<Option<NodePool>> {
        debug!(project_id, cluster_id, pool_id, "deleting node pool");
        let path = format!(
            "/cloud/project/{}/kube/{}/nodepool/{}",
            enc(project_id),
            enc(cluster_id),
            enc(pool_id)
        );
        self.delete(&path, ctx).await
    }

    async fn remove_node(
        &self,
        cluster_id: &str,
        pool_id: &str,
        node_name: &str,
        ctx: &CallContext,
    ) -> Result<()> {
        debug!(cluster_id, pool_id, node_name, "removing node");
        let path = format!(
            "/cluster/{}/nodegroups/{}/nodes/{}",
            enc(cluster_id),
            enc(pool_id),
            enc(node_name)
        );
        self.call_discard(RequestDescriptor::delete(path), ctx).await
    }

    async fn add_node(&self, cluster_id: &str, pool_id: &str, ctx: &CallContext) -> Result<Node> {
        debug!(cluster_id, pool_id, "adding node");
        let path = format!(
            "/cluster/{}/nodegroups/{}/nodes/add",
            enc(cluster_id),
            enc(pool_id)
        );
        required(self.call(RequestDescriptor::put(path.as_str()), ctx).await?, &path)
    }
}
