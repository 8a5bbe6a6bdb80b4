// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! VKE CLI - command-line interface for VKE node pools

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use vke_client::config::default_config_paths;
use vke_client::{
    CallContext, CancellationToken, Client, ConfigFile, EndpointTable, TracingObserver,
};

mod commands;
mod output;

use commands::{NodeCommand, PoolCommand};

#[derive(Parser)]
#[command(
    name = "vke",
    version,
    about = "VKE node pool management CLI",
    long_about = "Command-line interface for managing the node pools of VKE clusters"
)]
struct Cli {
    /// Endpoint URL or name (e.g. "vke", resolved from VKE_URL)
    #[arg(short, long, global = true, env = "VKE_ENDPOINT")]
    endpoint: Option<String>,

    /// Application key for signed requests
    #[arg(long, global = true, env = "VKE_APPLICATION_KEY")]
    application_key: Option<String>,

    /// Application secret for signed requests
    #[arg(long, global = true, env = "VKE_APPLICATION_SECRET", hide_env_values = true)]
    application_secret: Option<String>,

    /// Keystone token; used instead of the application key pair
    #[arg(long, global = true, env = "VKE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Region to retry in when the tenant lives elsewhere
    #[arg(long, global = true, env = "VKE_FALLBACK_ENDPOINT")]
    fallback_endpoint: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Configuration file to use instead of /etc/vke.conf, ~/.vke.conf and ./vke.conf
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output, logging every HTTP exchange
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the endpoint answers
    Ping,

    /// Show the server time
    Time,

    /// Manage node pools
    #[command(alias = "nodepool")]
    Pool {
        #[command(subcommand)]
        command: PoolCommand,
    },

    /// Add or remove nodes
    Node {
        #[command(subcommand)]
        command: NodeCommand,
    },
}

impl Cli {
    /// Configuration files overlaid with command-line options
    fn config_file(&self) -> Result<ConfigFile> {
        let files = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::load_layered(default_config_paths())?,
        };

        let overrides = ConfigFile {
            endpoint: self.endpoint.clone(),
            application_key: self.application_key.clone(),
            application_secret: self.application_secret.clone(),
            token: self.token.clone(),
            timeout_secs: self.timeout,
            fallback_endpoint: self.fallback_endpoint.clone(),
            ..Default::default()
        };
        Ok(files.merge(overrides))
    }

    fn build_client(&self) -> Result<Client> {
        let config = self
            .config_file()?
            .client_config(&EndpointTable::from_env())
            .context("invalid VKE configuration")?;
        tracing::debug!(endpoint = %config.endpoint(), "using VKE endpoint");
        let mut builder = Client::builder(config);
        if self.verbose {
            builder = builder.observer(Arc::new(TracingObserver));
        }
        Ok(builder.build()?)
    }
}

/// Call context cancelled on Ctrl-C
fn call_context() -> CallContext {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling request");
            cancel.cancel();
        }
    });
    CallContext::new().with_cancellation(token)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable
    let default_filter = if cli.verbose {
        "vke=debug,vke_client=debug,vke_auth=debug"
    } else {
        "vke=info,vke_client=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
        ))
        .with_writer(std::io::stderr)
        .init();

    let client = cli.build_client()?;
    let ctx = call_context();

    match cli.command {
        Commands::Ping => commands::ping(&client, &ctx).await,
        Commands::Time => commands::time(&client, &ctx).await,
        Commands::Pool { command } => command.run(&client, &ctx).await,
        Commands::Node { command } => command.run(&client, &ctx).await,
    }
}
