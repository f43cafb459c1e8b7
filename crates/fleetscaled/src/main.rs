//! fleetscaled: the fleetscale daemon.
//!
//! Loads node group definitions, initializes one manager per group against
//! the juju CLI, keeps them reconciled, and serves them to the cluster
//! autoscaler over HTTP.
//!
//! # Usage
//!
//! ```text
//! fleetscaled run --config /etc/fleetscale/fleetscale.toml --port 8086
//! fleetscaled status --config fleetscale.toml --nodes 1:10:k8s:kubernetes-worker
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fleetscale_client::{FleetClient, JujuCli};
use fleetscale_core::FleetConfig;
use fleetscale_provider::{FleetProvider, ProviderHandle};
use tokio::sync::watch;
use tracing::{error, info};

const DEFAULT_FILTER: &str = "info,fleetscaled=debug,fleetscale=debug";

#[derive(Parser)]
#[command(name = "fleetscaled", about = "Juju node groups for the cluster autoscaler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile node groups and serve the autoscaler API.
    Run {
        /// Path to fleetscale.toml.
        #[arg(long)]
        config: PathBuf,

        /// Extra node group, `<min>:<max>:<model>:<application>`. Repeatable.
        #[arg(long = "nodes")]
        nodes: Vec<String>,

        /// Port to listen on.
        #[arg(long, default_value = "8086")]
        port: u16,

        /// Refresh interval in seconds, overriding the config file.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        refresh_interval: Option<u64>,
    },

    /// Initialize every node group once and print it as JSON.
    Status {
        /// Path to fleetscale.toml.
        #[arg(long)]
        config: PathBuf,

        /// Extra node group, `<min>:<max>:<model>:<application>`. Repeatable.
        #[arg(long = "nodes")]
        nodes: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            nodes,
            port,
            refresh_interval,
        } => run(&config, nodes, port, refresh_interval).await,
        Command::Status { config, nodes } => status(&config, nodes).await,
    }
}

/// Load the config file and initialize every node group on the blocking pool.
async fn init_provider(path: &Path, nodes: Vec<String>) -> anyhow::Result<(FleetConfig, FleetProvider)> {
    let config = FleetConfig::from_file(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    let specs = config.node_group_specs(&nodes)?;
    anyhow::ensure!(!specs.is_empty(), "no node groups configured");

    let juju = config.juju.clone();
    let identity = config.manager.node_identity;
    let provider = tokio::task::spawn_blocking(move || {
        FleetProvider::build(&specs, Arc::new(identity), |spec| {
            Arc::new(JujuCli::from_config(&juju, &spec.model)) as Arc<dyn FleetClient>
        })
    })
    .await??;

    info!(groups = provider.node_groups().len(), "node groups initialized");
    Ok((config, provider))
}

async fn run(
    path: &Path,
    nodes: Vec<String>,
    port: u16,
    refresh_interval: Option<u64>,
) -> anyhow::Result<()> {
    info!("fleetscale daemon starting");

    let (config, provider) = init_provider(path, nodes).await?;
    let interval = match refresh_interval {
        Some(secs) => Duration::from_secs(secs),
        None => config.refresh_interval()?,
    };
    let handle = ProviderHandle::new(provider, config.operation_timeout()?);

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Refresh loop ───────────────────────────────────────────

    let refresher = handle.clone();
    let refresh_handle = tokio::spawn(async move {
        refresher.run_refresh_loop(interval, shutdown_rx).await;
    });

    // ── API server ─────────────────────────────────────────────

    let router = fleetscale_api::build_router(handle);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    if let Err(e) = refresh_handle.await {
        error!(error = %e, "refresh loop task failed");
    }

    info!("fleetscale daemon stopped");
    Ok(())
}

async fn status(path: &Path, nodes: Vec<String>) -> anyhow::Result<()> {
    let (_, provider) = init_provider(path, nodes).await?;

    let groups: Vec<serde_json::Value> = provider
        .node_groups()
        .iter()
        .map(|group| {
            serde_json::json!({
                "group": group.summary(),
                "nodes": group.nodes(),
            })
        })
        .collect();

    let report = serde_json::json!({
        "provider": provider.name(),
        "node_groups": groups,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_repeated_nodes() {
        let cli = Cli::try_parse_from([
            "fleetscaled",
            "run",
            "--config",
            "fleetscale.toml",
            "--nodes",
            "1:3:k8s:worker",
            "--nodes",
            "0:2:k8s:gpu",
            "--refresh-interval",
            "15",
        ])
        .unwrap();

        match cli.command {
            Command::Run {
                nodes,
                port,
                refresh_interval,
                ..
            } => {
                assert_eq!(nodes.len(), 2);
                assert_eq!(port, 8086);
                assert_eq!(refresh_interval, Some(15));
            }
            Command::Status { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let result = Cli::try_parse_from([
            "fleetscaled",
            "run",
            "--config",
            "fleetscale.toml",
            "--refresh-interval",
            "0",
        ]);
        assert!(result.is_err());
    }
}
