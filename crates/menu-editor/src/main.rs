//! Menu editor backend: entry point.
//!
//! Serves the HTTP endpoints behind the drag-and-drop menu editor and keeps
//! the site menu in a YAML document on disk.
//!
//! # Usage
//!
//! ```text
//! menu-editor [OPTIONS]
//!
//! Options:
//!   --config    <PATH>  TOML configuration file
//!   --bind      <ADDR>  Listen address [default: 127.0.0.1:8088]
//!   --menu-file <PATH>  Menu document, overrides `menu_file` in the config
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                | Default          | Description              |
//! |-------------------------|------------------|--------------------------|
//! | `MENU_EDITOR_CONFIG`    | (none)           | TOML configuration file  |
//! | `MENU_EDITOR_BIND`      | `127.0.0.1:8088` | Listen address           |
//! | `MENU_EDITOR_MENU_FILE` | (none)           | Menu document path       |
//! | `RUST_LOG`              | `info`           | Log filter               |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use menu_editor::application::EditorService;
use menu_editor::domain::EditorConfig;
use menu_editor::infrastructure::{load_config, run_server};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Backend for the drag-and-drop site menu editor.
#[derive(Debug, Parser)]
#[command(name = "menu-editor", about = "HTTP backend for the drag-and-drop menu editor", version)]
struct Cli {
    /// TOML configuration file.  Without it every setting takes its default.
    #[arg(long, env = "MENU_EDITOR_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on.
    ///
    /// The editor has no authentication of its own; keep it on loopback and
    /// put it behind the host application's access control.
    #[arg(long, default_value = "127.0.0.1:8088", env = "MENU_EDITOR_BIND")]
    bind: String,

    /// Menu document to edit.  Overrides `menu_file` from the config file.
    #[arg(long, env = "MENU_EDITOR_MENU_FILE")]
    menu_file: Option<PathBuf>,
}

impl Cli {
    /// Resolves the listen address and the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` is not a socket address or the config
    /// file cannot be loaded.
    fn into_settings(self) -> anyhow::Result<(SocketAddr, EditorConfig)> {
        let bind_addr: SocketAddr = self
            .bind
            .parse()
            .with_context(|| format!("invalid listen address: '{}'", self.bind))?;

        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => EditorConfig::default(),
        };
        if let Some(menu_file) = self.menu_file {
            config.menu_file = menu_file;
        }

        Ok((bind_addr, config))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG selects the filter; fall back to `info`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (bind_addr, config) = Cli::parse().into_settings()?;
    info!(
        menu_file = %config.menu_file.display(),
        backups = config.backups.enabled,
        "menu editor starting"
    );

    let service = Arc::new(EditorService::new(config));

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
        }
    };

    run_server(service, bind_addr, shutdown)
        .await
        .with_context(|| format!("menu editor server on {bind_addr} failed"))?;

    info!("menu editor stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
