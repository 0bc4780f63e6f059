//! `ctlmgr-tui`: terminal panel for a ROS controller manager.
//!
//! Lists every controller the manager reports under a namespace, and starts
//! or stops one at a time from a context menu (right-click or `m`). Talks to
//! the robot through rosbridge_server over WebSocket.
//!
//! Logs go to a file (default `/tmp/ctlmgr-tui.log`) so they never land on
//! the terminal the panel is drawing into.

mod action;
mod app;
mod component;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ctlmgr_api::RosbridgeClient;
use ctlmgr_config::{Overrides, PREFIX_PARAM};
use ctlmgr_core::Panel;

use crate::app::App;

/// Terminal panel for listing, starting and stopping ROS controllers.
///
/// Settings are also read from the config file and from `CTLMGR_NAMESPACE_PREFIX`,
/// `CTLMGR_ROSBRIDGE_URL` and `CTLMGR_TIMEOUT`. Flags win over both.
#[derive(Parser, Debug)]
#[command(name = "ctlmgr-tui", version, about)]
struct Cli {
    /// Namespace in front of /controller_manager (e.g. /campero)
    #[arg(short = 'n', long = "namespace")]
    namespace: Option<String>,

    /// rosbridge_server WebSocket URL (e.g. ws://robot:9090)
    #[arg(short = 'u', long)]
    url: Option<String>,

    /// Per-call timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// Log file path
    #[arg(long, default_value = "/tmp/ctlmgr-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            namespace_prefix: self.namespace.clone(),
            rosbridge_url: self.url.clone(),
            timeout: self.timeout,
        }
    }
}

/// File-only tracing; stdout belongs to the TUI. Hold the guard until exit
/// so buffered lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ctlmgr_tui={level},ctlmgr_core={level},ctlmgr_api={level}"
        ))
    });

    let dir = cli.log_file.parent().unwrap_or(Path::new("/tmp"));
    let file = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("ctlmgr-tui.log"));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Value of the namespace parameter, if the parameter server has one.
async fn read_prefix_param(client: &RosbridgeClient) -> Option<String> {
    match client.get_param(PREFIX_PARAM).await {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, param = PREFIX_PARAM, "namespace parameter unavailable");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let (config, load_error) = ctlmgr_config::load_config_or_default(&cli.overrides());
    if let Some(e) = load_error {
        warn!(
            error = %e,
            path = %ctlmgr_config::config_path().display(),
            "config unreadable, using defaults"
        );
    }
    let rosbridge = config.rosbridge_config()?;
    info!(url = %rosbridge.url, "starting ctlmgr-tui");

    let client = match RosbridgeClient::connect(&rosbridge).await {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "rosbridge unavailable, starting disconnected");
            None
        }
    };

    let param = match &client {
        Some(client) if config.namespace_prefix.is_none() => read_prefix_param(client).await,
        _ => None,
    };
    let panel_config = config.panel_config(param.as_deref());
    info!(namespace = %panel_config.namespace_prefix, "namespace resolved");

    let panel = client.as_ref().map(|c| Panel::new(Arc::clone(c)));
    let mut app = App::new(panel, panel_config);
    let result = app.run().await;

    if let Some(client) = client {
        client.close().await;
    }
    result
}
