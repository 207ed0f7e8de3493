//! Entry point for the shadowing practice player.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments (optional backend URL override).
//! - Load user configuration from `conf/config.toml`.
//! - Launch the GUI application with the loaded config.

mod acquire;
mod app;
mod cache;
mod config;
mod controls;
mod player;
mod theme;
mod transcript;

use crate::app::run_app;
use crate::config::load_config;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let mut config = load_config(Path::new("conf/config.toml"));
    if let Some(server_url) = parse_args()? {
        info!(%server_url, "Overriding backend URL from command line");
        config.server_url = server_url;
    }
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        server = %config.server_url,
        level = %config.log_level,
        "Starting shadowing player"
    );
    run_app(config).context("Failed to start the GUI")?;
    Ok(())
}

fn parse_args() -> Result<Option<String>> {
    let mut args = env::args().skip(1);
    let Some(url) = args.next() else {
        return Ok(None);
    };
    if args.next().is_some() {
        return Err(anyhow!("Usage: shadowloop [backend-url]"));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(anyhow!("Backend URL must start with http:// or https://"));
    }
    Ok(Some(url.trim_end_matches('/').to_string()))
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
