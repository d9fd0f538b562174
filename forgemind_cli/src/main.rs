//! Forge Mind terminal chat shell.

mod commands;
mod config;
mod output;
mod shell;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use forgemind_core::{CannedResponder, ConversationStore, DispatchConfig, ReplyDispatcher};

use crate::config::Config;
use crate::shell::Shell;

#[derive(Parser)]
#[command(name = "forgemind")]
#[command(about = "Forge Mind - Project Plasma chat shell", version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Override the configured reply delay, in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Read settings from this file instead of ~/.forgemind/config.yaml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "forgemind_core={},forgemind={}",
            log_level, log_level
        )))
        .init();

    let (config, config_path) = match cli.config {
        Some(path) => {
            let config = Config::load_from_file(&path)?;
            (config, path)
        }
        None => (Config::load_or_default(), Config::config_path()),
    };

    // The flag changes the session's delay only; the config file keeps
    // whatever it already says.
    let reply_delay = Duration::from_millis(cli.delay_ms.unwrap_or(config.reply_delay_ms));

    let store = ConversationStore::new();
    let dispatcher = ReplyDispatcher::new(
        store.clone(),
        CannedResponder,
        DispatchConfig { reply_delay },
    );

    let mut shell = Shell::new(store, dispatcher, config, config_path);
    shell.run().await
}
