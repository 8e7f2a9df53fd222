use std::path::Path;

use anyhow::Result;
use clap::Parser;

use wp_translator_rust::logging::{self, LogOptions};
use wp_translator_rust::server;
use wp_translator_rust::settings;

#[derive(Parser, Debug)]
#[command(
    name = "wp-translator-rust",
    version,
    about = "Translate WordPress post contents through DeepL"
)]
struct Cli {
    /// Listen address (overrides settings [server].addr)
    #[arg(long = "addr")]
    addr: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,

    /// Append logs to this file instead of stderr
    #[arg(long = "log-file")]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = settings::load_settings(cli.read_settings.as_deref().map(Path::new))?;
    logging::init(&LogOptions {
        level: settings.log_level.clone(),
        verbose: cli.verbose,
        file: cli.log_file.or_else(|| settings.log_file.clone()),
    })?;

    let addr = cli.addr.unwrap_or_else(|| settings.server_addr.clone());
    server::run_server(settings, addr).await
}
