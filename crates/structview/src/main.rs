// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structview - feature extraction backend for the structured-view browser.
//!
//! This is the binary entry point for the Structview service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use structview_config::StructviewConfig;
use structview_rpc::READY_TARGET;

/// Structview - feature extraction backend for the structured-view browser.
#[derive(Parser, Debug)]
#[command(name = "structview", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gRPC server (the default).
    Serve,
    /// Extract features from a file, or stdin, and print the document.
    Extract {
        /// Input file. Reads stdin when omitted.
        file: Option<PathBuf>,
        /// Comma-separated field names to pull out of the text.
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
        /// URL the text came from.
        #[arg(long)]
        url: Option<String>,
    },
    /// Print stored extraction history as JSON lines.
    History {
        /// Page size. 0 uses the configured default.
        #[arg(long, default_value_t = 0)]
        limit: u32,
        /// Cursor printed by a previous call.
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Print the effective configuration.
    Config,
}

fn load_config(path: Option<&std::path::Path>) -> StructviewConfig {
    let loaded = match path {
        Some(path) => structview_config::load_and_validate_path(path),
        None => structview_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            structview_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

fn init_tracing(log_level: &str) {
    use std::io::IsTerminal;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::filter::Directive;

    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("structview={log_level},warn")));
    if let Ok(ready) = format!("{READY_TARGET}=info").parse::<Directive>() {
        filter = filter.add_directive(ready);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    init_tracing(&config.service.log_level);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Extract { file, fields, url } => {
            commands::run_extract(&config, file.as_deref(), fields, url)
        }
        Commands::History { limit, cursor } => {
            commands::run_history(&config, limit, cursor.as_deref()).await
        }
        Commands::Config => commands::render_config(&config).map(|toml| print!("{toml}")),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "structview exited with an error");
        eprintln!("structview: {e}");
        std::process::exit(1);
    }
}
