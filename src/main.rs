// Copyright 2026 Lexwatch Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use lexwatch::cli;
use lexwatch::config::Config;

#[derive(Parser)]
#[command(
    name = "lexwatch",
    about = "Lexwatch — bandwidth-minimizing change monitor for consolidated-law texts",
    version,
    arg_required_else_help = true,
    after_help = "Run 'lexwatch <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Catalog database path (overrides LEXWATCH_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one poll cycle over the monitored documents
    Check {
        /// Restrict the run to a single document by slug
        #[arg(long)]
        law: Option<String>,
        /// Recency threshold in hours
        #[arg(long, default_value = "12")]
        hours: u32,
        /// Also poll documents checked within the threshold
        #[arg(long)]
        include_recent: bool,
    },
    /// Start the HTTP trigger endpoint
    Serve {
        /// Port to listen on (overrides LEXWATCH_HTTP_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Register a document for monitoring
    Add {
        /// Short name used as the identifier (e.g. "lopdgdd")
        slug: String,
        /// URL of the consolidated text
        url: String,
        /// Human-readable title
        #[arg(long)]
        name: String,
    },
    /// Show monitored documents and their cached state
    List,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let filter = if args.verbose {
        EnvFilter::new("lexwatch=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lexwatch=info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::from_env();
    if let Some(db) = args.db {
        config.db_path = db;
    }

    let result = match args.command {
        Commands::Check {
            law,
            hours,
            include_recent,
        } => cli::check_cmd::run(&config, law, hours, include_recent, args.json).await,
        Commands::Serve { port } => cli::serve_cmd::run(&config, port).await,
        Commands::Add { slug, url, name } => cli::add_cmd::run(&config, &slug, &url, &name).await,
        Commands::List => cli::list_cmd::run(&config, args.json).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "lexwatch", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
