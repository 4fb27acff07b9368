// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(
    name = "shopscout",
    about = "Shopscout: find product pages on e-commerce sites",
    version,
    after_help = "Run 'shopscout <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl domains and write product URLs grouped by domain
    Crawl(cli::crawl_cmd::CrawlArgs),
    /// Classify a single URL, optionally with its HTML
    Classify {
        /// URL of the page
        url: String,
        /// HTML of the page ("-" reads stdin)
        #[arg(long)]
        html_file: Option<PathBuf>,
        /// JSON pattern file replacing the built-in URL patterns
        #[arg(long)]
        patterns: Option<PathBuf>,
    },
    /// Print the effective URL pattern library as JSON
    Patterns {
        /// JSON pattern file to merge over the built-in patterns
        #[arg(long)]
        patterns: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("SHOPSCOUT_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("SHOPSCOUT_QUIET", "1");
    }

    cli::init_tracing(cli.verbose, cli.quiet, cli.log_json);

    let result = match cli.command {
        Commands::Crawl(args) => cli::crawl_cmd::run(&args).await,
        Commands::Classify {
            url,
            html_file,
            patterns,
        } => cli::classify_cmd::run(&url, html_file.as_deref(), patterns.as_deref()),
        Commands::Patterns { patterns } => cli::patterns_cmd::run(patterns.as_deref()),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "shopscout", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else if !cli::output::is_quiet() {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
