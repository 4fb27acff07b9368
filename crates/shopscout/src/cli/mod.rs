// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the shopscout binary.

pub mod classify_cmd;
pub mod crawl_cmd;
pub mod output;
pub mod patterns_cmd;

use shopscout::classify::PatternLibrary;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Logs go to stderr; `RUST_LOG`
/// overrides the default directive.
pub fn init_tracing(verbose: bool, quiet: bool, log_json: bool) {
    let default_directive = if verbose {
        "shopscout=debug"
    } else if quiet {
        "shopscout=warn"
    } else {
        "shopscout=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// The pattern library from `path`, or the built-in one.
pub fn load_patterns(path: Option<&Path>) -> anyhow::Result<PatternLibrary> {
    Ok(match path {
        Some(path) => PatternLibrary::load(path)?,
        None => PatternLibrary::builtin(),
    })
}
