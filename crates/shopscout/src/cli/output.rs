// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Output mode flags shared by every subcommand.
//!
//! `main` records the global flags in the environment so subcommands can
//! check them without threading arguments through.

pub fn is_quiet() -> bool {
    std::env::var_os("SHOPSCOUT_QUIET").is_some()
}

pub fn is_json() -> bool {
    std::env::var_os("SHOPSCOUT_JSON").is_some()
}

/// Print a JSON value to stdout, pretty-printed.
pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("  Error: failed to render JSON: {e}"),
    }
}
