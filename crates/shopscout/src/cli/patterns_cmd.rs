// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! `shopscout patterns`: print the effective pattern library.

use anyhow::Result;
use std::path::Path;

pub fn run(patterns: Option<&Path>) -> Result<()> {
    let library = super::load_patterns(patterns)?;
    let doc = serde_json::to_value(library.to_document())?;
    super::output::print_json(&doc);
    Ok(())
}
