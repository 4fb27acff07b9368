// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types shared by the library.

use crate::classify::patterns::PatternCategory;
use std::path::PathBuf;

/// Startup configuration errors. All of these are raised before any
/// crawling begins.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("no domains provided; use --domains \"domain1.com,domain2.com\"")]
    NoDomains,

    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),

    #[error("invalid start URL: {0:?}")]
    InvalidStartUrl(String),

    #[error("failed to read pattern file {path}: {source}")]
    PatternFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed pattern file: {0}")]
    PatternFormat(#[from] serde_json::Error),

    #[error("invalid {category} pattern {pattern:?}: {source}")]
    InvalidPattern {
        category: PatternCategory,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

/// Failure to persist the grouped product report.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
