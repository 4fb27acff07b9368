// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shopscout: discovers product pages on e-commerce sites.
//!
//! The decision core ([`classify`], [`tracker`], [`fallback`], [`output`])
//! is synchronous and I/O-free, wrapped by a [`session::CrawlSession`] that
//! takes [`events::PageEvent`]s and returns [`events::FetchRequest`]s. The
//! bundled [`crawler`], [`acquisition`] and [`renderer`] modules drive it
//! over HTTP and headless Chromium.

pub mod acquisition;
pub mod canonical;
pub mod classify;
pub mod config;
pub mod crawler;
pub mod error;
pub mod events;
pub mod fallback;
pub mod output;
pub mod progress;
pub mod renderer;
pub mod session;
pub mod tracker;

pub use config::CrawlConfig;
pub use crawler::{CrawlStats, Crawler};
pub use error::{ConfigError, OutputError};
pub use output::ProductReport;
pub use session::{CrawlSession, PageOutcome};
