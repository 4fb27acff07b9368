// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP acquisition: page and sitemap fetching, sitemap parsing, and
//! follow-link extraction.

pub mod http_client;
pub mod links;
pub mod sitemap;

pub use http_client::{HttpClient, HttpResponse};
pub use links::extract_links;
pub use sitemap::{parse_sitemap, EntryKind, SitemapEntry};
