// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Follow-link extraction from fetched HTML.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Absolute http(s) links from every `a[href]` in `html`, resolved against
/// `base`, fragments removed, first occurrence kept.
pub fn extract_links(base: &Url, html: &str) -> Vec<Url> {
    let Ok(sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for href in document.select(&sel).filter_map(|a| a.value().attr("href")) {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        let Ok(mut url) = base.join(href) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        url.set_fragment(None);
        if seen.insert(url.as_str().to_string()) {
            links.push(url);
        }
    }
    links
}
