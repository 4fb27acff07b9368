// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Rendering fallback for listing pages whose product links only appear
//! after client-side scripts run.
//!
//! Each listing URL moves `Unrendered → Rendered` at most once. The
//! transition is an insert into a concurrent set, so two workers
//! discovering the same collection page at once dispatch one render
//! between them. A page that renders with zero product links is not
//! retried.

use crate::canonical::{canonicalize_url, tracked_host};
use crate::classify::{classify_url, PatternLibrary, UrlClass};
use crate::events::{FetchRequest, RenderRequest};
use dashmap::DashSet;
use scraper::{Html, Selector};
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;
use url::Url;

/// Anchors shaped like product links. Used both as the render readiness
/// condition and to pick links out of the rendered page.
pub const PRODUCT_LINK_SELECTOR: &str =
    r#"a[href*="/p-"], a[href*="/product/"], a[href*="/products/"], a[href*="productId"]"#;

/// Default bounded wait for product links to appear.
pub const DEFAULT_RENDER_WAIT: Duration = Duration::from_secs(5);

/// Decides which listing pages go through the browser, once each.
#[derive(Debug)]
pub struct RenderFallbackSelector {
    js_domains: HashSet<String>,
    visited: DashSet<String>,
    wait: Duration,
}

impl RenderFallbackSelector {
    pub fn new<I, S>(js_domains: I, wait: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            js_domains: js_domains
                .into_iter()
                .filter_map(|d| crate::canonical::normalize_domain(d.as_ref()))
                .collect(),
            visited: DashSet::new(),
            wait,
        }
    }

    /// True if `url`'s host is configured for rendering fallback.
    pub fn requires_rendering(&self, url: &Url) -> bool {
        tracked_host(url).is_some_and(|host| self.js_domains.contains(&host))
    }

    /// Fire the one-shot transition for a listing URL.
    ///
    /// Returns a render request the first time a listing-like URL on a
    /// JS-rendered domain is seen; `None` for everything else, including
    /// every later call for the same canonical URL.
    pub fn consider(&self, url: &str, url_class: &UrlClass) -> Option<RenderRequest> {
        if !url_class.is_listing {
            return None;
        }
        let parsed = Url::parse(url).ok()?;
        if !self.requires_rendering(&parsed) {
            return None;
        }
        if !self.visited.insert(canonicalize_url(&parsed)) {
            tracing::debug!("collection already rendered: {url}");
            return None;
        }
        tracing::debug!("dispatching render for collection page: {url}");
        Some(RenderRequest {
            url: url.to_string(),
            wait_for_selector: PRODUCT_LINK_SELECTOR.to_string(),
            timeout_ms: self.wait.as_millis() as u64,
        })
    }

    /// True once `url` has transitioned to Rendered.
    pub fn has_rendered(&self, url: &str) -> bool {
        Url::parse(url)
            .map(|u| self.visited.contains(&canonicalize_url(&u)))
            .unwrap_or(false)
    }

    /// Number of collection pages dispatched for rendering.
    pub fn rendered_count(&self) -> usize {
        self.visited.len()
    }

    /// Turn a rendered listing page into follow-up requests.
    ///
    /// Product-shaped anchors become page fetches, unless the link is
    /// itself a collection page. Collection links (product-shaped or not)
    /// go back through [`Self::consider`], so a sub-category that only
    /// appears after rendering is rendered once too.
    pub fn expand_rendered(
        &self,
        patterns: &PatternLibrary,
        page_url: &str,
        html: &str,
    ) -> Vec<FetchRequest> {
        let links = rendered_links(page_url, html);
        if !links.iter().any(|link| link.product_shaped) {
            tracing::warn!("no product links found on {page_url}");
        }

        let mut requests = Vec::new();
        for RenderedLink { url, product_shaped } in links {
            let url_class = classify_url(patterns, &url);
            if url_class.is_listing && !url_class.is_product {
                if let Some(render) = self.consider(&url, &url_class) {
                    requests.push(FetchRequest::Render(render));
                    continue;
                }
            }
            if product_shaped {
                tracing::debug!("found product link: {url}");
                requests.push(FetchRequest::page(url));
            }
        }
        requests
    }
}

struct RenderedLink {
    url: String,
    /// Matches [`PRODUCT_LINK_SELECTOR`].
    product_shaped: bool,
}

/// Absolute, de-duplicated anchors in document order.
fn rendered_links(page_url: &str, html: &str) -> Vec<RenderedLink> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };
    let (Ok(anchors), Ok(product_sel)) =
        (Selector::parse("a[href]"), Selector::parse(PRODUCT_LINK_SELECTOR))
    else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let mut seen = BTreeSet::new();
    document
        .select(&anchors)
        .filter_map(|a| {
            let mut url = base.join(a.value().attr("href")?.trim()).ok()?;
            if !matches!(url.scheme(), "http" | "https") {
                return None;
            }
            url.set_fragment(None);
            Some(RenderedLink {
                url: url.to_string(),
                product_shaped: product_sel.matches(&a),
            })
        })
        .filter(|link| seen.insert(link.url.clone()))
        .collect()
}
