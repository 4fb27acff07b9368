// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Crawl session: the decision core behind a message boundary.
//!
//! A [`CrawlSession`] owns every piece of mutable crawl state (the dedup
//! tracker and the visited-collection set) together with the read-only
//! pattern library. It is created once per crawl and shared by reference
//! (or `Arc`) with worker tasks. Its methods are synchronous and never
//! perform I/O.

use crate::acquisition::{extract_links, parse_sitemap, EntryKind};
use crate::canonical::tracked_host;
use crate::classify::{classify_page, classify_url, PageClassification, PatternLibrary};
use crate::config::CrawlConfig;
use crate::events::{FetchRequest, PageEvent};
use crate::fallback::RenderFallbackSelector;
use crate::output::ProductReport;
use crate::tracker::{ProductRecord, ProductTracker, Registration};
use url::Url;

/// What the core produced for one page event.
#[derive(Debug, Default)]
pub struct PageOutcome {
    /// Follow-up work for the crawl engine.
    pub requests: Vec<FetchRequest>,
    /// Set when the page was confirmed and newly registered.
    pub product: Option<ProductRecord>,
    /// Set for fetched pages that went through classification.
    pub classification: Option<PageClassification>,
}

/// Shared state and decision logic for one crawl.
#[derive(Debug)]
pub struct CrawlSession {
    patterns: PatternLibrary,
    tracker: ProductTracker,
    fallback: RenderFallbackSelector,
}

impl CrawlSession {
    pub fn new(config: &CrawlConfig, patterns: PatternLibrary) -> Self {
        Self {
            patterns,
            tracker: ProductTracker::new(&config.domains),
            fallback: RenderFallbackSelector::new(&config.js_rendered_domains, config.render_wait),
        }
    }

    pub fn patterns(&self) -> &PatternLibrary {
        &self.patterns
    }

    pub fn tracker(&self) -> &ProductTracker {
        &self.tracker
    }

    pub fn fallback(&self) -> &RenderFallbackSelector {
        &self.fallback
    }

    /// Feed one event into the core.
    pub fn handle(&self, event: PageEvent) -> PageOutcome {
        match event {
            PageEvent::Fetched { url, html } => self.handle_fetched(&url, &html),
            PageEvent::Rendered { url, html } => {
                tracing::info!("parsing rendered collection page: {url}");
                PageOutcome {
                    requests: self.fallback.expand_rendered(&self.patterns, &url, &html),
                    ..PageOutcome::default()
                }
            }
            PageEvent::RenderFailed { url, reason } => {
                tracing::warn!("rendering failed for {url}: {reason}");
                PageOutcome::default()
            }
            PageEvent::SitemapFetched { url, body } => PageOutcome {
                requests: self.expand_sitemap(&url, &body),
                ..PageOutcome::default()
            },
        }
    }

    fn handle_fetched(&self, url: &str, html: &str) -> PageOutcome {
        tracing::debug!("parsing page: {url}");
        let classification = classify_page(&self.patterns, url, html);

        let mut requests = Vec::new();
        if let Some(render) = self.fallback.consider(url, &classification.url_class) {
            requests.push(FetchRequest::Render(render));
        }

        let product = if classification.is_confirmed_product() {
            self.register(url)
        } else {
            None
        };

        PageOutcome {
            requests,
            product,
            classification: Some(classification),
        }
    }

    fn register(&self, url: &str) -> Option<ProductRecord> {
        let Some(domain) = Url::parse(url).ok().as_ref().and_then(tracked_host) else {
            tracing::warn!("confirmed product has no usable host: {url}");
            return None;
        };
        match self.tracker.try_register(&domain, url) {
            Registration::New(record) => {
                tracing::info!("found product: {url}");
                Some(record)
            }
            Registration::Duplicate => {
                tracing::debug!("duplicate product skipped: {url}");
                None
            }
            Registration::UntrackedDomain(domain) => {
                tracing::warn!("domain {domain} from {url} is not a tracked domain");
                None
            }
            Registration::InvalidUrl(raw) => {
                tracing::warn!("cannot canonicalize confirmed product URL {raw}");
                None
            }
        }
    }

    /// Page fetches for `<url>` entries and sitemap fetches for nested
    /// sitemaps, most recently modified first. Entries without `lastmod`
    /// keep document order after the dated ones. A malformed sitemap
    /// yields nothing.
    pub fn expand_sitemap(&self, url: &str, body: &str) -> Vec<FetchRequest> {
        tracing::info!("parsing sitemap: {url}");
        let mut entries = match parse_sitemap(body) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("unreadable sitemap {url}: {e}");
                return Vec::new();
            }
        };
        entries.sort_by(|a, b| b.lastmod.cmp(&a.lastmod));
        if let Some(newest) = entries.first().and_then(|e| e.lastmod) {
            tracing::debug!("{url}: {} entries, newest modified {newest}", entries.len());
        }
        let base = Url::parse(url).ok();
        entries
            .into_iter()
            .filter_map(|entry| {
                let loc = match &base {
                    Some(base) => base.join(&entry.url).ok()?,
                    None => Url::parse(&entry.url).ok()?,
                };
                Some(match entry.kind {
                    EntryKind::Page => FetchRequest::page(loc.to_string()),
                    EntryKind::Sitemap => FetchRequest::sitemap(loc.to_string()),
                })
            })
            .collect()
    }

    /// True if the crawl engine may schedule `url`: its host is tracked and
    /// no deny pattern matches.
    pub fn allows(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let tracked = tracked_host(url).is_some_and(|host| self.tracker.is_tracked(&host));
        tracked && !self.patterns.deny.is_match(url.as_str())
    }

    /// Links to follow from an ordinary fetched page. Sitemap-shaped links
    /// become sitemap fetches.
    pub fn follow_links(&self, page_url: &str, html: &str) -> Vec<FetchRequest> {
        let Ok(base) = Url::parse(page_url) else {
            return Vec::new();
        };
        extract_links(&base, html)
            .into_iter()
            .filter(|link| self.allows(link))
            .map(|link| {
                if classify_url(&self.patterns, link.as_str()).is_sitemap {
                    FetchRequest::sitemap(link.to_string())
                } else {
                    FetchRequest::page(link.to_string())
                }
            })
            .collect()
    }

    /// Build the grouped report from the current tracker state.
    pub fn report(&self) -> ProductReport {
        ProductReport::from_tracker(&self.tracker)
    }
}
