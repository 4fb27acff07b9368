// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Crawl configuration.
//!
//! Defaults mirror a polite crawl: 16 requests in flight overall, 4 per
//! domain, half a second between requests to the same domain and no depth
//! limit.

use crate::canonical::normalize_domain;
use crate::error::ConfigError;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Domains whose listing pages only expose product links after scripts run.
pub const DEFAULT_JS_RENDERED_DOMAINS: &[&str] = &["westside.com", "tatacliq.com"];

/// Default grouped output file.
pub const DEFAULT_OUTPUT_FILE: &str = "grouped_products.json";

/// Desktop Chrome user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5_2) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/123.0.0.0 Safari/537.36";

/// Everything the crawl needs to know at startup.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Tracked domains, normalized, in the order given.
    pub domains: Vec<String>,
    /// Domains whose listing pages go through the browser renderer.
    pub js_rendered_domains: BTreeSet<String>,
    /// Explicit seed URLs. Empty means `https://<domain>/` for each domain.
    pub start_urls: Vec<Url>,
    /// Also seed `<origin>/sitemap.xml` for each seed.
    pub seed_sitemaps: bool,
    /// Maximum requests in flight across all domains.
    pub max_concurrency: usize,
    /// Maximum requests in flight per domain.
    pub per_domain_concurrency: usize,
    /// Pause before each request, per slot.
    pub download_delay: Duration,
    /// Maximum link depth from a seed. `None` is unlimited.
    pub depth_limit: Option<u32>,
    /// Maximum number of page fetches. `None` is unlimited.
    pub max_pages: Option<usize>,
    /// HTTP request timeout.
    pub request_timeout: Duration,
    /// Bounded wait for product links to appear on a rendered listing page.
    pub render_wait: Duration,
    pub user_agent: String,
    pub output_path: PathBuf,
    /// Optional JSON pattern file replacing the built-in pattern sets.
    pub pattern_file: Option<PathBuf>,
    /// Launch a headless browser for rendering fallback.
    pub use_browser: bool,
}

impl CrawlConfig {
    /// Build a configuration from a comma-separated domain list.
    ///
    /// An empty list is a hard error: there are no default domains.
    pub fn new(domain_list: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            domains: parse_domain_list(domain_list)?,
            js_rendered_domains: DEFAULT_JS_RENDERED_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            start_urls: Vec::new(),
            seed_sitemaps: true,
            max_concurrency: 16,
            per_domain_concurrency: 4,
            download_delay: Duration::from_millis(500),
            depth_limit: None,
            max_pages: None,
            request_timeout: Duration::from_secs(15),
            render_wait: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            pattern_file: None,
            use_browser: true,
        })
    }

    /// Replace the JS-rendered domain set from a comma-separated list.
    /// An empty list disables rendering fallback entirely.
    pub fn with_js_rendered_domains(mut self, list: &str) -> Result<Self, ConfigError> {
        let mut set = BTreeSet::new();
        for raw in list.split(',').filter(|d| !d.trim().is_empty()) {
            let domain =
                normalize_domain(raw).ok_or_else(|| ConfigError::InvalidDomain(raw.to_string()))?;
            set.insert(domain);
        }
        self.js_rendered_domains = set;
        Ok(self)
    }

    /// Replace the default seeds with explicit start URLs.
    pub fn with_start_urls<S: AsRef<str>>(mut self, urls: &[S]) -> Result<Self, ConfigError> {
        self.start_urls = urls
            .iter()
            .map(|u| {
                Url::parse(u.as_ref())
                    .ok()
                    .filter(|url| matches!(url.scheme(), "http" | "https"))
                    .ok_or_else(|| ConfigError::InvalidStartUrl(u.as_ref().to_string()))
            })
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Reject limits that would stall the crawl.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domains.is_empty() {
            return Err(ConfigError::NoDomains);
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroLimit("concurrency"));
        }
        if self.per_domain_concurrency == 0 {
            return Err(ConfigError::ZeroLimit("per-domain concurrency"));
        }
        Ok(())
    }

    /// Page seeds: explicit start URLs, or each domain's home page.
    pub fn seed_urls(&self) -> Vec<Url> {
        if !self.start_urls.is_empty() {
            return self.start_urls.clone();
        }
        self.domains
            .iter()
            .filter_map(|d| Url::parse(&format!("https://{d}/")).ok())
            .collect()
    }

    /// Sitemap seeds derived from the page seeds' origins.
    pub fn sitemap_seed_urls(&self) -> Vec<Url> {
        if !self.seed_sitemaps {
            return Vec::new();
        }
        let mut seen = BTreeSet::new();
        self.seed_urls()
            .iter()
            .filter_map(|u| u.join("/sitemap.xml").ok())
            .filter(|u| seen.insert(u.to_string()))
            .collect()
    }
}

/// Split, normalize and de-duplicate a comma-separated domain list.
pub fn parse_domain_list(list: &str) -> Result<Vec<String>, ConfigError> {
    let mut domains: Vec<String> = Vec::new();
    for raw in list.split(',').filter(|d| !d.trim().is_empty()) {
        let domain =
            normalize_domain(raw).ok_or_else(|| ConfigError::InvalidDomain(raw.to_string()))?;
        if !domains.contains(&domain) {
            domains.push(domain);
        }
    }
    if domains.is_empty() {
        return Err(ConfigError::NoDomains);
    }
    Ok(domains)
}
