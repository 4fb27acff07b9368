// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Messages crossing the boundary between the crawl engine and the
//! decision core.
//!
//! The engine pushes [`PageEvent`]s (content is available) into the core;
//! the core answers with [`FetchRequest`]s (something else should be
//! fetched or rendered). Both are plain data so they can travel over
//! channels between tasks.

use serde::{Deserialize, Serialize};

/// Content delivered by the crawl engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PageEvent {
    /// An ordinary HTTP fetch completed with HTML.
    Fetched { url: String, html: String },
    /// A listing page was rendered by the browser.
    Rendered { url: String, html: String },
    /// Rendering timed out or failed.
    RenderFailed { url: String, reason: String },
    /// A sitemap document was fetched.
    SitemapFetched { url: String, body: String },
}

impl PageEvent {
    pub fn url(&self) -> &str {
        match self {
            Self::Fetched { url, .. }
            | Self::Rendered { url, .. }
            | Self::RenderFailed { url, .. }
            | Self::SitemapFetched { url, .. } => url,
        }
    }
}

/// Ask the browser collaborator to render a page, waiting until at least one
/// element matching `wait_for_selector` exists or `timeout_ms` elapses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderRequest {
    pub url: String,
    pub wait_for_selector: String,
    pub timeout_ms: u64,
}

/// Work the core hands back to the crawl engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FetchRequest {
    /// Fetch and classify an ordinary page.
    Page { url: String },
    /// Fetch and expand a sitemap.
    Sitemap { url: String },
    /// Render a listing page in the browser.
    Render(RenderRequest),
}

impl FetchRequest {
    pub fn page(url: impl Into<String>) -> Self {
        Self::Page { url: url.into() }
    }

    pub fn sitemap(url: impl Into<String>) -> Self {
        Self::Sitemap { url: url.into() }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Page { url } | Self::Sitemap { url } => url,
            Self::Render(req) => &req.url,
        }
    }

    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_request_serialization() {
        let req = FetchRequest::Render(RenderRequest {
            url: "https://westside.com/collections/all".to_string(),
            wait_for_selector: "a[href*=\"/products/\"]".to_string(),
            timeout_ms: 5000,
        });
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"type\":\"Render\""));
        assert!(json.contains("5000"));
        let parsed: FetchRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, req);
        assert!(parsed.is_render());
    }

    #[test]
    fn test_urls() {
        assert_eq!(FetchRequest::page("https://a.com/x").url(), "https://a.com/x");
        let event = PageEvent::RenderFailed {
            url: "https://a.com/c/1".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(event.url(), "https://a.com/c/1");
    }
}
