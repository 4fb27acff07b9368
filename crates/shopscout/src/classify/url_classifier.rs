// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Classify URLs by pattern.

use super::patterns::PatternLibrary;
use serde::Serialize;
use std::fmt;

/// Result of matching one URL against every pattern set.
///
/// A URL may be both product-like and listing-like (Shopify's
/// `/collections/x/products/y`), either one, or neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UrlClass {
    pub is_product: bool,
    pub is_listing: bool,
    pub is_sitemap: bool,
    pub is_denied: bool,
}

/// Coarse kind of a URL, product taking precedence over listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlKind {
    ProductPath,
    ListingPath,
    SitemapPath,
    Other,
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProductPath => write!(f, "product"),
            Self::ListingPath => write!(f, "listing"),
            Self::SitemapPath => write!(f, "sitemap"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl UrlClass {
    pub fn kind(&self) -> UrlKind {
        if self.is_product {
            UrlKind::ProductPath
        } else if self.is_listing {
            UrlKind::ListingPath
        } else if self.is_sitemap {
            UrlKind::SitemapPath
        } else {
            UrlKind::Other
        }
    }

    /// Listing-shaped with no product indicator.
    pub fn is_listing_only(&self) -> bool {
        self.is_listing && !self.is_product
    }

    /// HTML is inspected whenever the URL looks like a product or is not
    /// clearly a listing page.
    pub fn needs_html_analysis(&self) -> bool {
        self.is_product || !self.is_listing
    }
}

/// Classify a URL against the library. Never fails; no match is `Other`.
pub fn classify_url(patterns: &PatternLibrary, url: &str) -> UrlClass {
    UrlClass {
        is_product: patterns.product.is_match(url),
        is_listing: patterns.listing.is_match(url),
        is_sitemap: patterns.sitemap.is_match(url),
        is_denied: patterns.deny.is_match(url),
    }
}
