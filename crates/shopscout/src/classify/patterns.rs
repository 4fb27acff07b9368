// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Versionable URL pattern sets.
//!
//! The built-in sets are loaded at compile time from `default_patterns.json`
//! via `include_str!`, so a deployment can replace them with its own JSON
//! file without touching code. Every pattern is compiled case-insensitive
//! and a set matches when *any* of its patterns is found in the URL.

use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Embedded default pattern document.
const DEFAULT_PATTERNS_JSON: &str = include_str!("default_patterns.json");

/// What a pattern set detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternCategory {
    /// Single product detail pages.
    Product,
    /// Category / collection pages enumerating products.
    Listing,
    /// XML sitemaps.
    Sitemap,
    /// Paths the crawl engine never follows.
    Deny,
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => write!(f, "product"),
            Self::Listing => write!(f, "listing"),
            Self::Sitemap => write!(f, "sitemap"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// An ordered list of compiled regexes sharing one category.
#[derive(Debug, Clone)]
pub struct PatternSet {
    category: PatternCategory,
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile every source pattern case-insensitively.
    pub fn compile<S: AsRef<str>>(
        category: PatternCategory,
        sources: &[S],
    ) -> Result<Self, ConfigError> {
        let patterns = sources
            .iter()
            .map(|src| {
                RegexBuilder::new(src.as_ref())
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ConfigError::InvalidPattern {
                        category,
                        pattern: src.as_ref().to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { category, patterns })
    }

    /// True if any pattern occurs anywhere in `url`.
    pub fn is_match(&self, url: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(url))
    }

    pub fn category(&self) -> PatternCategory {
        self.category
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Source text of each pattern, in order.
    pub fn sources(&self) -> Vec<String> {
        self.patterns.iter().map(|re| re.as_str().to_string()).collect()
    }
}

/// On-disk form of a pattern library. Missing categories fall back to the
/// built-in sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternDocument {
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitemap: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<String>>,
}

/// The four pattern sets the classifier and the crawl filter consult.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    pub version: u32,
    pub product: PatternSet,
    pub listing: PatternSet,
    pub sitemap: PatternSet,
    pub deny: PatternSet,
}

impl PatternLibrary {
    /// The embedded default library.
    pub fn builtin() -> Self {
        let doc: PatternDocument =
            serde_json::from_str(DEFAULT_PATTERNS_JSON).unwrap_or_default();
        Self::compile_document(&doc, None).expect("embedded default patterns are valid regexes")
    }

    /// Build a library from a document, using built-in sets for any category
    /// the document leaves out.
    pub fn from_document(doc: &PatternDocument) -> Result<Self, ConfigError> {
        let defaults: PatternDocument =
            serde_json::from_str(DEFAULT_PATTERNS_JSON).unwrap_or_default();
        Self::compile_document(doc, Some(&defaults))
    }

    /// Load a pattern file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::PatternFile {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: PatternDocument = serde_json::from_str(&text)?;
        let library = Self::from_document(&doc)?;
        tracing::info!(
            "loaded pattern file {} (version {}, {} product / {} listing patterns)",
            path.display(),
            library.version,
            library.product.len(),
            library.listing.len()
        );
        Ok(library)
    }

    /// Serialize back to the on-disk form.
    pub fn to_document(&self) -> PatternDocument {
        PatternDocument {
            version: self.version,
            product: Some(self.product.sources()),
            listing: Some(self.listing.sources()),
            sitemap: Some(self.sitemap.sources()),
            deny: Some(self.deny.sources()),
        }
    }

    fn compile_document(
        doc: &PatternDocument,
        fallback: Option<&PatternDocument>,
    ) -> Result<Self, ConfigError> {
        let pick = |own: &Option<Vec<String>>, other: Option<&Option<Vec<String>>>| {
            own.clone()
                .or_else(|| other.and_then(|o| o.clone()))
                .unwrap_or_default()
        };
        Ok(Self {
            version: doc.version,
            product: PatternSet::compile(
                PatternCategory::Product,
                &pick(&doc.product, fallback.map(|f| &f.product)),
            )?,
            listing: PatternSet::compile(
                PatternCategory::Listing,
                &pick(&doc.listing, fallback.map(|f| &f.listing)),
            )?,
            sitemap: PatternSet::compile(
                PatternCategory::Sitemap,
                &pick(&doc.sitemap, fallback.map(|f| &f.sitemap)),
            )?,
            deny: PatternSet::compile(
                PatternCategory::Deny,
                &pick(&doc.deny, fallback.map(|f| &f.deny)),
            )?,
        })
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_library_loads() {
        let lib = PatternLibrary::builtin();
        assert_eq!(lib.version, 1);
        assert_eq!(lib.product.len(), 13);
        assert_eq!(lib.listing.len(), 7);
        assert_eq!(lib.sitemap.len(), 1);
        assert_eq!(lib.deny.len(), 15);
        assert_eq!(lib.deny.category(), PatternCategory::Deny);
    }

    #[test]
    fn test_matching_is_case_insensitive_or() {
        let set = PatternSet::compile(PatternCategory::Listing, &["/c/", "/shop/"]).unwrap();
        assert!(set.is_match("https://x.com/SHOP/shoes"));
        assert!(set.is_match("https://x.com/c/shoes"));
        assert!(!set.is_match("https://x.com/cart"));
    }

    #[test]
    fn test_partial_document_falls_back_to_defaults() {
        let doc: PatternDocument =
            serde_json::from_str(r#"{"version": 7, "product": ["/artikel/"]}"#).unwrap();
        let lib = PatternLibrary::from_document(&doc).unwrap();
        assert_eq!(lib.version, 7);
        assert_eq!(lib.product.sources(), vec!["/artikel/".to_string()]);
        assert_eq!(lib.listing.len(), PatternLibrary::builtin().listing.len());
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let doc = PatternDocument {
            listing: Some(vec!["/c/(".to_string()]),
            ..Default::default()
        };
        match PatternLibrary::from_document(&doc) {
            Err(ConfigError::InvalidPattern { category, .. }) => {
                assert_eq!(category, PatternCategory::Listing)
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.json");
        std::fs::write(&path, r#"{"version": 2, "deny": ["/wishlist"]}"#).unwrap();
        let lib = PatternLibrary::load(&path).unwrap();
        assert_eq!(lib.version, 2);
        assert!(lib.deny.is_match("https://a.com/wishlist"));
        assert!(!lib.deny.is_match("https://a.com/cart"));

        let missing = PatternLibrary::load(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(ConfigError::PatternFile { .. })));
    }

    #[test]
    fn test_document_round_trip_keeps_sources() {
        let lib = PatternLibrary::builtin();
        let doc = lib.to_document();
        let rebuilt = PatternLibrary::from_document(&doc).unwrap();
        assert_eq!(rebuilt.product.sources(), lib.product.sources());
    }
}
