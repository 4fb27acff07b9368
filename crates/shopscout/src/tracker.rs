// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-domain record of confirmed products, keyed by canonical URL.
//!
//! The set of tracked domains is fixed at construction, so the outer map is
//! never mutated and needs no lock. Each domain's inner map is a `DashMap`
//! and registration goes through its entry API, which makes check-and-insert
//! a single atomic step: two workers confirming the same canonical URL at
//! once get exactly one `New`.

use crate::canonical::{canonicalize, normalize_domain};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A product confirmed exactly once per canonical URL per domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub domain: String,
    pub canonical_url: String,
    pub raw_url: String,
}

/// Result of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// First time this canonical URL was seen for the domain.
    New(ProductRecord),
    /// Already registered; the caller must not emit it again.
    Duplicate,
    /// The domain is not one of the tracked domains.
    UntrackedDomain(String),
    /// The raw URL could not be parsed.
    InvalidUrl(String),
}

impl Registration {
    pub fn is_new(&self) -> bool {
        matches!(self, Registration::New(_))
    }
}

/// Canonical URL → first raw URL seen, per tracked domain.
#[derive(Debug, Default)]
pub struct ProductTracker {
    domains: HashMap<String, DashMap<String, String>>,
}

impl ProductTracker {
    /// Track the given domains. Inputs are normalized (`www.` and scheme
    /// stripped); unparseable entries are ignored.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .filter_map(|d| normalize_domain(d.as_ref()))
            .map(|d| (d, DashMap::new()))
            .collect();
        Self { domains }
    }

    pub fn is_tracked(&self, domain: &str) -> bool {
        normalize_domain(domain).is_some_and(|d| self.domains.contains_key(&d))
    }

    /// Register `raw_url` under `domain`. Returns `true` only when newly
    /// added.
    pub fn register(&self, domain: &str, raw_url: &str) -> bool {
        self.try_register(domain, raw_url).is_new()
    }

    /// Register `raw_url` under `domain`, reporting why it was not added.
    pub fn try_register(&self, domain: &str, raw_url: &str) -> Registration {
        let Some(domain) = normalize_domain(domain) else {
            return Registration::UntrackedDomain(domain.to_string());
        };
        let Some(products) = self.domains.get(&domain) else {
            return Registration::UntrackedDomain(domain);
        };
        let Some(canonical_url) = canonicalize(raw_url) else {
            return Registration::InvalidUrl(raw_url.to_string());
        };

        match products.entry(canonical_url.clone()) {
            Entry::Occupied(_) => Registration::Duplicate,
            Entry::Vacant(slot) => {
                slot.insert(raw_url.to_string());
                Registration::New(ProductRecord {
                    domain,
                    canonical_url,
                    raw_url: raw_url.to_string(),
                })
            }
        }
    }

    /// Number of products registered for `domain`.
    pub fn count(&self, domain: &str) -> usize {
        normalize_domain(domain)
            .and_then(|d| self.domains.get(&d).map(|products| products.len()))
            .unwrap_or(0)
    }

    /// Total products across all domains.
    pub fn total(&self) -> usize {
        self.domains.values().map(|products| products.len()).sum()
    }

    /// Tracked domains, sorted.
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.domains.keys().cloned().collect();
        domains.sort();
        domains
    }

    /// Sorted raw URLs per domain. Every tracked domain is present.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.domains
            .iter()
            .map(|(domain, products)| {
                let mut urls: Vec<String> =
                    products.iter().map(|entry| entry.value().clone()).collect();
                urls.sort();
                urls.dedup();
                (domain.clone(), urls)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_register_is_idempotent() {
        let tracker = ProductTracker::new(["example.com"]);
        assert!(tracker.register("example.com", "https://example.com/products/a"));
        assert!(!tracker.register("example.com", "https://example.com/products/a"));
        assert!(!tracker.register("example.com", "https://example.com/products/a"));
        assert_eq!(tracker.count("example.com"), 1);
    }

    #[test]
    fn test_canonical_variants_are_duplicates() {
        let tracker = ProductTracker::new(["example.com"]);
        assert!(tracker.register("example.com", "https://www.example.com:443/p/1?b=2&a=1"));
        assert!(!tracker.register("example.com", "https://example.com/p/1?a=1&b=2"));
        assert!(!tracker.register("www.example.com", "https://EXAMPLE.com/p/1/?a=1&b=2#top"));
        assert_eq!(tracker.total(), 1);
        // The first raw URL is kept.
        assert_eq!(
            tracker.snapshot()["example.com"],
            vec!["https://www.example.com:443/p/1?b=2&a=1".to_string()]
        );
    }

    #[test]
    fn test_untracked_domain_rejected() {
        let tracker = ProductTracker::new(["example.com"]);
        assert_eq!(
            tracker.try_register("other.com", "https://other.com/p/1"),
            Registration::UntrackedDomain("other.com".to_string())
        );
        assert_eq!(tracker.total(), 0);
        assert!(!tracker.is_tracked("other.com"));
        assert!(tracker.is_tracked("www.example.com"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let tracker = ProductTracker::new(["example.com"]);
        assert!(matches!(
            tracker.try_register("example.com", "/relative/path"),
            Registration::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_snapshot_lists_every_domain_sorted() {
        let tracker = ProductTracker::new(["b.com", "a.com"]);
        tracker.register("b.com", "https://b.com/p/z");
        tracker.register("b.com", "https://b.com/p/a");
        let snap = tracker.snapshot();
        assert_eq!(snap.keys().collect::<Vec<_>>(), vec!["a.com", "b.com"]);
        assert!(snap["a.com"].is_empty());
        assert_eq!(snap["b.com"], vec!["https://b.com/p/a", "https://b.com/p/z"]);
        assert_eq!(tracker.domains(), vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_concurrent_registration_yields_one_new() {
        let tracker = Arc::new(ProductTracker::new(["example.com"]));
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    let url = if i % 2 == 0 {
                        "https://www.example.com/products/red-shoe"
                    } else {
                        "https://example.com/products/red-shoe/"
                    };
                    tracker.register("example.com", url)
                })
            })
            .collect();
        let new_count = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|added| *added)
            .count();
        assert_eq!(new_count, 1);
        assert_eq!(tracker.count("example.com"), 1);
    }
}
