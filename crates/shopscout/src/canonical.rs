// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! URL canonicalization and host normalization.
//!
//! The canonical form is the dedup key for confirmed products and for the
//! crawl driver's request filter. Two raw URLs that differ only in scheme or
//! host case, a default port, a `www.` prefix, the fragment, query parameter
//! order, tracking parameters, or a trailing slash on a non-root path map to
//! the same string.

use url::Url;

/// Query parameters that never change which resource a URL points to.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "gclid",
    "fbclid",
    "mc_cid",
    "mc_eid",
];

/// Canonicalize a raw URL string. Returns `None` when the input does not
/// parse as an absolute URL.
pub fn canonicalize(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    Some(canonicalize_url(&url))
}

/// Canonicalize an already-parsed URL.
///
/// Scheme and host lowercasing and default-port removal are done by the
/// `url` parser itself; this adds the rest.
pub fn canonicalize_url(url: &Url) -> String {
    let mut canonical = url.clone();
    canonical.set_fragment(None);

    if let Some(host) = canonical.host_str().map(str::to_ascii_lowercase) {
        if let Some(stripped) = host.strip_prefix("www.") {
            if !stripped.is_empty() {
                let _ = canonical.set_host(Some(stripped));
            }
        }
    }

    let path = canonical.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        canonical.set_path(if trimmed.is_empty() { "/" } else { trimmed });
    }

    if canonical.query().is_some() {
        let mut params: Vec<(String, String)> = canonical
            .query_pairs()
            .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.to_ascii_lowercase().as_str()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if params.is_empty() {
            canonical.set_query(None);
        } else {
            params.sort();
            canonical.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    canonical.into()
}

/// The tracked-domain form of a URL's host: lowercase, no port, no `www.`.
pub fn tracked_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Normalize a user-supplied domain (`"https://www.Shop.com/"`, `"shop.com"`)
/// into the tracked-domain form.
pub fn normalize_domain(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let url = Url::parse(&candidate).ok()?;
    tracked_host(&url)
}
