// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parse sitemap.xml and sitemap index files.

use anyhow::Result;
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Whether a `<loc>` points at a page or at another sitemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// `<url><loc>` in a `urlset`.
    Page,
    /// `<sitemap><loc>` in a `sitemapindex`.
    Sitemap,
}

/// An entry from a sitemap.
#[derive(Debug, Clone)]
pub struct SitemapEntry {
    pub url: String,
    pub kind: EntryKind,
    pub lastmod: Option<DateTime<Utc>>,
}

/// Parse a sitemap XML string into entries.
/// Handles both `urlset` and `sitemapindex`; nested sitemaps are returned as
/// [`EntryKind::Sitemap`] entries for the caller to fetch.
pub fn parse_sitemap(xml: &str) -> Result<Vec<SitemapEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut entries = Vec::new();
    let mut buf = Vec::new();

    let mut in_url = false;
    let mut in_sitemap = false;
    let mut current_tag = String::new();
    let mut current_loc = String::new();
    let mut current_lastmod = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "url" => {
                        in_url = true;
                        current_loc.clear();
                        current_lastmod.clear();
                    }
                    "sitemap" => {
                        in_sitemap = true;
                        current_loc.clear();
                        current_lastmod.clear();
                    }
                    _ => {
                        current_tag = name;
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                let kind = match name.as_str() {
                    "url" if in_url => {
                        in_url = false;
                        Some(EntryKind::Page)
                    }
                    "sitemap" if in_sitemap => {
                        in_sitemap = false;
                        Some(EntryKind::Sitemap)
                    }
                    _ => None,
                };
                if let Some(kind) = kind {
                    if !current_loc.is_empty() {
                        entries.push(SitemapEntry {
                            url: current_loc.clone(),
                            kind,
                            lastmod: parse_date(&current_lastmod),
                        });
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if (in_url || in_sitemap) && current_tag == "loc" {
                    current_loc = text.trim().to_string();
                } else if (in_url || in_sitemap) && current_tag == "lastmod" {
                    current_lastmod = text.trim().to_string();
                }
            }
            Ok(Event::CData(e)) => {
                if (in_url || in_sitemap) && current_tag == "loc" {
                    current_loc = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow::anyhow!("XML parse error: {e}"));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = s.parse::<DateTime<Utc>>() {
        return Some(dt);
    }
    if let Ok(dt) = chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
        return Some(dt.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
