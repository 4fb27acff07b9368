// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! `shopscout classify <url>`: run the decision core on a single page.

use anyhow::{Context, Result};
use shopscout::classify::{classify_page, PageClassification};
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

/// Classify `url`. The markup comes from `html_file` (`-` reads stdin);
/// without one, only the URL is classified and the page counts as empty.
pub fn run(url: &str, html_file: Option<&Path>, patterns: Option<&Path>) -> Result<()> {
    let library = super::load_patterns(patterns)?;

    let html = match html_file {
        Some(path) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read HTML from stdin")?;
            buf
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => String::new(),
    };

    let classification = classify_page(&library, url, &html);

    if super::output::is_json() {
        super::output::print_json(&serde_json::to_value(&classification)?);
        return Ok(());
    }
    print!("{}", render(url, &classification, super::output::is_quiet()));
    Ok(())
}

fn verdict_label(classification: &PageClassification) -> &'static str {
    if classification.verdict.confirmed {
        "PRODUCT"
    } else {
        "not a product"
    }
}

/// Human-readable report. Quiet mode prints the verdict line only.
fn render(url: &str, classification: &PageClassification, quiet: bool) -> String {
    let mut out = String::new();
    if quiet {
        let _ = writeln!(out, "{url}\t{}", verdict_label(classification));
        return out;
    }

    let class = &classification.url_class;
    let _ = writeln!(out, "URL:        {url}");
    let _ = writeln!(out, "Kind:       {}", class.kind());
    let _ = writeln!(out, "Product:    {}", class.is_product);
    let _ = writeln!(out, "Listing:    {}", class.is_listing);
    let _ = writeln!(out, "Denied:     {}", class.is_denied);
    match &classification.signals {
        Some(signals) => {
            let _ = writeln!(out, "Signals:");
            let _ = writeln!(out, "  structured markup: {}", signals.has_structured_product_markup);
            let _ = writeln!(out, "  add to cart:       {}", signals.has_add_to_cart);
            let _ = writeln!(out, "  price element:     {}", signals.has_price_element);
            let _ = writeln!(out, "  plausible title:   {}", signals.has_plausible_title);
        }
        None => {
            let _ = writeln!(out, "Signals:    skipped (listing URL)");
        }
    }
    let verdict = &classification.verdict;
    match verdict.decided_by {
        Some(check) => {
            let _ = writeln!(
                out,
                "Verdict:    {} ({check}, confidence {:.2})",
                verdict_label(classification),
                verdict.confidence
            );
        }
        None => {
            let _ = writeln!(out, "Verdict:    not a product");
        }
    }
    out
}
