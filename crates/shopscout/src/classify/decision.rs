// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page decision engine: URL class + HTML signals → product verdict.
//!
//! # Decision rule
//!
//! HTML is analyzed only when the URL is product-like or not clearly a
//! listing page; listing-only URLs are never confirmed. Otherwise the named
//! checks in [`SignalCheck::ORDERED`] run in order and the first one that
//! fires decides, contributing its confidence:
//!
//! | check              | confidence |
//! |--------------------|-----------:|
//! | structured markup  | 0.99       |
//! | add-to-cart        | 0.90       |
//! | price + title      | 0.70       |
//!
//! A page is confirmed when the deciding confidence reaches
//! [`CONFIRMATION_THRESHOLD`]. Price alone never fires: listing pages show
//! prices too.

use super::patterns::PatternLibrary;
use super::signals::{extract_signals, PageSignals};
use super::url_classifier::{classify_url, UrlClass};
use scraper::Html;
use serde::Serialize;
use std::fmt;

/// Minimum confidence for a positive verdict.
pub const CONFIRMATION_THRESHOLD: f32 = 0.5;

/// A named, independently testable product check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCheck {
    StructuredMarkup,
    AddToCart,
    PriceWithTitle,
}

impl SignalCheck {
    /// Evaluation order, highest precision first.
    pub const ORDERED: [SignalCheck; 3] = [
        SignalCheck::StructuredMarkup,
        SignalCheck::AddToCart,
        SignalCheck::PriceWithTitle,
    ];

    pub fn confidence(self) -> f32 {
        match self {
            Self::StructuredMarkup => 0.99,
            Self::AddToCart => 0.90,
            Self::PriceWithTitle => 0.70,
        }
    }

    pub fn fires(self, signals: &PageSignals) -> bool {
        match self {
            Self::StructuredMarkup => signals.has_structured_product_markup,
            Self::AddToCart => signals.has_add_to_cart,
            Self::PriceWithTitle => signals.has_price_element && signals.has_plausible_title,
        }
    }
}

impl fmt::Display for SignalCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuredMarkup => write!(f, "structured product markup"),
            Self::AddToCart => write!(f, "add-to-cart control"),
            Self::PriceWithTitle => write!(f, "price with plausible title"),
        }
    }
}

/// Outcome of the decision for one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    pub confirmed: bool,
    pub confidence: f32,
    /// The check that decided, if any fired.
    pub decided_by: Option<SignalCheck>,
    /// False when the URL was listing-only and HTML was not inspected.
    pub html_analyzed: bool,
}

impl Verdict {
    fn skipped() -> Self {
        Self {
            confirmed: false,
            confidence: 0.0,
            decided_by: None,
            html_analyzed: false,
        }
    }
}

/// Apply the decision rule. `signals` is only consulted when the URL class
/// calls for HTML analysis.
pub fn evaluate(url_class: &UrlClass, signals: &PageSignals) -> Verdict {
    if !url_class.needs_html_analysis() {
        return Verdict::skipped();
    }
    let decided_by = SignalCheck::ORDERED
        .into_iter()
        .find(|check| check.fires(signals));
    let confidence = decided_by.map(SignalCheck::confidence).unwrap_or(0.0);
    Verdict {
        confirmed: confidence >= CONFIRMATION_THRESHOLD,
        confidence,
        decided_by,
        html_analyzed: true,
    }
}

/// Everything learned about one fetched page.
#[derive(Debug, Clone, Serialize)]
pub struct PageClassification {
    pub url: String,
    pub url_class: UrlClass,
    /// `None` when HTML analysis was skipped.
    pub signals: Option<PageSignals>,
    pub verdict: Verdict,
}

impl PageClassification {
    pub fn is_product_by_url(&self) -> bool {
        self.url_class.is_product
    }

    pub fn is_listing_by_url(&self) -> bool {
        self.url_class.is_listing
    }

    pub fn is_confirmed_product(&self) -> bool {
        self.verdict.confirmed
    }
}

/// Classify a page from its URL and raw markup.
pub fn classify_page(patterns: &PatternLibrary, url: &str, html: &str) -> PageClassification {
    let url_class = classify_url(patterns, url);
    if !url_class.needs_html_analysis() {
        return PageClassification {
            url: url.to_string(),
            url_class,
            signals: None,
            verdict: Verdict::skipped(),
        };
    }
    let document = Html::parse_document(html);
    let signals = extract_signals(&document);
    let verdict = evaluate(&url_class, &signals);
    PageClassification {
        url: url.to_string(),
        url_class,
        signals: Some(signals),
        verdict,
    }
}

/// `true` when the page is a confirmed product.
pub fn decide(patterns: &PatternLibrary, url: &str, html: &str) -> bool {
    classify_page(patterns, url, html).is_confirmed_product()
}
