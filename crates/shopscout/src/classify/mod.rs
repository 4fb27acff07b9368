// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page classification: URL patterns, HTML signals, and the verdict that
//! combines them.

pub mod decision;
pub mod patterns;
pub mod signals;
pub mod url_classifier;

pub use decision::{classify_page, decide, PageClassification, SignalCheck, Verdict};
pub use patterns::{PatternCategory, PatternLibrary, PatternSet};
pub use signals::{extract_signals, extract_signals_from_html, PageSignals};
pub use url_classifier::{classify_url, UrlClass, UrlKind};
