// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Product-page evidence extracted from raw HTML.
//!
//! Four independent signals are read from an already-fetched document:
//! schema.org Product markup (microdata or JSON-LD), add-to-cart controls,
//! price elements, and a plausible product heading. Extraction never touches
//! the network. `scraper` types are `!Send`, so async callers should run
//! this inside `tokio::task::spawn_blocking`.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::Value;

/// Microdata marking an element as a schema.org Product.
const PRODUCT_MICRODATA_SELECTOR: &str = r#"[itemtype*="schema.org/Product"]"#;

const JSONLD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// Attribute-based add-to-cart indicators.
const ADD_TO_CART_SELECTORS: &[&str] = &[
    r#"button[id*="add-to-cart"]"#,
    r#"button[class*="add-to-cart"]"#,
    r#"button[data-action*="add-to-cart"]"#,
    r#"input[type="submit"][value*="Add to Cart"]"#,
    r#"form[action*="cart/add"]"#,
];

/// Button labels that only show up on purchasable items.
const ADD_TO_CART_BUTTON_TEXT: &[&str] = &["Add to Bag", "Buy Now"];

const PRICE_SELECTORS: &[&str] = &[
    r#"[class*="price"]"#,
    r#"[id*="price"]"#,
    r#"[itemprop="price"]"#,
    ".product-price",
    ".Price--final",
    ".selling-price",
];

/// A product heading has more than one word and fewer than fifteen.
const TITLE_MIN_WORDS: usize = 2;
const TITLE_MAX_WORDS: usize = 14;

/// Signals read from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageSignals {
    pub has_structured_product_markup: bool,
    pub has_add_to_cart: bool,
    pub has_price_element: bool,
    pub has_plausible_title: bool,
    /// Whitespace-normalized text of the primary heading, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

/// Parse `html` and extract every signal.
pub fn extract_signals_from_html(html: &str) -> PageSignals {
    let document = Html::parse_document(html);
    extract_signals(&document)
}

/// Extract every signal from a parsed document.
pub fn extract_signals(document: &Html) -> PageSignals {
    let heading = primary_heading(document);
    PageSignals {
        has_structured_product_markup: has_product_microdata(document)
            || has_jsonld_product(document),
        has_add_to_cart: has_add_to_cart(document),
        has_price_element: matches_any(document, PRICE_SELECTORS),
        has_plausible_title: heading.as_deref().is_some_and(is_plausible_title),
        heading,
    }
}

/// A heading is plausible when it is neither empty nor a one-word generic
/// label ("Shop", "Results") nor an implausibly long string.
pub fn is_plausible_title(text: &str) -> bool {
    let words = text.split_whitespace().count();
    (TITLE_MIN_WORDS..=TITLE_MAX_WORDS).contains(&words)
}

// ── Structured data ──────────────────────────────────────────────────────────

fn has_product_microdata(document: &Html) -> bool {
    matches_any(document, &[PRODUCT_MICRODATA_SELECTOR])
}

fn has_jsonld_product(document: &Html) -> bool {
    let Ok(sel) = Selector::parse(JSONLD_SELECTOR) else {
        return false;
    };
    for element in document.select(&sel) {
        let text: String = element.text().collect();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => {
                if jsonld_declares_product(&value) {
                    return true;
                }
            }
            Err(e) => {
                tracing::debug!("skipping malformed JSON-LD block: {e}");
            }
        }
    }
    false
}

/// True if the JSON-LD document, a top-level array element, or an `@graph`
/// member has `@type` Product.
pub fn jsonld_declares_product(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(is_product_object),
        Value::Object(_) => {
            is_product_object(value)
                || value
                    .get("@graph")
                    .and_then(Value::as_array)
                    .is_some_and(|graph| graph.iter().any(is_product_object))
        }
        _ => false,
    }
}

fn is_product_object(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "Product",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Product")),
        _ => false,
    }
}

// ── Purchase affordances ─────────────────────────────────────────────────────

fn has_add_to_cart(document: &Html) -> bool {
    if matches_any(document, ADD_TO_CART_SELECTORS) {
        return true;
    }
    let Ok(buttons) = Selector::parse("button") else {
        return false;
    };
    document.select(&buttons).any(|button| {
        let label = element_text(&button);
        ADD_TO_CART_BUTTON_TEXT
            .iter()
            .any(|needle| label.contains(needle))
    })
}

// ── Headings ─────────────────────────────────────────────────────────────────

fn primary_heading(document: &Html) -> Option<String> {
    let sel = Selector::parse("h1").ok()?;
    let h1 = document.select(&sel).next()?;
    let text = element_text(&h1);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn matches_any(document: &Html, selectors: &[&str]) -> bool {
    selectors
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .any(|sel| document.select(&sel).next().is_some())
}

/// Descendant text joined and whitespace-collapsed.
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonld_product_object() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@context": "https://schema.org", "@type": "Product", "name": "Red Shoe"}
        </script></head><body></body></html>"#;
        assert!(extract_signals_from_html(html).has_structured_product_markup);
    }

    #[test]
    fn test_jsonld_product_in_top_level_array() {
        let html = r#"<script type="application/ld+json">
            [{"@type": "BreadcrumbList"}, {"@type": "Product", "name": "Kurta"}]
        </script>"#;
        assert!(extract_signals_from_html(html).has_structured_product_markup);
    }

    #[test]
    fn test_jsonld_graph_and_type_array() {
        let graph = serde_json::json!({"@graph": [{"@type": "WebPage"}, {"@type": "Product"}]});
        assert!(jsonld_declares_product(&graph));
        let typed = serde_json::json!({"@type": ["Product", "Thing"]});
        assert!(jsonld_declares_product(&typed));
        let other = serde_json::json!({"@type": "ProductGroup"});
        assert!(!jsonld_declares_product(&other));
    }

    #[test]
    fn test_malformed_jsonld_is_skipped() {
        let html = r#"
            <script type="application/ld+json">{ this is not json</script>
            <script type="application/ld+json">{"@type": "Product"}</script>"#;
        assert!(extract_signals_from_html(html).has_structured_product_markup);

        let only_bad = r#"<script type="application/ld+json">{"@type": </script>"#;
        assert!(!extract_signals_from_html(only_bad).has_structured_product_markup);
    }

    #[test]
    fn test_microdata_product() {
        let html = r#"<div itemscope itemtype="https://schema.org/Product"><span itemprop="name">X</span></div>"#;
        assert!(extract_signals_from_html(html).has_structured_product_markup);
    }

    #[test]
    fn test_add_to_cart_attribute_variants() {
        for html in [
            r#"<button id="add-to-cart-btn">Add</button>"#,
            r#"<button class="btn add-to-cart">Add</button>"#,
            r#"<button data-action="add-to-cart">Add</button>"#,
            r#"<input type="submit" value="Add to Cart">"#,
            r#"<form action="/cart/add" method="post"></form>"#,
        ] {
            assert!(extract_signals_from_html(html).has_add_to_cart, "{html}");
        }
    }

    #[test]
    fn test_add_to_cart_button_text() {
        let bag = r#"<button class="cta"><span>Add to Bag</span></button>"#;
        assert!(extract_signals_from_html(bag).has_add_to_cart);
        let buy = r#"<button>  Buy   Now </button>"#;
        assert!(extract_signals_from_html(buy).has_add_to_cart);
        // Text outside a button does not count.
        let para = r#"<p>Buy Now and save</p>"#;
        assert!(!extract_signals_from_html(para).has_add_to_cart);
    }

    #[test]
    fn test_price_selectors() {
        for html in [
            r#"<span class="product-price">$10</span>"#,
            r#"<div id="priceblock">$10</div>"#,
            r#"<meta itemprop="price" content="10.00">"#,
            r#"<span class="Price--final">Rs 999</span>"#,
        ] {
            assert!(extract_signals_from_html(html).has_price_element, "{html}");
        }
        assert!(!extract_signals_from_html("<p>10 dollars</p>").has_price_element);
    }

    #[test]
    fn test_title_word_bounds() {
        assert!(!is_plausible_title(""));
        assert!(!is_plausible_title("Shop"));
        assert!(is_plausible_title("Red Shoe"));
        assert!(is_plausible_title(&vec!["w"; 14].join(" ")));
        assert!(!is_plausible_title(&vec!["w"; 15].join(" ")));
    }

    #[test]
    fn test_heading_text_is_normalized() {
        let signals = extract_signals_from_html("<h1>\n  Classic <em>Linen</em>   Shirt\n</h1>");
        assert_eq!(signals.heading.as_deref(), Some("Classic Linen Shirt"));
        assert!(signals.has_plausible_title);

        let none = extract_signals_from_html("<h1>   </h1>");
        assert_eq!(none.heading, None);
        assert!(!none.has_plausible_title);
    }

    #[test]
    fn test_empty_document_has_no_signals() {
        assert_eq!(extract_signals_from_html(""), PageSignals::default());
    }
}
