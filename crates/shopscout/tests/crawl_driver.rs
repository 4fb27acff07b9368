//! Full crawl against a local HTTP server with a scripted browser.

use anyhow::Result;
use async_trait::async_trait;
use shopscout::classify::PatternLibrary;
use shopscout::progress::{self, CrawlProgress};
use shopscout::renderer::{NavigationResult, RenderContext, Renderer};
use shopscout::{CrawlConfig, CrawlSession, Crawler};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves canned HTML per URL path; the readiness check always passes.
struct ScriptedBrowser {
    pages: HashMap<String, String>,
    renders: Arc<AtomicUsize>,
}

struct ScriptedTab {
    pages: HashMap<String, String>,
    current: Mutex<Option<String>>,
}

#[async_trait]
impl Renderer for ScriptedBrowser {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedTab {
            pages: self.pages.clone(),
            current: Mutex::new(None),
        }))
    }
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
    fn active_contexts(&self) -> usize {
        0
    }
}

#[async_trait]
impl RenderContext for ScriptedTab {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        let path = url::Url::parse(url)?.path().to_string();
        *self.current.lock().unwrap() = Some(path);
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }
    async fn execute_js(&self, _script: &str) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Bool(true))
    }
    async fn get_html(&self) -> Result<String> {
        let current = self.current.lock().unwrap().clone().unwrap_or_default();
        self.pages
            .get(&current)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no scripted page for {current}"))
    }
    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(format!("<html><body>{body}</body></html>"), "text/html")
}

async fn mount(server: &MockServer, at: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(response)
        .mount(server)
        .await;
}

const PRODUCT: &str = r#"<h1>Canvas Sneaker</h1>
    <span class="selling-price">Rs 2,499</span>
    <button id="add-to-cart-button">Add to Cart</button>"#;

#[tokio::test]
async fn crawl_discovers_products_through_links_sitemap_and_rendering() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/",
        html(
            r#"<a href="/products/red-shoe">Red</a>
               <a href="/c/shoes">Shoes</a>
               <a href="/collections/new">New in</a>
               <a href="/account/login">Sign in</a>
               <a href="https://elsewhere.test/products/x">Partner</a>"#,
        ),
    )
    .await;
    mount(
        &server,
        "/sitemap.xml",
        ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
                <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                  <url><loc>{base}/products/red-shoe</loc></url>
                  <url><loc>{base}/products/blue-shoe</loc></url>
                </urlset>"#
            ),
            "application/xml",
        ),
    )
    .await;
    mount(&server, "/products/red-shoe", html(PRODUCT)).await;
    mount(&server, "/products/blue-shoe", html(PRODUCT)).await;
    mount(&server, "/products/green-shoe", html(PRODUCT)).await;
    mount(
        &server,
        "/c/shoes",
        html(r#"<h1>All Shoes</h1><span class="price">from Rs 999</span>"#),
    )
    .await;
    mount(&server, "/collections/new", html(r#"<div id="app"></div>"#)).await;
    Mock::given(method("GET"))
        .and(path("/account/login"))
        .respond_with(html("login"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = CrawlConfig::new("127.0.0.1")
        .unwrap()
        .with_js_rendered_domains("127.0.0.1")
        .unwrap()
        .with_start_urls(&[format!("{base}/")])
        .unwrap();
    config.download_delay = Duration::ZERO;
    config.request_timeout = Duration::from_secs(5);

    let renders = Arc::new(AtomicUsize::new(0));
    let browser = ScriptedBrowser {
        pages: HashMap::from([
            (
                "/collections/new".to_string(),
                r#"<html><body><a href="/products/green-shoe">Green</a></body></html>"#
                    .to_string(),
            ),
            // Renders fine but still has no product links.
            (
                "/c/shoes".to_string(),
                "<html><body><h1>All Shoes</h1></body></html>".to_string(),
            ),
        ]),
        renders: Arc::clone(&renders),
    };

    let session = Arc::new(CrawlSession::new(&config, PatternLibrary::builtin()));
    let (tx, mut rx) = progress::channel();
    let crawler = Crawler::new(config, Arc::clone(&session), Arc::new(browser)).with_progress(tx);
    let stats = crawler.run().await.unwrap();

    assert_eq!(stats.products_found, 3);
    // Both listing pages are rendered exactly once.
    assert_eq!(stats.renders, 2);
    assert_eq!(stats.render_failures, 0);
    assert_eq!(stats.sitemaps_fetched, 1);
    assert_eq!(renders.load(Ordering::SeqCst), 2);

    let report = session.report();
    assert_eq!(
        report.products()["127.0.0.1"],
        vec![
            format!("{base}/products/blue-shoe"),
            format!("{base}/products/green-shoe"),
            format!("{base}/products/red-shoe"),
        ]
    );

    let mut confirmed = 0;
    let mut completed = false;
    while let Ok(event) = rx.try_recv() {
        match event.event {
            CrawlProgress::ProductConfirmed { .. } => confirmed += 1,
            CrawlProgress::CrawlComplete { products_found, .. } => {
                assert_eq!(products_found, 3);
                completed = true;
            }
            _ => {}
        }
    }
    assert_eq!(confirmed, 3);
    assert!(completed);
}

#[tokio::test]
async fn crawl_respects_page_budget() {
    let server = MockServer::start().await;
    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/products/item-{i}">Item {i}</a>"#))
        .collect();
    mount(&server, "/", html(&links)).await;
    for i in 0..10 {
        mount(&server, &format!("/products/item-{i}"), html(PRODUCT)).await;
    }

    let mut config = CrawlConfig::new("127.0.0.1")
        .unwrap()
        .with_start_urls(&[format!("{}/", server.uri())])
        .unwrap();
    config.seed_sitemaps = false;
    config.download_delay = Duration::ZERO;
    config.max_pages = Some(4);

    let session = Arc::new(CrawlSession::new(&config, PatternLibrary::builtin()));
    let crawler = Crawler::new(
        config,
        Arc::clone(&session),
        Arc::new(shopscout::renderer::NoopRenderer),
    );
    let stats = crawler.run().await.unwrap();

    assert_eq!(stats.pages_fetched, 4);
    assert_eq!(stats.products_found, 3);
    assert_eq!(stats.dropped_by_budget, 7);
    assert_eq!(session.tracker().total(), 3);
}
