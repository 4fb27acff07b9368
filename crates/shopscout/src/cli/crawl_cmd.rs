// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! `shopscout crawl`: crawl the given domains and write grouped products.

use super::output;
use anyhow::Result;
use clap::Args;
use shopscout::progress::{self, CrawlProgress};
use shopscout::renderer::chromium::ChromiumRenderer;
use shopscout::renderer::{NoopRenderer, Renderer};
use shopscout::{CrawlConfig, CrawlSession, Crawler};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Comma-separated domains to crawl (e.g. "virgio.com,westside.com")
    #[arg(long, short)]
    pub domains: String,

    /// Where to write the grouped product JSON
    #[arg(long, short, default_value = shopscout::config::DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Comma-separated domains whose listing pages need JS rendering
    #[arg(long)]
    pub js_domains: Option<String>,

    /// JSON pattern file replacing the built-in URL patterns
    #[arg(long)]
    pub patterns: Option<PathBuf>,

    /// Maximum concurrent requests overall
    #[arg(long, default_value = "16")]
    pub concurrency: usize,

    /// Maximum concurrent requests per domain
    #[arg(long, default_value = "4")]
    pub per_domain: usize,

    /// Delay before each request, in milliseconds
    #[arg(long, default_value = "500")]
    pub delay_ms: u64,

    /// Stop scheduling new pages after this many
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Maximum link depth from the seeds
    #[arg(long)]
    pub depth_limit: Option<u32>,

    /// Start from these URLs instead of each domain's home page. Can be repeated.
    #[arg(long = "start-url")]
    pub start_urls: Vec<String>,

    /// Do not seed /sitemap.xml
    #[arg(long)]
    pub no_sitemaps: bool,

    /// Never launch a browser; render requests fail
    #[arg(long)]
    pub no_browser: bool,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value = "15000")]
    pub timeout_ms: u64,
}

impl CrawlArgs {
    fn to_config(&self) -> Result<CrawlConfig> {
        let mut config = CrawlConfig::new(&self.domains)?;
        if let Some(js) = &self.js_domains {
            config = config.with_js_rendered_domains(js)?;
        }
        if !self.start_urls.is_empty() {
            config = config.with_start_urls(&self.start_urls)?;
        }
        config.output_path = self.output.clone();
        config.pattern_file = self.patterns.clone();
        config.max_concurrency = self.concurrency;
        config.per_domain_concurrency = self.per_domain;
        config.download_delay = Duration::from_millis(self.delay_ms);
        config.max_pages = self.max_pages;
        config.depth_limit = self.depth_limit;
        config.seed_sitemaps = !self.no_sitemaps;
        config.use_browser = !self.no_browser;
        config.request_timeout = Duration::from_millis(self.timeout_ms);
        config.validate()?;
        Ok(config)
    }
}

/// Run the crawl command.
pub async fn run(args: &CrawlArgs) -> Result<()> {
    let config = args.to_config()?;
    let patterns = super::load_patterns(config.pattern_file.as_deref())?;
    let session = Arc::new(CrawlSession::new(&config, patterns));
    let renderer = launch_renderer(&config).await;

    let (tx, mut rx) = progress::channel();
    let printer = tokio::spawn(async move {
        let show = !output::is_quiet() && !output::is_json();
        loop {
            match rx.recv().await {
                Ok(event) => match event.event {
                    CrawlProgress::ProductConfirmed { domain, url } if show => {
                        eprintln!("  + [{domain}] {url}");
                    }
                    CrawlProgress::CrawlComplete { .. } => break,
                    _ => {}
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let output_path = config.output_path.clone();
    let crawler = Crawler::new(config, Arc::clone(&session), Arc::clone(&renderer))
        .with_progress(tx);
    let stats = crawler.run().await;
    drop(crawler);
    let _ = printer.await;
    if let Err(e) = renderer.shutdown().await {
        tracing::debug!("renderer shutdown failed: {e}");
    }
    let stats = stats?;

    let report = session.report();
    let saved = report.persist(&output_path);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "output": output_path.display().to_string(),
            "saved": saved,
            "stats": stats,
            "products": report.products(),
        }));
    } else if !output::is_quiet() {
        eprintln!();
        for (domain, urls) in report.products() {
            eprintln!("  {domain}: {} products", urls.len());
        }
        eprintln!(
            "  {} pages, {} sitemaps, {} renders in {:.1}s",
            stats.pages_fetched,
            stats.sitemaps_fetched,
            stats.renders,
            stats.elapsed_ms as f64 / 1000.0
        );
        if saved {
            eprintln!("  Saved {} products to {}", report.total(), output_path.display());
        }
    }
    Ok(())
}

/// Launch Chromium when rendering fallback can fire; otherwise, or when
/// Chromium is missing, fall back to the no-op renderer.
async fn launch_renderer(config: &CrawlConfig) -> Arc<dyn Renderer> {
    if !config.use_browser || config.js_rendered_domains.is_empty() {
        return Arc::new(NoopRenderer);
    }
    match ChromiumRenderer::launch(&config.user_agent).await {
        Ok(renderer) => Arc::new(renderer),
        Err(e) => {
            tracing::warn!("browser unavailable, continuing without rendering: {e:#}");
            Arc::new(NoopRenderer)
        }
    }
}
