// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Crawl driver: frontier, request filter, politeness and worker tasks.
//!
//! The scheduler loop owns the frontier and the seen-request set, so
//! neither needs a lock. Workers fetch or render one request each, hand the
//! content to the [`CrawlSession`] on the blocking pool (HTML parsing is
//! CPU-bound and `scraper` documents are not `Send`), and report back over
//! an mpsc channel. The crawl is drained when the frontier is empty and no
//! worker is in flight.

use crate::acquisition::HttpClient;
use crate::canonical::{canonicalize_url, tracked_host};
use crate::config::CrawlConfig;
use crate::events::{FetchRequest, PageEvent, RenderRequest};
use crate::progress::{self, CrawlProgress, ProgressSender};
use crate::renderer::{render_with_readiness, Renderer};
use crate::session::CrawlSession;
use crate::tracker::ProductRecord;
use anyhow::Result;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use url::Url;

/// Counters for a finished crawl.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    pub pages_fetched: u64,
    pub sitemaps_fetched: u64,
    pub renders: u64,
    pub render_failures: u64,
    pub fetch_errors: u64,
    pub products_found: u64,
    /// Requests dropped because the page budget was spent.
    pub dropped_by_budget: u64,
    pub elapsed_ms: u64,
}

struct Task {
    request: FetchRequest,
    depth: u32,
}

/// How a single task ended.
enum TaskStatus {
    Page,
    Sitemap,
    Rendered,
    RenderFailed,
    FetchFailed,
}

struct TaskReport {
    url: String,
    depth: u32,
    status_code: u16,
    status: TaskStatus,
    requests: Vec<FetchRequest>,
    product: Option<ProductRecord>,
}

/// Shared, read-only worker context.
struct Worker {
    session: Arc<CrawlSession>,
    http: HttpClient,
    renderer: Arc<dyn Renderer>,
    delay: Duration,
}

pub struct Crawler {
    config: CrawlConfig,
    session: Arc<CrawlSession>,
    http: HttpClient,
    renderer: Arc<dyn Renderer>,
    progress: Option<ProgressSender>,
}

impl Crawler {
    pub fn new(config: CrawlConfig, session: Arc<CrawlSession>, renderer: Arc<dyn Renderer>) -> Self {
        let http = HttpClient::new(&config.user_agent, config.request_timeout);
        Self {
            config,
            session,
            http,
            renderer,
            progress: None,
        }
    }

    pub fn with_progress(mut self, tx: ProgressSender) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn session(&self) -> &Arc<CrawlSession> {
        &self.session
    }

    /// Crawl until the frontier drains.
    pub async fn run(&self) -> Result<CrawlStats> {
        self.config.validate()?;
        let start = Instant::now();
        let mut stats = CrawlStats::default();
        let mut seq = 0u64;

        tracing::info!("starting crawl for domains: {:?}", self.config.domains);

        let worker = Arc::new(Worker {
            session: Arc::clone(&self.session),
            http: self.http.clone(),
            renderer: Arc::clone(&self.renderer),
            delay: self.config.download_delay,
        });

        let (tx, mut rx) = mpsc::unbounded_channel::<TaskReport>();
        let mut frontier: VecDeque<Task> = VecDeque::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut slots: HashMap<String, Arc<Semaphore>> = HashMap::new();
        let mut dispatched_pages = 0usize;
        let mut in_flight = 0usize;

        for url in self.config.sitemap_seed_urls() {
            self.enqueue(&mut frontier, &mut seen, FetchRequest::sitemap(url), 0);
        }
        for url in self.config.seed_urls() {
            self.enqueue(&mut frontier, &mut seen, FetchRequest::page(url), 0);
        }

        loop {
            while in_flight < self.config.max_concurrency {
                let Some(task) = frontier.pop_front() else {
                    break;
                };
                let counts_toward_budget = !matches!(task.request, FetchRequest::Sitemap { .. });
                if counts_toward_budget {
                    if let Some(max) = self.config.max_pages {
                        if dispatched_pages >= max {
                            if stats.dropped_by_budget == 0 {
                                tracing::info!("page budget of {max} reached, no new pages");
                            }
                            stats.dropped_by_budget += 1;
                            continue;
                        }
                    }
                    dispatched_pages += 1;
                }
                if let FetchRequest::Render(req) = &task.request {
                    progress::emit(
                        &self.progress,
                        &mut seq,
                        CrawlProgress::RenderDispatched {
                            url: req.url.clone(),
                        },
                    );
                }

                let slot = self.slot_for(&mut slots, task.request.url());
                let worker = Arc::clone(&worker);
                let tx = tx.clone();
                in_flight += 1;
                tokio::spawn(async move {
                    let report = worker.run(task, slot).await;
                    let _ = tx.send(report);
                });
            }

            if in_flight == 0 {
                break;
            }

            let Some(report) = rx.recv().await else {
                break;
            };
            in_flight -= 1;

            let kind = match report.status {
                TaskStatus::Page => {
                    stats.pages_fetched += 1;
                    "page"
                }
                TaskStatus::Sitemap => {
                    stats.sitemaps_fetched += 1;
                    "sitemap"
                }
                TaskStatus::Rendered => {
                    stats.renders += 1;
                    "render"
                }
                TaskStatus::RenderFailed => {
                    stats.render_failures += 1;
                    "render"
                }
                TaskStatus::FetchFailed => {
                    stats.fetch_errors += 1;
                    progress::emit(
                        &self.progress,
                        &mut seq,
                        CrawlProgress::Warning {
                            message: format!("fetch failed: {}", report.url),
                        },
                    );
                    "error"
                }
            };
            progress::emit(
                &self.progress,
                &mut seq,
                CrawlProgress::PageProcessed {
                    url: report.url.clone(),
                    status: report.status_code,
                    kind: kind.to_string(),
                },
            );

            if let Some(record) = report.product {
                stats.products_found += 1;
                progress::emit(
                    &self.progress,
                    &mut seq,
                    CrawlProgress::ProductConfirmed {
                        domain: record.domain,
                        url: record.raw_url,
                    },
                );
            }

            for request in report.requests {
                self.enqueue(&mut frontier, &mut seen, request, report.depth + 1);
            }
        }

        stats.elapsed_ms = start.elapsed().as_millis() as u64;
        progress::emit(
            &self.progress,
            &mut seq,
            CrawlProgress::CrawlComplete {
                pages_fetched: stats.pages_fetched,
                products_found: stats.products_found,
                renders: stats.renders,
                elapsed_ms: stats.elapsed_ms,
            },
        );
        tracing::info!(
            "crawl finished: {} pages, {} sitemaps, {} renders, {} products in {}ms",
            stats.pages_fetched,
            stats.sitemaps_fetched,
            stats.renders,
            stats.products_found,
            stats.elapsed_ms
        );
        Ok(stats)
    }

    /// Apply the request filter and push onto the frontier.
    ///
    /// Every request must be on a tracked domain and not denied. Page and
    /// sitemap requests must also not have been seen before (by canonical
    /// URL); render requests skip that check because the selector already
    /// made them one-shot.
    fn enqueue(
        &self,
        frontier: &mut VecDeque<Task>,
        seen: &mut HashSet<String>,
        request: FetchRequest,
        depth: u32,
    ) {
        if let Some(limit) = self.config.depth_limit {
            if depth > limit {
                tracing::debug!("depth limit reached, skipping {}", request.url());
                return;
            }
        }

        let Ok(url) = Url::parse(request.url()) else {
            tracing::debug!("unparseable request URL: {}", request.url());
            return;
        };
        if !self.session.allows(&url) {
            tracing::debug!("filtered request: {url}");
            return;
        }

        if !request.is_render() {
            let kind = match request {
                FetchRequest::Sitemap { .. } => "sitemap",
                _ => "page",
            };
            if !seen.insert(format!("{kind} {}", canonicalize_url(&url))) {
                return;
            }
        }

        frontier.push_back(Task { request, depth });
    }

    fn slot_for(&self, slots: &mut HashMap<String, Arc<Semaphore>>, url: &str) -> Arc<Semaphore> {
        let host = Url::parse(url)
            .ok()
            .as_ref()
            .and_then(tracked_host)
            .unwrap_or_default();
        let per_domain = self.config.per_domain_concurrency;
        Arc::clone(
            slots
                .entry(host)
                .or_insert_with(|| Arc::new(Semaphore::new(per_domain))),
        )
    }
}

impl Worker {
    async fn run(&self, task: Task, slot: Arc<Semaphore>) -> TaskReport {
        let url = task.request.url().to_string();
        let mut report = TaskReport {
            url: url.clone(),
            depth: task.depth,
            status_code: 0,
            status: TaskStatus::FetchFailed,
            requests: Vec::new(),
            product: None,
        };

        let Ok(_permit) = slot.acquire_owned().await else {
            return report;
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let event = match task.request {
            FetchRequest::Page { .. } => match self.fetch(&url, true).await {
                Some((status, final_url, html)) => {
                    report.status_code = status;
                    report.status = TaskStatus::Page;
                    PageEvent::Fetched {
                        url: final_url,
                        html,
                    }
                }
                None => return report,
            },
            FetchRequest::Sitemap { .. } => match self.fetch(&url, false).await {
                Some((status, _, body)) => {
                    report.status_code = status;
                    report.status = TaskStatus::Sitemap;
                    PageEvent::SitemapFetched { url: url.clone(), body }
                }
                None => return report,
            },
            FetchRequest::Render(req) => self.render(req, &mut report).await,
        };

        let session = Arc::clone(&self.session);
        let handled = tokio::task::spawn_blocking(move || {
            let follow = match &event {
                PageEvent::Fetched { url, html } => session.follow_links(url, html),
                _ => Vec::new(),
            };
            let mut outcome = session.handle(event);
            outcome.requests.extend(follow);
            outcome
        })
        .await;

        match handled {
            Ok(outcome) => {
                report.requests = outcome.requests;
                report.product = outcome.product;
            }
            Err(e) => tracing::warn!("page handler for {url} panicked: {e}"),
        }
        report
    }

    /// GET `url`, returning `(status, final_url, body)` for 2xx responses.
    /// Non-HTML page responses are skipped.
    async fn fetch(&self, url: &str, require_html: bool) -> Option<(u16, String, String)> {
        match self.http.get(url).await {
            Ok(resp) if resp.is_success() && (!require_html || resp.is_html()) => {
                tracing::debug!("fetched {url} ({})", resp.status);
                Some((resp.status, resp.final_url, resp.body))
            }
            Ok(resp) if resp.is_success() => {
                tracing::debug!("skipping non-HTML response from {url}");
                None
            }
            Ok(resp) => {
                tracing::warn!("{url} returned HTTP {}", resp.status);
                None
            }
            Err(e) => {
                tracing::warn!("fetch failed for {url}: {e}");
                None
            }
        }
    }

    async fn render(&self, req: RenderRequest, report: &mut TaskReport) -> PageEvent {
        tracing::debug!("rendering {}", req.url);
        match render_with_readiness(self.renderer.as_ref(), &req).await {
            Ok(page) => {
                report.status_code = 200;
                report.status = TaskStatus::Rendered;
                PageEvent::Rendered {
                    url: page.final_url,
                    html: page.html,
                }
            }
            Err(e) => {
                report.status = TaskStatus::RenderFailed;
                PageEvent::RenderFailed {
                    url: req.url,
                    reason: e.to_string(),
                }
            }
        }
    }
}
