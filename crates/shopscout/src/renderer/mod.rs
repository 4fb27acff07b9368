// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide).

pub mod chromium;

use crate::events::RenderRequest;
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Interval between readiness checks while waiting for a selector.
const READINESS_POLL: Duration = Duration::from_millis(100);

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A page rendered through the browser.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL the tab ended up on after redirects.
    pub final_url: String,
    pub html: String,
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Get the full page HTML.
    async fn get_html(&self) -> Result<String>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;

    /// Poll until an element matching `selector` exists, or fail once
    /// `timeout` has elapsed.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let literal = serde_json::to_string(selector)?;
        let script = format!("document.querySelector({literal}) !== null");
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(serde_json::Value::Bool(true)) = self.execute_js(&script).await {
                return Ok(());
            }
            if Instant::now() >= deadline {
                bail!("timed out after {}ms waiting for {selector}", timeout.as_millis());
            }
            tokio::time::sleep(READINESS_POLL).await;
        }
    }
}

/// Render `request.url` and return the page once the readiness selector
/// matches. The context is closed on every path.
pub async fn render_with_readiness(
    renderer: &dyn Renderer,
    request: &RenderRequest,
) -> Result<RenderedPage> {
    let mut ctx = renderer.new_context().await?;
    let timeout = Duration::from_millis(request.timeout_ms);

    let result = async {
        let nav = ctx.navigate(&request.url, request.timeout_ms).await?;
        tracing::debug!("loaded {} in {}ms", nav.final_url, nav.load_time_ms);
        ctx.wait_for_selector(&request.wait_for_selector, timeout)
            .await?;
        Ok(RenderedPage {
            final_url: nav.final_url,
            html: ctx.get_html().await?,
            load_time_ms: nav.load_time_ms,
        })
    }
    .await;

    if let Err(e) = ctx.close().await {
        tracing::debug!("failed to close render context for {}: {e}", request.url);
    }
    result
}

/// A no-op renderer used when Chromium is unavailable.
///
/// Plain HTTP crawling works without a browser. Render requests fail and
/// surface as render failures.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Err(anyhow::anyhow!("Browser not available, HTTP-only mode"))
    }
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
    fn active_contexts(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Context whose readiness check succeeds after a fixed number of polls.
    struct ScriptedContext {
        ready_after: usize,
        polls: AtomicUsize,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RenderContext for ScriptedContext {
        async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
            Ok(NavigationResult {
                final_url: format!("{url}?page=1"),
                load_time_ms: 1,
            })
        }
        async fn execute_js(&self, _script: &str) -> Result<serde_json::Value> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(serde_json::Value::Bool(n >= self.ready_after))
        }
        async fn get_html(&self) -> Result<String> {
            Ok(r#"<a href="/products/a">A</a>"#.to_string())
        }
        async fn close(self: Box<Self>) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ScriptedRenderer {
        ready_after: usize,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Renderer for ScriptedRenderer {
        async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
            Ok(Box::new(ScriptedContext {
                ready_after: self.ready_after,
                polls: AtomicUsize::new(0),
                closed: Arc::clone(&self.closed),
            }))
        }
        async fn shutdown(&self) -> Result<()> {
            Ok(())
        }
        fn active_contexts(&self) -> usize {
            0
        }
    }

    fn request(timeout_ms: u64) -> RenderRequest {
        RenderRequest {
            url: "https://westside.com/collections/all".to_string(),
            wait_for_selector: "a[href*=\"/products/\"]".to_string(),
            timeout_ms,
        }
    }

    #[tokio::test]
    async fn test_render_waits_for_selector() {
        let closed = Arc::new(AtomicUsize::new(0));
        let renderer = ScriptedRenderer {
            ready_after: 3,
            closed: Arc::clone(&closed),
        };
        let page = render_with_readiness(&renderer, &request(5000)).await.unwrap();
        assert!(page.html.contains("/products/a"));
        assert_eq!(page.final_url, "https://westside.com/collections/all?page=1");
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_render_times_out_and_closes() {
        let closed = Arc::new(AtomicUsize::new(0));
        let renderer = ScriptedRenderer {
            ready_after: usize::MAX,
            closed: Arc::clone(&closed),
        };
        let err = render_with_readiness(&renderer, &request(250))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_noop_renderer_fails() {
        let result = tokio_test::block_on(render_with_readiness(&NoopRenderer, &request(100)));
        assert!(result.is_err());
        assert_eq!(NoopRenderer.active_contexts(), 0);
    }
}
