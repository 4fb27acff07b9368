// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Async HTTP client wrapping reqwest.
//!
//! Plain GETs for pages and sitemaps. Handles redirects, timeouts,
//! retry on 5xx, and backoff on 429.

use anyhow::{Context, Result};
use std::time::Duration;

const MAX_RETRIES: u32 = 2;

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the body should be treated as HTML. A missing
    /// Content-Type header counts as HTML.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            })
            .unwrap_or(true)
    }
}

/// HTTP client for the crawl engine.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    /// HTTP/1.1-only fallback client for sites that reject HTTP/2.
    h1_client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();

        let h1_client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .http1_only()
            .build()
            .unwrap_or_default();

        Self {
            client,
            h1_client,
            timeout,
        }
    }

    /// GET with retry on 5xx and backoff on 429.
    ///
    /// Falls back to HTTP/1.1 on protocol errors (some CDNs reject HTTP/2).
    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        match self.get_inner(&self.client, url).await {
            Ok(resp) => Ok(resp),
            Err(e) => {
                let err_str = format!("{e}");
                if err_str.contains("http2")
                    || err_str.contains("protocol")
                    || err_str.contains("connection closed")
                {
                    tracing::debug!("retrying {url} over HTTP/1.1: {err_str}");
                    self.get_inner(&self.h1_client, url).await
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn get_inner(&self, client: &reqwest::Client, url: &str) -> Result<HttpResponse> {
        let mut retries = 0u32;

        loop {
            let resp = client.get(url).timeout(self.timeout).send().await;

            match resp {
                Ok(r) => {
                    let status = r.status().as_u16();
                    let final_url = r.url().to_string();

                    if status >= 500 && retries < MAX_RETRIES {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        tracing::debug!("{url} returned {status}, retry {retries} in {delay:?}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if status == 429 && retries < MAX_RETRIES {
                        retries += 1;
                        let retry_after = r
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(2);
                        let delay = Duration::from_secs(retry_after.min(10));
                        tracing::debug!("{url} rate limited, backing off {delay:?}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let content_type = r
                        .headers()
                        .get(reqwest::header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);

                    let body = r
                        .text()
                        .await
                        .with_context(|| format!("failed to read body of {url}"))?;

                    return Ok(HttpResponse {
                        final_url,
                        status,
                        content_type,
                        body,
                    });
                }
                Err(e) => {
                    if retries < MAX_RETRIES {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}
