// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress event types and broadcast channel for crawl telemetry.
//!
//! The crawl driver emits `ProgressEvent`s which flow through a
//! `tokio::sync::broadcast` channel to all subscribers. When no subscriber
//! exists, events are silently dropped.

use serde::{Deserialize, Serialize};

/// A progress event emitted during a crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Monotonically increasing sequence number.
    pub seq: u64,
    pub event: CrawlProgress,
}

/// The specific kind of progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CrawlProgress {
    /// A page, sitemap or render finished processing.
    PageProcessed {
        url: String,
        status: u16,
        kind: String,
    },
    /// A new product was confirmed and registered.
    ProductConfirmed { domain: String, url: String },
    /// A collection page was handed to the browser.
    RenderDispatched { url: String },
    /// A non-fatal warning occurred.
    Warning { message: String },
    /// The frontier drained.
    CrawlComplete {
        pages_fetched: u64,
        products_found: u64,
        renders: u64,
        elapsed_ms: u64,
    },
}

/// Sender handle for emitting progress events.
pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;

/// Receiver handle for consuming progress events.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(1024)
}

/// Emit a progress event, silently ignoring send errors (which occur when
/// no receivers are listening).
pub fn emit(tx: &Option<ProgressSender>, seq: &mut u64, event: CrawlProgress) {
    if let Some(ref sender) = tx {
        *seq += 1;
        let _ = sender.send(ProgressEvent { seq: *seq, event });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_event_serialization() {
        let event = ProgressEvent {
            seq: 3,
            event: CrawlProgress::ProductConfirmed {
                domain: "example.com".to_string(),
                url: "https://example.com/products/a".to_string(),
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ProductConfirmed"));

        let parsed: ProgressEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seq, 3);
    }

    #[test]
    fn test_emit_delivers_in_order() {
        let (tx, mut rx) = channel();
        let tx = Some(tx);
        let mut seq = 0;
        emit(
            &tx,
            &mut seq,
            CrawlProgress::RenderDispatched {
                url: "https://westside.com/collections/all".to_string(),
            },
        );
        emit(
            &tx,
            &mut seq,
            CrawlProgress::Warning {
                message: "slow".to_string(),
            },
        );
        assert_eq!(rx.try_recv().unwrap().seq, 1);
        assert_eq!(rx.try_recv().unwrap().seq, 2);
    }

    #[test]
    fn test_channel_no_receivers() {
        let (tx, rx) = channel();
        drop(rx);
        emit(
            &Some(tx),
            &mut 0,
            CrawlProgress::Warning {
                message: "test".to_string(),
            },
        );
    }

    #[test]
    fn test_emit_none_sender() {
        let mut seq = 0;
        emit(
            &None,
            &mut seq,
            CrawlProgress::Warning {
                message: "test".to_string(),
            },
        );
        assert_eq!(seq, 0);
    }
}
