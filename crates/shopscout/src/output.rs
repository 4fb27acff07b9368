// Copyright 2026 Shopscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! The grouped product report written at the end of a crawl.

use crate::error::OutputError;
use crate::tracker::ProductTracker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Domain → sorted, duplicate-free product URLs.
///
/// Serializes as a bare JSON object:
/// `{"example.com": ["https://example.com/products/a"], "other.com": []}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductReport {
    products: BTreeMap<String, Vec<String>>,
}

impl ProductReport {
    pub fn from_tracker(tracker: &ProductTracker) -> Self {
        Self {
            products: tracker.snapshot(),
        }
    }

    pub fn products(&self) -> &BTreeMap<String, Vec<String>> {
        &self.products
    }

    pub fn total(&self) -> usize {
        self.products.values().map(Vec::len).sum()
    }

    pub fn to_json(&self) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<(), OutputError> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| OutputError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            "saved {} products across {} domains to {}",
            self.total(),
            self.products.len(),
            path.display()
        );
        Ok(())
    }

    /// Persist the report, logging instead of failing. In-memory results
    /// stay intact either way.
    pub fn persist(&self, path: &Path) -> bool {
        match self.write_to(path) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("failed to save products to {}: {e}", path.display());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ProductReport {
        let tracker = ProductTracker::new(["example.com", "empty.com"]);
        tracker.register("example.com", "https://www.example.com/products/b");
        tracker.register("example.com", "https://www.example.com/products/a");
        tracker.register("example.com", "https://example.com/products/a/");
        ProductReport::from_tracker(&tracker)
    }

    #[test]
    fn test_report_shape() {
        let report = report();
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "empty.com": [],
                "example.com": [
                    "https://www.example.com/products/a",
                    "https://www.example.com/products/b"
                ]
            })
        );
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("grouped_products.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale contents that are much longer than the report").unwrap();

        report().write_to(&path).unwrap();
        let written: ProductReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, report());
    }

    #[test]
    fn test_persist_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten as a file.
        assert!(!report().persist(dir.path()));
        assert!(matches!(
            report().write_to(dir.path()),
            Err(OutputError::Io { .. })
        ));
    }
}
