//! Conformance test suite for `DocumentStore` implementations.
//!
//! This module provides a backend-agnostic test suite that any `DocumentStore`
//! implementation can run to verify correctness. The suite covers:
//!
//! - **Find**: filtering, most-recent-first ordering, limits, insertion order
//! - **Count**: filtered and unfiltered counts
//! - **Upsert**: replace-or-insert keyed by id
//! - **Update**: partial-field overwrite and not-found handling
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty store for each test:
//!
//! ```ignore
//! use scrumpilot_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn my_backend_conformance() {
//!     let report = run_conformance_suite(|| async { create_test_store().await }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod find;
mod write;

use std::fmt;
use std::future::Future;

use crate::document::Document;
use crate::DocumentStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "find", "write").
    pub category: String,
    /// Test name (e.g. "find_respects_limit").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in self.results.iter().filter(|r| !r.passed) {
            writeln!(
                f,
                "  FAIL [{}/{}]: {}",
                r.category,
                r.name,
                r.message.as_deref().unwrap_or("(no message)")
            )?;
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// store, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(find::run_find_tests(&factory).await);
    results.extend(write::run_write_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Build a small artifact-like document.
fn make_document(id: &str, timestamp: &str, status: &str) -> Document {
    let mut doc = Document::new();
    doc.insert("id".to_string(), serde_json::json!(id));
    doc.insert("timestamp".to_string(), serde_json::json!(timestamp));
    doc.insert("status".to_string(), serde_json::json!(status));
    doc
}

fn ids(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .map(|d| {
            d.get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("<missing>")
                .to_string()
        })
        .collect()
}
