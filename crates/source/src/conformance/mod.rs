//! Conformance test suite for `CollectionSource` implementations.
//!
//! A backend-agnostic suite any `CollectionSource` can run to verify it
//! honors the trait contract. The suite covers:
//!
//! - **Read**: empty collections read as empty, rows come back in backend
//!   order.
//! - **Mutation**: inserts return the created row with server-assigned
//!   fields, updates patch one row by id and error on a missing id.
//! - **Query**: filters, ordering, and limits are applied by the backend,
//!   not the caller.
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function
//! that creates a fresh, empty source for each test:
//!
//! ```ignore
//! use qala_source::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn memory_conformance() {
//!     let report = run_conformance_suite(|| async { MemorySource::new() }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod mutate;
mod query;
mod read;

use std::fmt;
use std::future::Future;

use crate::traits::CollectionSource;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "read", "mutate", "query").
    pub category: String,
    /// Test name.
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self {
                category: category.to_string(),
                name: name.to_string(),
                passed: true,
                message: None,
            },
            Err(msg) => Self {
                category: category.to_string(),
                name: name.to_string(),
                passed: false,
                message: Some(msg),
            },
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
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a source implementation.
///
/// The `factory` function is called once per test to create a fresh, empty
/// source, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(read::run_read_tests(&factory).await);
    results.extend(mutate::run_mutate_tests(&factory).await);
    results.extend(query::run_query_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: rows with sensible defaults ─────────────────────────────────────

fn make_appeal(resident_id: &str, subject: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "resident_id": resident_id,
        "category": "roads",
        "subject": subject,
        "body": "conformance fixture",
        "status": status,
    })
}
