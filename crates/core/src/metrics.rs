//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ingestion (documents, batch items, best-effort index writes)
//! - Retrieval (search and fetch outcomes)
//! - External services (ticket issuance, repository calls)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Ingestion Metrics
// =============================================================================

/// Single-document ingestions by outcome.
pub static DOCUMENTS_INGESTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "docvault_documents_ingested_total",
            "Single-document ingestions by outcome",
        ),
        &["outcome"], // "success", "validation", "authentication", "repository"
    )
    .unwrap()
});

/// Batch items by outcome.
pub static BATCH_ITEMS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("docvault_batch_items_total", "Batch items processed"),
        &["outcome"], // "success", "error"
    )
    .unwrap()
});

/// Documents stored in the repository whose index write failed.
pub static INDEX_WRITE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "docvault_index_write_failures_total",
        "Documents stored in the repository but missing from the index",
    )
    .unwrap()
});

// =============================================================================
// Retrieval Metrics
// =============================================================================

/// Retrievals by mode and outcome.
pub static RETRIEVALS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("docvault_retrievals_total", "Document retrievals"),
        &["mode", "outcome"], // mode: "search", "by_id"
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// Failed ticket requests.
pub static TICKET_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "docvault_ticket_failures_total",
        "Failed repository ticket requests",
    )
    .unwrap()
});

/// Repository call duration by operation and outcome.
pub static REPOSITORY_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "docvault_repository_request_duration_seconds",
            "Duration of repository requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation", "outcome"],
    )
    .unwrap()
});

/// All core metrics, for registration by the server.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(DOCUMENTS_INGESTED.clone()),
        Box::new(BATCH_ITEMS.clone()),
        Box::new(INDEX_WRITE_FAILURES.clone()),
        Box::new(RETRIEVALS.clone()),
        Box::new(TICKET_FAILURES.clone()),
        Box::new(REPOSITORY_REQUEST_DURATION.clone()),
    ]
}
