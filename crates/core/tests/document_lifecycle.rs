//! Document lifecycle integration tests.
//!
//! Ingest through the orchestrator into a file-backed SQLite index, then
//! find and fetch the same document back.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use docvault_core::{
    testing::{fixtures, MockRepository, MockTicketProvider},
    BatchItem, BatchOptions, DocumentError, IndexFilter, IngestOptions, IngestRequest,
    IngestionConfig, IngestionOrchestrator, ListFilter, ListingOrchestrator, MetadataIndex,
    Principal, RetrievalOrchestrator, SearchQuery, SqliteMetadataIndex, TicketSource,
};

struct TestHarness {
    tickets: Arc<MockTicketProvider>,
    repository: Arc<MockRepository>,
    index: Arc<SqliteMetadataIndex>,
    ingestion: IngestionOrchestrator,
    retrieval: RetrievalOrchestrator,
    listing: ListingOrchestrator,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_config(IngestionConfig::default())
    }

    fn with_config(config: IngestionConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let index = Arc::new(SqliteMetadataIndex::at_path(
            &temp_dir.path().join("index.db"),
            "documents",
            Duration::from_millis(1000),
        ));
        let tickets = Arc::new(MockTicketProvider::new());
        let repository = Arc::new(MockRepository::new());
        let source = TicketSource::new(tickets.clone(), Principal::new("svc-docvault", "pw"));

        Self {
            ingestion: IngestionOrchestrator::new(
                source.clone(),
                repository.clone(),
                index.clone(),
                config,
            ),
            retrieval: RetrievalOrchestrator::new(source.clone(), repository.clone(), index.clone()),
            listing: ListingOrchestrator::new(source, repository.clone()),
            tickets,
            repository,
            index,
            _temp_dir: temp_dir,
        }
    }

    fn request() -> IngestRequest {
        IngestRequest {
            content: fixtures::pdf_bytes(),
            file_name: "contrato.pdf".to_string(),
            metadata: fixtures::valid_metadata(),
        }
    }
}

fn by_tax_id(tax_id: &str) -> SearchQuery {
    SearchQuery {
        tax_id: Some(tax_id.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_ingest_then_search_and_fetch() {
    let h = TestHarness::new();

    let receipt = h
        .ingestion
        .ingest(TestHarness::request(), IngestOptions::default())
        .await
        .unwrap();
    assert!(receipt.indexed);

    let found = h
        .index
        .find_one(&IndexFilter::new().with_tax_id("20218874-5"))
        .unwrap();
    assert_eq!(found, receipt.document.id);

    let retrieved = h
        .retrieval
        .search_and_fetch(&by_tax_id("20218874-5"))
        .await
        .unwrap();
    assert_eq!(retrieved.repository_id, receipt.document.id);
    assert_eq!(retrieved.file.content, fixtures::pdf_bytes());
    assert_eq!(retrieved.file.mime_type, "application/pdf");
    assert_eq!(retrieved.file.file_name, "contrato.pdf");

    // One ticket per operation, never reused.
    assert_eq!(h.tickets.call_count(), 2);
    let tickets = h.repository.recorded_tickets();
    assert_eq!(tickets.len(), 2);
    assert_ne!(tickets[0], tickets[1]);
}

#[tokio::test]
async fn test_search_by_native_names_and_secondary_keys() {
    let h = TestHarness::new();
    let receipt = h
        .ingestion
        .ingest(TestHarness::request(), IngestOptions::default())
        .await
        .unwrap();

    let query: SearchQuery = serde_json::from_value(serde_json::json!({
        "dms:client-tax-id": "20218874-5",
        "document_type": "Contrato"
    }))
    .unwrap();
    let retrieved = h.retrieval.search_and_fetch(&query).await.unwrap();
    assert_eq!(retrieved.repository_id, receipt.document.id);

    let miss = h
        .retrieval
        .search_and_fetch(&SearchQuery {
            tax_id: Some("20218874-5".to_string()),
            document_type: Some("Factura".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(miss, DocumentError::NotIndexed));
}

#[tokio::test]
async fn test_most_recent_ingestion_wins() {
    let h = TestHarness::new();
    let first = h
        .ingestion
        .ingest(TestHarness::request(), IngestOptions::default())
        .await
        .unwrap();
    let second = h
        .ingestion
        .ingest(TestHarness::request(), IngestOptions::default())
        .await
        .unwrap();
    assert_ne!(first.document.id, second.document.id);

    let retrieved = h
        .retrieval
        .search_and_fetch(&by_tax_id("20218874-5"))
        .await
        .unwrap();
    assert_eq!(retrieved.repository_id, second.document.id);
}

#[tokio::test]
async fn test_repository_deletion_is_reported_as_out_of_sync() {
    let h = TestHarness::new();
    let receipt = h
        .ingestion
        .ingest(TestHarness::request(), IngestOptions::default())
        .await
        .unwrap();
    assert!(h.repository.remove_document(&receipt.document.id));

    let err = h
        .retrieval
        .search_and_fetch(&by_tax_id("20218874-5"))
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::IndexOutOfSync { .. }));
}

#[tokio::test]
async fn test_closed_index_keeps_ingestion_alive() {
    let h = TestHarness::new();
    h.index.close().unwrap();

    let receipt = h
        .ingestion
        .ingest(TestHarness::request(), IngestOptions::default())
        .await
        .unwrap();

    assert!(!receipt.indexed);
    assert!(h.repository.contains(&receipt.document.id));
}

#[tokio::test]
async fn test_batch_then_list() {
    let h = TestHarness::with_config(IngestionConfig {
        batch_concurrency: 3,
        ..Default::default()
    });

    let mut other = fixtures::valid_metadata();
    other.client_tax_id = "7654321-0".to_string();
    let items = vec![
        BatchItem::from_base64("a.pdf".into(), &fixtures::pdf_base64(), fixtures::valid_metadata()),
        BatchItem::from_base64("b.pdf".into(), &fixtures::pdf_base64(), other),
        BatchItem::from_base64("c.pdf".into(), "@@@", fixtures::valid_metadata()),
    ];

    let result = h
        .ingestion
        .ingest_batch(items, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!((result.total, result.succeeded, result.failed), (3, 2, 1));
    assert_eq!(h.tickets.call_count(), 1);

    let all = h.listing.list(&ListFilter::new()).await.unwrap();
    assert_eq!(all.len(), 2);

    let mut filter = ListFilter::new();
    filter.insert("dms:client-tax-id".to_string(), "7654321-0".into());
    let filtered = h.listing.list(&filter).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert!(filtered.values().all(|d| d.name == "b.pdf"));

    let retrieved = h
        .retrieval
        .search_and_fetch(&by_tax_id("7654321-0"))
        .await
        .unwrap();
    assert!(filtered.contains_key(&retrieved.repository_id));
}

#[tokio::test]
async fn test_index_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("index.db");
    let tickets = Arc::new(MockTicketProvider::new());
    let repository = Arc::new(MockRepository::new());
    let source = TicketSource::new(tickets, Principal::new("svc", "pw"));

    let id = {
        let index = Arc::new(SqliteMetadataIndex::at_path(
            &path,
            "documents",
            Duration::from_millis(1000),
        ));
        let ingestion = IngestionOrchestrator::new(
            source.clone(),
            repository.clone(),
            index.clone(),
            IngestionConfig::default(),
        );
        let receipt = ingestion
            .ingest(TestHarness::request(), IngestOptions::default())
            .await
            .unwrap();
        index.close().unwrap();
        receipt.document.id
    };

    let reopened = Arc::new(SqliteMetadataIndex::at_path(
        &path,
        "documents",
        Duration::from_millis(1000),
    ));
    let retrieval = RetrievalOrchestrator::new(source, repository, reopened);
    let retrieved = retrieval
        .search_and_fetch(&by_tax_id("20218874-5"))
        .await
        .unwrap();
    assert_eq!(retrieved.repository_id, id);
}
