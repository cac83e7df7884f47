//! Single and batch document ingestion.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::filetype;
use crate::index::{IndexRecord, MetadataIndex};
use crate::metadata::{DocumentMetadata, ValidationError};
use crate::metrics::{BATCH_ITEMS, DOCUMENTS_INGESTED, INDEX_WRITE_FAILURES};
use crate::repository::{RepositoryDocument, RepositoryGateway, StoreRequest};
use crate::ticket::AuthTicket;

use super::{
    BatchEntry, BatchItem, BatchOptions, BatchResult, DocumentError, IngestOptions,
    IngestRequest, IngestionConfig, IngestionReceipt, TicketSource,
};

/// Validated request ready for the repository.
struct Prepared {
    content: Vec<u8>,
    file_name: String,
    mime_type: &'static str,
    metadata: DocumentMetadata,
}

/// Drives validate → detect → store → index.
pub struct IngestionOrchestrator {
    tickets: TicketSource,
    repository: Arc<dyn RepositoryGateway>,
    index: Arc<dyn MetadataIndex>,
    config: IngestionConfig,
}

impl IngestionOrchestrator {
    pub fn new(
        tickets: TicketSource,
        repository: Arc<dyn RepositoryGateway>,
        index: Arc<dyn MetadataIndex>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            tickets,
            repository,
            index,
            config,
        }
    }

    /// Ingest one document.
    pub async fn ingest(
        &self,
        request: IngestRequest,
        options: IngestOptions,
    ) -> Result<IngestionReceipt, DocumentError> {
        let result = match self.tickets.ticket().await {
            Ok(ticket) => self.ingest_with_ticket(request, options, &ticket).await,
            Err(e) => Err(e),
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        DOCUMENTS_INGESTED.with_label_values(&[outcome]).inc();
        result
    }

    /// Ingest many documents with per-item isolation.
    ///
    /// Fails as a whole only when the batch is empty or too large, or when no
    /// ticket can be obtained. Every other failure becomes an error entry.
    pub async fn ingest_batch(
        &self,
        items: Vec<BatchItem>,
        options: BatchOptions,
    ) -> Result<BatchResult, DocumentError> {
        if items.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }
        if items.len() > self.config.max_batch_size {
            return Err(ValidationError::BatchTooLarge {
                size: items.len(),
                limit: self.config.max_batch_size,
            }
            .into());
        }

        let ticket = self.tickets.ticket().await?;
        let concurrency = self.config.batch_concurrency.max(1);
        debug!(items = items.len(), concurrency, "Processing batch");

        let ticket = &ticket;
        let options = &options;
        let results: Vec<BatchEntry> = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| async move {
                self.ingest_batch_item(index, item, options, ticket).await
            })
            .buffered(concurrency)
            .collect()
            .await;

        let result = BatchResult::from_entries(results);
        info!(
            total = result.total,
            succeeded = result.succeeded,
            failed = result.failed,
            "Batch processed"
        );
        Ok(result)
    }

    async fn ingest_batch_item(
        &self,
        index: usize,
        item: BatchItem,
        options: &BatchOptions,
        ticket: &AuthTicket,
    ) -> BatchEntry {
        let file_name = item.file_name().to_string();
        let outcome = match item {
            BatchItem::Rejected { error, .. } => Err(DocumentError::Validation(error)),
            BatchItem::Ready(mut request) => {
                if let Some(common) = &options.common_metadata {
                    request.metadata.fill_from(common);
                }
                let item_options = IngestOptions {
                    require_supported_type: options.require_supported_type,
                };
                self.ingest_with_ticket(request, item_options, ticket).await
            }
        };

        match outcome {
            Ok(receipt) => {
                BATCH_ITEMS.with_label_values(&["success"]).inc();
                let document = receipt.document;
                BatchEntry::Success {
                    index,
                    tax_id: property_or_empty(&document, crate::metadata::CLIENT_TAX_ID_FIELD),
                    legal_name: property_or_empty(&document, crate::metadata::CLIENT_NAME_FIELD),
                    repository_id: document.id,
                    file_name,
                    indexed: receipt.indexed,
                }
            }
            Err(e) => {
                BATCH_ITEMS.with_label_values(&["error"]).inc();
                warn!(index, file_name = %file_name, error = %e, "Batch item failed");
                BatchEntry::Error {
                    index,
                    file_name,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn ingest_with_ticket(
        &self,
        request: IngestRequest,
        options: IngestOptions,
        ticket: &AuthTicket,
    ) -> Result<IngestionReceipt, DocumentError> {
        let prepared = self.prepare(request, options)?;
        let properties_json = prepared.metadata.to_properties_json()?;

        let mut document = self
            .repository
            .store(
                StoreRequest {
                    content: prepared.content,
                    file_name: prepared.file_name.clone(),
                    mime_type: prepared.mime_type.to_string(),
                    properties_json,
                },
                ticket,
            )
            .await
            .map_err(DocumentError::Repository)?;

        // Some repositories answer without echoing the node's properties
        if document.properties.is_empty() {
            if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(&prepared.metadata) {
                document.properties = map.into_iter().collect();
            }
        }
        if document.name.is_empty() {
            document.name = prepared.file_name;
        }

        let indexed = self.index_document(&document, &prepared.metadata, prepared.mime_type);
        info!(
            id = %document.id,
            tax_id = %prepared.metadata.client_tax_id,
            indexed,
            "Document ingested"
        );
        Ok(IngestionReceipt { document, indexed })
    }

    /// Validation and normalization. Nothing here touches the network.
    fn prepare(
        &self,
        request: IngestRequest,
        options: IngestOptions,
    ) -> Result<Prepared, ValidationError> {
        let IngestRequest {
            content,
            file_name,
            mut metadata,
        } = request;

        metadata.normalize(Utc::now());
        metadata.validate()?;

        if content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        if content.len() > self.config.max_file_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size: content.len(),
                limit: self.config.max_file_size_bytes,
            });
        }

        let file_type = if options.require_supported_type {
            filetype::require_supported(&content)?
        } else {
            filetype::detect(&content)
        };
        metadata.file_type = file_type.mime_type().to_string();

        let file_name = match file_name.trim() {
            "" => default_file_name(&metadata, file_type),
            name => name.to_string(),
        };

        Ok(Prepared {
            content,
            file_name,
            mime_type: file_type.mime_type(),
            metadata,
        })
    }

    /// Best-effort index write. Failures are logged and counted, never returned.
    fn index_document(
        &self,
        document: &RepositoryDocument,
        metadata: &DocumentMetadata,
        mime_type: &str,
    ) -> bool {
        let record = IndexRecord::from_stored(document, metadata, mime_type, Utc::now());
        match self.index.insert(&record) {
            Ok(()) => true,
            Err(e) => {
                INDEX_WRITE_FAILURES.inc();
                warn!(
                    id = %document.id,
                    error = %e,
                    "Document stored but index write failed"
                );
                false
            }
        }
    }
}

fn default_file_name(metadata: &DocumentMetadata, file_type: filetype::FileType) -> String {
    match file_type.extension() {
        Some(ext) => format!("{}.{}", metadata.document_name, ext),
        None => metadata.document_name.clone(),
    }
}

fn property_or_empty(document: &RepositoryDocument, name: &str) -> String {
    document.property(name).unwrap_or_default().to_string()
}
