//! Document upload, listing, download and search handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use docvault_core::{
    filetype, BatchItem, BatchOptions, BatchResult, Document, DocumentMetadata, IngestOptions,
    IngestRequest, IngestionReceipt, ListFilter, SearchQuery, ValidationError,
};

use super::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct Base64Document {
    #[serde(default)]
    pub file_name: String,
    pub base64: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

/// Items stay raw JSON so one malformed entry cannot reject the whole batch.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub documents: Vec<Value>,
    #[serde(default)]
    pub common_metadata: Option<DocumentMetadata>,
}

/// Decode one raw batch entry. Entries that do not fit [`Base64Document`]
/// become rejected items named after their `file_name`, when one is given.
fn batch_item(raw: Value) -> BatchItem {
    let file_name = raw
        .get("file_name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match serde_json::from_value::<Base64Document>(raw) {
        Ok(d) => BatchItem::from_base64(d.file_name, &d.base64, d.metadata),
        Err(e) => BatchItem::Rejected {
            file_name,
            error: ValidationError::invalid_payload(e.to_string()),
        },
    }
}

#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: BTreeMap<String, Document>,
    pub meta: ListMeta,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub repository_id: String,
    pub file_name: String,
    pub mime_type: String,
    pub base64: String,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

// ============================================================================
// Handlers
// ============================================================================

/// Upload one document as multipart: a `document` file part and a
/// `properties` part holding the metadata JSON.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<IngestionReceipt>, ApiError> {
    let mut content: Option<Vec<u8>> = None;
    let mut file_name = String::new();
    let mut properties: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "document" => {
                file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read file: {}", e)))?;
                content = Some(bytes.to_vec());
            }
            "properties" => {
                let text = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("failed to read properties: {}", e))
                })?;
                properties = Some(text);
            }
            _ => {}
        }
    }

    let content = content.ok_or_else(|| ApiError::bad_request("a document file is required"))?;
    let properties = properties
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("document properties are required"))?;
    let metadata: DocumentMetadata = serde_json::from_str(&properties)
        .map_err(|e| ApiError::bad_request(format!("invalid properties: {}", e)))?;

    let options = IngestOptions {
        require_supported_type: state.config().ingestion.restrict_content_types,
    };
    let receipt = state
        .ingestion()
        .ingest(
            IngestRequest {
                content,
                file_name,
                metadata,
            },
            options,
        )
        .await?;

    Ok(Json(receipt))
}

/// Upload one base64-encoded document. Only PDF, JPEG and PNG are accepted.
pub async fn upload_base64(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Base64Document>, JsonRejection>,
) -> Result<Json<IngestionReceipt>, ApiError> {
    let document = json_body(body)?;
    let content = filetype::decode_base64(&document.base64)?;

    let receipt = state
        .ingestion()
        .ingest(
            IngestRequest {
                content,
                file_name: document.file_name,
                metadata: document.metadata,
            },
            IngestOptions {
                require_supported_type: true,
            },
        )
        .await?;

    Ok(Json(receipt))
}

pub async fn upload_batch(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResult>, ApiError> {
    let request = json_body(body)?;

    let items = request
        .documents
        .into_iter()
        .map(batch_item)
        .collect();
    let options = BatchOptions {
        common_metadata: request.common_metadata,
        require_supported_type: state.config().ingestion.restrict_content_types,
    };

    let result = state.ingestion().ingest_batch(items, options).await?;
    Ok(Json(result))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ListFilter>, JsonRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let filter = json_body(body)?;
    let data = state.listing().list(&filter).await?;
    info!(total = data.len(), "Listed documents");

    Ok(Json(ListResponse {
        meta: ListMeta { total: data.len() },
        data,
    }))
}

/// Download by repository id as an attachment.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::bad_request("a document id is required"));
    }

    let file = state.retrieval().fetch_by_id(&id).await?;
    let disposition = format!(
        "attachment; filename={}",
        urlencoding::encode(&file.file_name)
    );

    Ok((
        [
            (header::CONTENT_TYPE, file.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, "must-revalidate".to_string()),
        ],
        file.content,
    )
        .into_response())
}

/// Resolve a business query through the index, then fetch the match.
pub async fn search(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchQuery>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = json_body(body)?;
    let document = state.retrieval().search_and_fetch(&query).await?;

    Ok(Json(SearchResponse {
        repository_id: document.repository_id,
        file_name: document.file.file_name,
        mime_type: document.file.mime_type,
        base64: filetype::encode_base64(&document.file.content),
    }))
}
