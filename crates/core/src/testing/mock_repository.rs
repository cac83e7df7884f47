//! Mock document repository for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use crate::filetype;
use crate::repository::{
    ContentInfo, DownloadedFile, ListFilter, RepositoryDocument, RepositoryError,
    RepositoryGateway, StoreRequest,
};
use crate::ticket::AuthTicket;

struct StoredObject {
    document: RepositoryDocument,
    content: Vec<u8>,
}

/// In-memory repository.
///
/// Stores content under generated ids, echoes the submitted properties back
/// the way the real repository does, and records every call for assertions.
pub struct MockRepository {
    objects: RwLock<Vec<StoredObject>>,
    stored_requests: RwLock<Vec<StoreRequest>>,
    list_filters: RwLock<Vec<ListFilter>>,
    tickets_seen: RwLock<Vec<String>>,
    fetches: AtomicUsize,
    next_error: RwLock<Option<RepositoryError>>,
    store_delay_ms: AtomicU64,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(Vec::new()),
            stored_requests: RwLock::new(Vec::new()),
            list_filters: RwLock::new(Vec::new()),
            tickets_seen: RwLock::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            next_error: RwLock::new(None),
            store_delay_ms: AtomicU64::new(0),
        }
    }

    /// Seed a document directly, bypassing `store`. Returns its id.
    pub fn insert_document(&self, name: &str, content: Vec<u8>) -> String {
        let mime_type = filetype::detect(&content).mime_type().to_string();
        let document = build_document(name, &mime_type, content.len(), BTreeMap::new());
        let id = document.id.clone();
        self.objects
            .write()
            .unwrap()
            .push(StoredObject { document, content });
        id
    }

    /// Drop a document, leaving any index entry for it dangling.
    pub fn remove_document(&self, id: &str) -> bool {
        let mut objects = self.objects.write().unwrap();
        let before = objects.len();
        objects.retain(|o| o.document.id != id);
        objects.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects
            .read()
            .unwrap()
            .iter()
            .any(|o| o.document.id == id)
    }

    pub fn document(&self, id: &str) -> Option<RepositoryDocument> {
        self.objects
            .read()
            .unwrap()
            .iter()
            .find(|o| o.document.id == id)
            .map(|o| o.document.clone())
    }

    /// The next call (of any kind) fails with `error`.
    pub fn set_next_error(&self, error: RepositoryError) {
        *self.next_error.write().unwrap() = Some(error);
    }

    /// Delay every store by `ms` milliseconds.
    pub fn set_store_delay_ms(&self, ms: u64) {
        self.store_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn stored_requests(&self) -> Vec<StoreRequest> {
        self.stored_requests.read().unwrap().clone()
    }

    pub fn store_count(&self) -> usize {
        self.stored_requests.read().unwrap().len()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn recorded_list_filters(&self) -> Vec<ListFilter> {
        self.list_filters.read().unwrap().clone()
    }

    /// Tickets presented on every call, in call order.
    pub fn recorded_tickets(&self) -> Vec<String> {
        self.tickets_seen.read().unwrap().clone()
    }

    fn begin_call(&self, ticket: &AuthTicket) -> Result<(), RepositoryError> {
        self.tickets_seen
            .write()
            .unwrap()
            .push(ticket.as_str().to_string());
        match self.next_error.write().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRepository")
            .field("documents", &self.objects.read().map(|o| o.len()).unwrap_or(0))
            .field("fetches", &self.fetch_count())
            .finish_non_exhaustive()
    }
}

fn build_document(
    name: &str,
    mime_type: &str,
    size: usize,
    properties: BTreeMap<String, Value>,
) -> RepositoryDocument {
    let now = chrono::Utc::now().to_rfc3339();
    RepositoryDocument {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        node_type: Some("dms:document".to_string()),
        is_folder: false,
        is_file: true,
        created_at: Some(now.clone()),
        modified_at: Some(now),
        created_by_user: None,
        modified_by_user: None,
        parent_id: None,
        content: Some(ContentInfo {
            mime_type: Some(mime_type.to_string()),
            mime_type_name: None,
            size_in_bytes: Some(size as u64),
        }),
        properties,
    }
}

#[async_trait]
impl RepositoryGateway for MockRepository {
    async fn store(
        &self,
        request: StoreRequest,
        ticket: &AuthTicket,
    ) -> Result<RepositoryDocument, RepositoryError> {
        self.begin_call(ticket)?;

        let delay = self.store_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let properties: BTreeMap<String, Value> =
            serde_json::from_str(&request.properties_json).unwrap_or_default();
        let document = build_document(
            &request.file_name,
            &request.mime_type,
            request.content.len(),
            properties,
        );

        self.objects.write().unwrap().push(StoredObject {
            document: document.clone(),
            content: request.content.clone(),
        });
        self.stored_requests.write().unwrap().push(request);

        Ok(document)
    }

    async fn list(
        &self,
        filter: &ListFilter,
        ticket: &AuthTicket,
    ) -> Result<Vec<RepositoryDocument>, RepositoryError> {
        self.begin_call(ticket)?;
        self.list_filters.write().unwrap().push(filter.clone());

        let objects = self.objects.read().unwrap();
        Ok(objects
            .iter()
            .filter(|o| {
                filter
                    .iter()
                    .all(|(key, value)| o.document.properties.get(key) == Some(value))
            })
            .map(|o| o.document.clone())
            .collect())
    }

    async fn fetch(&self, id: &str, ticket: &AuthTicket) -> Result<DownloadedFile, RepositoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.begin_call(ticket)?;

        let objects = self.objects.read().unwrap();
        let object = objects
            .iter()
            .find(|o| o.document.id == id)
            .ok_or_else(|| RepositoryError::not_found(id))?;

        let detected = filetype::detect(&object.content);
        let mime_type = if detected.is_supported() {
            detected.mime_type().to_string()
        } else {
            object
                .document
                .mime_type()
                .unwrap_or(filetype::OCTET_STREAM_MIME)
                .to_string()
        };

        Ok(DownloadedFile {
            content: object.content.clone(),
            file_name: object.document.name.clone(),
            mime_type,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
