use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Filter passed verbatim to the repository's list endpoint.
pub type ListFilter = BTreeMap<String, Value>;

/// Content plus serialized properties for a single upload.
#[derive(Debug, Clone)]
pub struct StoreRequest {
    pub content: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    /// JSON object with the document's repository properties
    pub properties_json: String,
}

/// Actor reference on a repository node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Content descriptor on a repository node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInfo {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub mime_type_name: Option<String>,
    #[serde(default)]
    pub size_in_bytes: Option<u64>,
}

/// A node as described by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDocument {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub is_folder: bool,
    #[serde(default)]
    pub is_file: bool,
    /// Repository timestamps are passed through as-is
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub created_by_user: Option<UserRef>,
    #[serde(default)]
    pub modified_by_user: Option<UserRef>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub content: Option<ContentInfo>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl RepositoryDocument {
    pub fn mime_type(&self) -> Option<&str> {
        self.content.as_ref()?.mime_type.as_deref()
    }

    pub fn size(&self) -> Option<u64> {
        self.content.as_ref()?.size_in_bytes
    }

    /// String property by repository name; empty strings count as absent.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// The repository wraps every node in `{"entry": {...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub entry: RepositoryDocument,
}

/// Reduced document shape returned by listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub properties: BTreeMap<String, Value>,
}

impl From<RepositoryDocument> for Document {
    fn from(doc: RepositoryDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            properties: doc.properties,
        }
    }
}

/// Content returned by a fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    pub content: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}
