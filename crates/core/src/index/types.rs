use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::{
    DocumentMetadata, CLIENT_NAME_FIELD, CLIENT_TAX_ID_FIELD, DOCUMENT_NAME_FIELD,
    DOCUMENT_TYPE_FIELD, UPLOAD_DATE_FIELD, VALIDITY_STATE_FIELD,
};
use crate::repository::RepositoryDocument;

/// Business fields copied into the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexedMetadata {
    pub document_name: String,
    pub document_type: String,
    pub legal_name: String,
    pub tax_id: String,
    pub validity_state: String,
    pub upload_date: String,
}

/// One indexed document. Written once after a successful store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub repository_id: String,
    pub file_name: String,
    pub mime_type: String,
    pub indexed_at: DateTime<Utc>,
    pub metadata: IndexedMetadata,
}

impl IndexRecord {
    /// Build from the repository's answer, falling back to the submitted
    /// metadata for properties the repository did not echo back.
    pub fn from_stored(
        document: &RepositoryDocument,
        submitted: &DocumentMetadata,
        mime_type: &str,
        indexed_at: DateTime<Utc>,
    ) -> Self {
        let pick = |name: &str, fallback: &str| {
            document
                .property(name)
                .unwrap_or(fallback)
                .to_string()
        };

        Self {
            repository_id: document.id.clone(),
            file_name: document.name.clone(),
            mime_type: document.mime_type().unwrap_or(mime_type).to_string(),
            indexed_at,
            metadata: IndexedMetadata {
                document_name: pick(DOCUMENT_NAME_FIELD, &submitted.document_name),
                document_type: pick(DOCUMENT_TYPE_FIELD, &submitted.document_type),
                legal_name: pick(CLIENT_NAME_FIELD, &submitted.client_name),
                tax_id: pick(CLIENT_TAX_ID_FIELD, &submitted.client_tax_id),
                validity_state: pick(VALIDITY_STATE_FIELD, &submitted.validity_state),
                upload_date: pick(UPLOAD_DATE_FIELD, &submitted.upload_date),
            },
        }
    }
}

/// Client search request. Accepts short names and repository property names;
/// the short name wins when both are given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,

    #[serde(rename = "dms:client-tax-id", default, skip_serializing_if = "Option::is_none")]
    pub native_tax_id: Option<String>,
    #[serde(rename = "dms:document-type", default, skip_serializing_if = "Option::is_none")]
    pub native_document_type: Option<String>,
    #[serde(rename = "dms:document-name", default, skip_serializing_if = "Option::is_none")]
    pub native_document_name: Option<String>,
    #[serde(rename = "dms:upload-date", default, skip_serializing_if = "Option::is_none")]
    pub native_upload_date: Option<String>,
    #[serde(rename = "dms:client-name", default, skip_serializing_if = "Option::is_none")]
    pub native_legal_name: Option<String>,
    /// Only accepted under its repository name
    #[serde(rename = "dms:validity-state", default, skip_serializing_if = "Option::is_none")]
    pub validity_state: Option<String>,
}

/// Normalized lookup keys. `None` keys are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexFilter {
    pub tax_id: Option<String>,
    pub document_type: Option<String>,
    pub document_name: Option<String>,
    pub upload_date: Option<String>,
    pub legal_name: Option<String>,
    pub validity_state: Option<String>,
}

impl IndexFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_query(query: &SearchQuery) -> Self {
        Self {
            tax_id: prefer(&query.tax_id, &query.native_tax_id),
            document_type: prefer(&query.document_type, &query.native_document_type),
            document_name: prefer(&query.document_name, &query.native_document_name),
            upload_date: prefer(&query.upload_date, &query.native_upload_date),
            legal_name: prefer(&query.legal_name, &query.native_legal_name),
            validity_state: prefer(&None, &query.validity_state),
        }
    }

    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    pub fn with_document_name(mut self, document_name: impl Into<String>) -> Self {
        self.document_name = Some(document_name.into());
        self
    }

    pub fn with_upload_date(mut self, upload_date: impl Into<String>) -> Self {
        self.upload_date = Some(upload_date.into());
        self
    }

    pub fn with_legal_name(mut self, legal_name: impl Into<String>) -> Self {
        self.legal_name = Some(legal_name.into());
        self
    }

    pub fn with_validity_state(mut self, validity_state: impl Into<String>) -> Self {
        self.validity_state = Some(validity_state.into());
        self
    }

    /// Present keys with the value they must equal.
    pub fn conditions(&self) -> Vec<(FilterKey, &str)> {
        [
            (FilterKey::TaxId, &self.tax_id),
            (FilterKey::DocumentType, &self.document_type),
            (FilterKey::DocumentName, &self.document_name),
            (FilterKey::UploadDate, &self.upload_date),
            (FilterKey::LegalName, &self.legal_name),
            (FilterKey::ValidityState, &self.validity_state),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions().is_empty()
    }

    /// Whether `metadata` satisfies every present key.
    pub fn matches(&self, metadata: &IndexedMetadata) -> bool {
        self.conditions()
            .into_iter()
            .all(|(key, value)| key.get(metadata) == value)
    }
}

/// Normalized index field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    TaxId,
    DocumentType,
    DocumentName,
    UploadDate,
    LegalName,
    ValidityState,
}

impl FilterKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::TaxId => "tax_id",
            FilterKey::DocumentType => "document_type",
            FilterKey::DocumentName => "document_name",
            FilterKey::UploadDate => "upload_date",
            FilterKey::LegalName => "legal_name",
            FilterKey::ValidityState => "validity_state",
        }
    }

    pub fn get<'a>(&self, metadata: &'a IndexedMetadata) -> &'a str {
        match self {
            FilterKey::TaxId => &metadata.tax_id,
            FilterKey::DocumentType => &metadata.document_type,
            FilterKey::DocumentName => &metadata.document_name,
            FilterKey::UploadDate => &metadata.upload_date,
            FilterKey::LegalName => &metadata.legal_name,
            FilterKey::ValidityState => &metadata.validity_state,
        }
    }
}

fn prefer(short: &Option<String>, native: &Option<String>) -> Option<String> {
    let clean = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    clean(short).or_else(|| clean(native))
}
