//! Validation errors raised before anything reaches the repository.

use thiserror::Error;

/// Client input that cannot be ingested. Always surfaced as a 400-class response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required metadata fields are missing or blank (wire names, stable order).
    #[error("missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// Sub-category outside the closed set.
    #[error("invalid dms:sub-category '{value}': expected one of {}", super::SubCategory::expected())]
    InvalidSubCategory { value: String },

    /// Detected content type is not on the allow-list.
    #[error("unsupported content type: {mime_type}")]
    UnsupportedContentType { mime_type: String },

    #[error("document content is empty")]
    EmptyContent,

    #[error("document is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },

    /// Payload could not be decoded (bad base64, malformed properties JSON).
    #[error("invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("batch contains no documents")]
    EmptyBatch,

    #[error("batch has {size} documents, limit is {limit}")]
    BatchTooLarge { size: usize, limit: usize },
}

impl ValidationError {
    pub fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingFields {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            reason: reason.into(),
        }
    }

    /// Field names involved in the error, when there are any.
    pub fn fields(&self) -> Vec<String> {
        match self {
            Self::MissingFields { fields } => fields.clone(),
            Self::InvalidSubCategory { .. } => vec![super::SUB_CATEGORY_FIELD.to_string()],
            _ => Vec::new(),
        }
    }
}
