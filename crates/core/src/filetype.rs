//! Content type detection by magic bytes, plus base64 payload decoding.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::metadata::ValidationError;

pub const PDF_MIME: &str = "application/pdf";
pub const JPEG_MIME: &str = "image/jpeg";
pub const PNG_MIME: &str = "image/png";
pub const OCTET_STREAM_MIME: &str = "application/octet-stream";

/// Content classification derived from a file's leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Pdf,
    Jpeg,
    Png,
    Unknown,
}

impl FileType {
    pub fn mime_type(&self) -> &'static str {
        match self {
            FileType::Pdf => PDF_MIME,
            FileType::Jpeg => JPEG_MIME,
            FileType::Png => PNG_MIME,
            FileType::Unknown => OCTET_STREAM_MIME,
        }
    }

    /// Extension used when a download has no usable file name.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            FileType::Pdf => Some("pdf"),
            FileType::Jpeg => Some("jpg"),
            FileType::Png => Some("png"),
            FileType::Unknown => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FileType::Unknown)
    }
}

const SIGNATURES: [(&[u8], FileType); 3] = [
    (b"%PDF", FileType::Pdf),
    (&[0xFF, 0xD8, 0xFF], FileType::Jpeg),
    (&[0x89, 0x50, 0x4E, 0x47], FileType::Png),
];

/// Classify content by signature. Anything unrecognized is `Unknown`.
pub fn detect(content: &[u8]) -> FileType {
    SIGNATURES
        .iter()
        .find(|(magic, _)| content.starts_with(magic))
        .map(|(_, file_type)| *file_type)
        .unwrap_or(FileType::Unknown)
}

/// Detect and reject anything outside the PDF/JPEG/PNG allow-list.
pub fn require_supported(content: &[u8]) -> Result<FileType, ValidationError> {
    let file_type = detect(content);
    if file_type.is_supported() {
        Ok(file_type)
    } else {
        Err(ValidationError::UnsupportedContentType {
            mime_type: file_type.mime_type().to_string(),
        })
    }
}

/// Decode a base64 payload, accepting an optional `data:<mime>;base64,` prefix.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, ValidationError> {
    let data = match payload.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => payload,
    };
    let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    STANDARD
        .decode(data.as_bytes())
        .map_err(|e| ValidationError::invalid_payload(format!("invalid base64: {}", e)))
}

pub fn encode_base64(content: &[u8]) -> String {
    STANDARD.encode(content)
}
