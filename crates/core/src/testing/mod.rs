//! Testing utilities and in-memory implementations of the external seams.
//!
//! The mocks stand in for the repository ticket endpoint, the repository
//! itself and the metadata index, so orchestrators and the HTTP layer can
//! be exercised without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use docvault_core::testing::{fixtures, MockMetadataIndex, MockRepository, MockTicketProvider};
//!
//! let tickets = Arc::new(MockTicketProvider::new());
//! let repository = Arc::new(MockRepository::new());
//! let index = Arc::new(MockMetadataIndex::new());
//!
//! // Seed content and simulate failures
//! let id = repository.insert_document("contrato.pdf", fixtures::pdf_bytes());
//! index.set_next_error(IndexError::Database("disk full".into()));
//!
//! // Use in orchestrators or AppState...
//! ```

mod mock_index;
mod mock_repository;
mod mock_ticket_provider;

pub use mock_index::MockMetadataIndex;
pub use mock_repository::MockRepository;
pub use mock_ticket_provider::MockTicketProvider;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::filetype;
    use crate::metadata::DocumentMetadata;
    use crate::repository::{ContentInfo, RepositoryDocument};

    /// Metadata that passes validation, sub-category "Riesgo".
    pub fn valid_metadata() -> DocumentMetadata {
        DocumentMetadata {
            document_type: "Contrato".to_string(),
            client_name: "Comercial Andes SpA".to_string(),
            client_tax_id: "20218874-5".to_string(),
            validity_state: "Vigente".to_string(),
            document_name: "Contrato marco".to_string(),
            category: "Clientes".to_string(),
            sub_category: "Riesgo".to_string(),
            title: "Contrato marco de servicios".to_string(),
            version_type: "MAJOR".to_string(),
            version_label: "1.0".to_string(),
            description: "Contrato marco firmado".to_string(),
            ..Default::default()
        }
    }

    /// Smallest content detected as PDF.
    pub fn pdf_bytes() -> Vec<u8> {
        b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF\n".to_vec()
    }

    pub fn png_bytes() -> Vec<u8> {
        vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00]
    }

    pub fn jpeg_bytes() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46]
    }

    pub fn pdf_base64() -> String {
        filetype::encode_base64(&pdf_bytes())
    }

    /// A repository node with no properties.
    pub fn repository_document(id: &str, name: &str) -> RepositoryDocument {
        RepositoryDocument {
            id: id.to_string(),
            name: name.to_string(),
            node_type: Some("dms:document".to_string()),
            is_folder: false,
            is_file: true,
            created_at: None,
            modified_at: None,
            created_by_user: None,
            modified_by_user: None,
            parent_id: None,
            content: Some(ContentInfo {
                mime_type: Some("application/pdf".to_string()),
                mime_type_name: None,
                size_in_bytes: Some(pdf_bytes().len() as u64),
            }),
            properties: BTreeMap::new(),
        }
    }
}
