//! Document ingestion and retrieval orchestration.
//!
//! Each orchestrator obtains a fresh repository ticket as the first step of
//! every operation, then drives the repository and the metadata index:
//!
//! - [`IngestionOrchestrator`]: validate, detect content type, store, index.
//!   The index write is best-effort and reported through
//!   [`IngestionReceipt::indexed`].
//! - [`RetrievalOrchestrator`]: resolve a business query through the index,
//!   then fetch the content from the repository.
//! - [`ListingOrchestrator`]: pass-through listing.

mod config;
mod error;
mod ingestion;
mod listing;
mod retrieval;
mod types;

pub use config::IngestionConfig;
pub use error::DocumentError;
pub use ingestion::IngestionOrchestrator;
pub use listing::ListingOrchestrator;
pub use retrieval::RetrievalOrchestrator;
pub use types::*;

use std::sync::Arc;

use crate::ticket::{AuthTicket, Principal, TicketProvider};

/// Ticket provider bound to the service principal.
#[derive(Clone)]
pub struct TicketSource {
    provider: Arc<dyn TicketProvider>,
    principal: Principal,
}

impl TicketSource {
    pub fn new(provider: Arc<dyn TicketProvider>, principal: Principal) -> Self {
        Self {
            provider,
            principal,
        }
    }

    /// A fresh ticket. One attempt, no caching.
    pub async fn ticket(&self) -> Result<AuthTicket, DocumentError> {
        self.provider
            .authenticate(&self.principal)
            .await
            .map_err(DocumentError::Authentication)
    }
}
