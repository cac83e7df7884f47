//! Pass-through document listing.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::repository::{Document, ListFilter, RepositoryGateway};
use crate::ticket::AuthTicket;

use super::{DocumentError, TicketSource};

pub struct ListingOrchestrator {
    tickets: TicketSource,
    repository: Arc<dyn RepositoryGateway>,
}

impl ListingOrchestrator {
    pub fn new(tickets: TicketSource, repository: Arc<dyn RepositoryGateway>) -> Self {
        Self {
            tickets,
            repository,
        }
    }

    /// Documents matching `filter`, keyed by repository id.
    pub async fn list(
        &self,
        filter: &ListFilter,
    ) -> Result<BTreeMap<String, Document>, DocumentError> {
        let ticket = self.tickets.ticket().await?;
        self.list_with_ticket(filter, &ticket).await
    }

    async fn list_with_ticket(
        &self,
        filter: &ListFilter,
        ticket: &AuthTicket,
    ) -> Result<BTreeMap<String, Document>, DocumentError> {
        let documents = self
            .repository
            .list(filter, ticket)
            .await
            .map_err(DocumentError::Repository)?;
        debug!(count = documents.len(), "Listed repository documents");

        Ok(documents
            .into_iter()
            .map(|doc| (doc.id.clone(), Document::from(doc)))
            .collect())
    }
}
